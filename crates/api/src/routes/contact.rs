use agency_site_core::events::SiteEvent;
use agency_site_core::lead::{
    behavior_score, describe_behavior, validate_submission, CrmPartialLead, LeadRecord,
    LeadSubmission, PartialLead, PartialLeadRecord, ScoreBucket, SessionSnapshot, SessionUpdate,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AdminSession;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/contact", get(list_leads).post(submit_lead))
        .route(
            "/api/contact/partial",
            get(list_partial_leads).post(store_partial_lead),
        )
        .route("/api/contact/partial-hubspot", post(forward_partial_lead))
        .route(
            "/api/contact/sessions/{id}",
            get(get_session).put(update_session).delete(discard_session),
        )
        .route("/api/contact/sessions/{id}/country", put(change_country))
}

/// Final submission. The session, when given, is completed first so a
/// pending escalation can no longer fire for this visitor.
async fn submit_lead(
    State(state): State<AppState>,
    Json(mut body): Json<LeadSubmission>,
) -> ApiResult<(StatusCode, Json<LeadRecord>)> {
    validate_submission(&body.fields).map_err(ApiError::Validation)?;

    if let Some(session_id) = body.session_id.as_deref() {
        if let Some(snapshot) = state.sessions().complete(session_id).await {
            body.behavior.merge_max(&snapshot.behavior);
            if body.source.is_none() {
                body.source = snapshot.source;
            }
            if body.medium.is_none() {
                body.medium = snapshot.medium;
            }
        }
    }

    let score = behavior_score(&body.behavior);
    let record = LeadRecord {
        id: Uuid::now_v7(),
        description: describe_behavior(&body.behavior),
        fields: body.fields,
        behavior: body.behavior,
        source: body.source,
        medium: body.medium,
        score,
        bucket: ScoreBucket::from_score(score),
        created_at: Utc::now(),
    };
    let record = state.store().insert_lead(record).await?;

    if let Some(session_id) = body.session_id.as_deref() {
        state.sessions().discard(session_id).await;
    }

    tracing::info!(lead_id = %record.id, score = record.score, bucket = ?record.bucket, "lead captured");
    let key = record
        .fields
        .contact_key()
        .unwrap_or_else(|| record.fields.email.clone());
    state
        .event_bus()
        .emit(SiteEvent::LeadCaptured(SiteEvent::lead(key, body.session_id)));
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_leads(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> ApiResult<Json<Vec<LeadRecord>>> {
    Ok(Json(state.store().list_leads().await?))
}

async fn store_partial_lead(
    State(state): State<AppState>,
    Json(body): Json<PartialLead>,
) -> ApiResult<Json<PartialLeadRecord>> {
    let session_id = body.session_id.clone();
    let record = state.store().upsert_partial_lead(body).await?;
    tracing::info!(key = %record.key, "partial lead stored");
    state
        .event_bus()
        .emit(SiteEvent::PartialLeadStored(SiteEvent::lead(
            record.key.clone(),
            session_id,
        )));
    Ok(Json(record))
}

async fn list_partial_leads(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> ApiResult<Json<Vec<PartialLeadRecord>>> {
    Ok(Json(state.store().list_partial_leads().await?))
}

#[derive(Debug, Deserialize)]
struct ForwardRequest {
    #[serde(flatten)]
    lead: PartialLead,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct ForwardResponse {
    status: &'static str,
    score: u32,
    bucket: ScoreBucket,
}

async fn forward_partial_lead(
    State(state): State<AppState>,
    Json(body): Json<ForwardRequest>,
) -> ApiResult<Json<ForwardResponse>> {
    if body.lead.fields.contact_key().is_none() {
        return Err(ApiError::BadRequest(
            "partial lead needs a valid email or phone".into(),
        ));
    }

    let payload = CrmPartialLead::new(body.lead, body.description);
    state
        .crm()
        .push_partial_lead(&payload)
        .await
        .map_err(|e| ApiError::BadGateway(e.to_string()))?;

    Ok(Json(ForwardResponse {
        status: "sent",
        score: payload.score,
        bucket: payload.bucket,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    #[serde(flatten)]
    snapshot: SessionSnapshot,
    partial_lead_flushed: bool,
    timer_armed: bool,
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionSnapshot>> {
    state
        .sessions()
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("session '{id}'")))
}

/// Merge a form write. A partial lead produced by the write is persisted in
/// the background; the visitor's keystrokes never wait on the store.
async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<SessionUpdate>,
) -> ApiResult<Json<SessionResponse>> {
    let transition = state.sessions().apply(&id, update).await?;

    let flushed = transition.flush.is_some();
    if let Some(lead) = transition.flush {
        let store = state.store_handle();
        let events = state.event_bus().clone();
        tokio::spawn(async move {
            match store.upsert_partial_lead(lead).await {
                Ok(record) => {
                    tracing::debug!(key = %record.key, "session partial lead stored");
                    events.emit(SiteEvent::PartialLeadStored(SiteEvent::lead(
                        record.key,
                        record.lead.session_id,
                    )));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to store session partial lead");
                }
            }
        });
    }

    Ok(Json(SessionResponse {
        snapshot: transition.snapshot,
        partial_lead_flushed: flushed,
        timer_armed: transition.timer_armed,
    }))
}

async fn discard_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.sessions().discard(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("session '{id}'")))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountryChange {
    country_code: String,
}

async fn change_country(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CountryChange>,
) -> ApiResult<Json<SessionSnapshot>> {
    Ok(Json(
        state
            .sessions()
            .change_country(&id, &body.country_code)
            .await?,
    ))
}
