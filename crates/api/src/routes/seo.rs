use agency_site_core::events::types::ContentKind;
use agency_site_core::events::SiteEvent;
use agency_site_core::seo::{NewSeoEntry, SeoEntry, SeoFilter, SeoPatch};
use agency_site_core::store::StoreError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AdminSession;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/seo", get(list_entries).post(create_entry))
        .route(
            "/api/seo/{id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}

#[derive(Debug, Deserialize)]
struct SeoQuery {
    page: Option<String>,
    language: Option<String>,
}

/// A taken (page, language) pair is reported as a bad request on SEO writes.
fn duplicate_as_bad_request(err: StoreError) -> ApiError {
    match err {
        StoreError::Duplicate(msg) => ApiError::BadRequest(format!("{msg} already exists")),
        other => other.into(),
    }
}

async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<SeoQuery>,
) -> ApiResult<Json<Vec<SeoEntry>>> {
    let language = query
        .language
        .filter(|language| !language.trim().is_empty())
        .or_else(|| Some(state.config().default_language.clone()));
    let filter = SeoFilter::new(query.page, language);
    Ok(Json(state.store().list_seo(&filter).await?))
}

async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SeoEntry>> {
    Ok(Json(state.store().get_seo(id).await?))
}

async fn create_entry(
    State(state): State<AppState>,
    admin: AdminSession,
    Json(body): Json<NewSeoEntry>,
) -> ApiResult<(StatusCode, Json<SeoEntry>)> {
    body.validate().map_err(ApiError::SchemaRejected)?;

    let entry = state
        .store()
        .insert_seo(body.into_entry(Some(admin.email)))
        .await
        .map_err(duplicate_as_bad_request)?;

    tracing::info!(page = %entry.page, language = %entry.language, "seo entry created");
    state
        .event_bus()
        .emit(SiteEvent::content(ContentKind::Seo, entry.id.to_string(), false));
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn update_entry(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<Uuid>,
    Json(patch): Json<SeoPatch>,
) -> ApiResult<Json<SeoEntry>> {
    let current = state.store().get_seo(id).await?;
    let next = current
        .patched(patch, Some(admin.email))
        .map_err(ApiError::Validation)?;

    let entry = state
        .store()
        .update_seo(next)
        .await
        .map_err(duplicate_as_bad_request)?;

    state
        .event_bus()
        .emit(SiteEvent::content(ContentKind::Seo, entry.id.to_string(), false));
    Ok(Json(entry))
}

async fn delete_entry(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.store().delete_seo(id).await?;
    state
        .event_bus()
        .emit(SiteEvent::content(ContentKind::Seo, id.to_string(), true));
    Ok(StatusCode::NO_CONTENT)
}
