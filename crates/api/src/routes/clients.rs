use agency_site_core::content::{render_blocks, ClientCase, NewClientCase};
use agency_site_core::events::types::ContentKind;
use agency_site_core::events::SiteEvent;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AdminSession;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/clients", get(list_cases).post(create_case))
        .route(
            "/api/clients/{slug}",
            get(get_case).put(replace_case).delete(delete_case),
        )
        .route("/api/clients/{slug}/render", get(render_case))
}

/// Unpublished cases are only visible to admins.
async fn visible_case(
    state: &AppState,
    slug: &str,
    admin: Option<&AdminSession>,
) -> ApiResult<ClientCase> {
    let case = state.store().get_case(slug).await?;
    if !case.published && admin.is_none() {
        return Err(ApiError::NotFound(format!("client case '{slug}'")));
    }
    Ok(case)
}

async fn list_cases(
    State(state): State<AppState>,
    admin: Option<AdminSession>,
) -> ApiResult<Json<Vec<ClientCase>>> {
    Ok(Json(state.store().list_cases(admin.is_some()).await?))
}

async fn get_case(
    State(state): State<AppState>,
    admin: Option<AdminSession>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ClientCase>> {
    Ok(Json(visible_case(&state, &slug, admin.as_ref()).await?))
}

async fn render_case(
    State(state): State<AppState>,
    admin: Option<AdminSession>,
    Path(slug): Path<String>,
) -> ApiResult<Html<String>> {
    let case = visible_case(&state, &slug, admin.as_ref()).await?;
    Ok(Html(render_blocks(&case.blocks)))
}

async fn create_case(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(body): Json<NewClientCase>,
) -> ApiResult<(StatusCode, Json<ClientCase>)> {
    body.validate().map_err(ApiError::Validation)?;

    let case = state.store().insert_case(body.into_case(None)).await?;
    tracing::info!(slug = %case.slug, "client case created");
    state
        .event_bus()
        .emit(SiteEvent::content(ContentKind::ClientCase, &case.slug, false));
    Ok((StatusCode::CREATED, Json(case)))
}

async fn replace_case(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(slug): Path<String>,
    Json(body): Json<NewClientCase>,
) -> ApiResult<Json<ClientCase>> {
    body.validate().map_err(ApiError::Validation)?;

    let current = state.store().get_case(&slug).await?;
    let case = state
        .store()
        .replace_case(&slug, body.into_case(Some(current.created_at)))
        .await?;
    if case.slug != slug {
        tracing::info!(from = %slug, to = %case.slug, "client case renamed");
        state
            .event_bus()
            .emit(SiteEvent::content(ContentKind::ClientCase, &slug, true));
    }
    state
        .event_bus()
        .emit(SiteEvent::content(ContentKind::ClientCase, &case.slug, false));
    Ok(Json(case))
}

async fn delete_case(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(slug): Path<String>,
) -> ApiResult<StatusCode> {
    state.store().delete_case(&slug).await?;
    state
        .event_bus()
        .emit(SiteEvent::content(ContentKind::ClientCase, &slug, true));
    Ok(StatusCode::NO_CONTENT)
}
