use agency_site_core::content::model::is_valid_doc_type;
use agency_site_core::content::{ContentDocument, ContentDocumentInput};
use agency_site_core::events::types::ContentKind;
use agency_site_core::events::SiteEvent;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AdminSession;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/content", get(get_document).put(put_document))
}

#[derive(Debug, Deserialize)]
struct ContentQuery {
    #[serde(rename = "type")]
    doc_type: Option<String>,
}

fn doc_type(query: ContentQuery) -> ApiResult<String> {
    match query.doc_type {
        Some(doc_type) if is_valid_doc_type(&doc_type) => Ok(doc_type),
        Some(doc_type) => Err(ApiError::BadRequest(format!(
            "invalid content type '{doc_type}'"
        ))),
        None => Err(ApiError::BadRequest(
            "query parameter 'type' is required".into(),
        )),
    }
}

async fn get_document(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> ApiResult<Json<ContentDocument>> {
    let doc_type = doc_type(query)?;
    Ok(Json(state.store().get_content(&doc_type).await?))
}

async fn put_document(
    State(state): State<AppState>,
    _admin: AdminSession,
    Query(query): Query<ContentQuery>,
    Json(body): Json<ContentDocumentInput>,
) -> ApiResult<Json<ContentDocument>> {
    let doc_type = doc_type(query)?;
    body.validate().map_err(ApiError::Validation)?;

    let doc = state
        .store()
        .put_content(body.into_document(&doc_type))
        .await?;
    tracing::info!(doc_type = %doc.doc_type, "content document saved");
    state
        .event_bus()
        .emit(SiteEvent::content(ContentKind::Document, &doc.doc_type, false));
    Ok(Json(doc))
}
