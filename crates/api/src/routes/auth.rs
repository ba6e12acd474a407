use agency_site_core::auth::verify_password;
use axum::{extract::State, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AdminSession;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    token_type: &'static str,
    expires_in: i64,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let config = state.config();
    let Some(hash) = config.admin_password_hash.as_deref() else {
        tracing::warn!("login attempted but ADMIN_PASSWORD_HASH is not set");
        return Err(ApiError::Unauthorized);
    };
    if !body.email.trim().eq_ignore_ascii_case(&config.admin_email) {
        return Err(ApiError::Unauthorized);
    }
    verify_password(&body.password, hash)?;

    let token = state.tokens().issue(&config.admin_email)?;
    tracing::info!(email = %config.admin_email, "admin logged in");
    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.tokens().ttl_secs(),
    }))
}

async fn me(admin: AdminSession) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "email": admin.email }))
}
