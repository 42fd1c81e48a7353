//! Webhook endpoint for the payment provider (Polka).
//!
//! Authenticated by a shared API key rather than a user token.

use axum::{
    Json, Router, extract::State, http::HeaderMap, http::StatusCode, response::IntoResponse,
    routing::post,
};
use serde::Deserialize;

use super::error::{ApiError, ResultExt};
use crate::auth::extract_api_key;
use crate::db::Database;

#[derive(Clone)]
pub struct WebhooksState {
    pub db: Database,
    pub polka_key: String,
}

pub fn router(state: WebhooksState) -> Router {
    Router::new()
        .route("/", post(polka_webhook))
        .with_state(state)
}

#[derive(Deserialize)]
struct WebhookRequest {
    event: String,
    data: WebhookData,
}

#[derive(Deserialize)]
struct WebhookData {
    #[serde(rename = "userId")]
    user_id: String,
}

async fn polka_webhook(
    State(state): State<WebhooksState>,
    headers: HeaderMap,
    Json(payload): Json<WebhookRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let api_key = extract_api_key(&headers)?;
    if api_key != state.polka_key {
        return Err(ApiError::unauthorized("Invalid ApiKey"));
    }

    if payload.event.is_empty() || payload.data.user_id.is_empty() {
        return Err(ApiError::bad_request("Missing required fields"));
    }

    // Unrecognized events are acknowledged without action
    if payload.event != "user.upgraded" {
        return Ok(StatusCode::NO_CONTENT);
    }

    let upgraded = state
        .db
        .users()
        .upgrade_red(&payload.data.user_id)
        .await
        .db_err("Failed to upgrade user")?;

    if !upgraded {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
