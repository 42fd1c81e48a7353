//! Admin endpoints: metrics page and the dev-only state reset.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
};

use super::error::{ApiError, ResultExt};
use crate::db::Database;
use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AdminState {
    pub db: Database,
    pub metrics: Metrics,
    pub platform: String,
}

pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/metrics", get(show_metrics))
        .route("/reset", post(reset))
        .with_state(state)
}

async fn show_metrics(State(state): State<AdminState>) -> impl IntoResponse {
    Html(format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>\n",
        state.metrics.hits()
    ))
}

/// Destructive dev-only reset: drops all users (chirps and refresh tokens
/// cascade) and zeroes the hit counter.
async fn reset(State(state): State<AdminState>) -> Result<impl IntoResponse, ApiError> {
    if state.platform != "dev" {
        return Err(ApiError::forbidden(
            "Reset is only allowed in dev environment.",
        ));
    }

    state
        .db
        .users()
        .delete_all()
        .await
        .db_err("Failed to reset users")?;
    state.metrics.reset();

    Ok((
        StatusCode::OK,
        "Hits reset to 0 and all users were deleted from database",
    ))
}
