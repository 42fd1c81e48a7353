pub mod admin;
mod auth;
mod chirps;
mod error;
mod users;
mod webhooks;

use axum::{Router, http::StatusCode, routing::get};
use std::sync::Arc;

use crate::db::Database;
use crate::jwt::JwtConfig;
use crate::session::SessionManager;

pub use admin::AdminState;

/// Create the `/api` router.
pub fn create_api_router(
    db: Database,
    jwt: Arc<JwtConfig>,
    session: SessionManager,
    polka_key: String,
) -> Router {
    let users_state = users::UsersState {
        db: db.clone(),
        jwt: jwt.clone(),
    };

    let chirps_state = chirps::ChirpsState {
        db: db.clone(),
        jwt: jwt.clone(),
    };

    let auth_state = auth::AuthState {
        db: db.clone(),
        session,
    };

    let webhooks_state = webhooks::WebhooksState { db, polka_key };

    Router::new()
        .route("/healthz", get(readiness))
        .nest("/users", users::router(users_state))
        .nest("/chirps", chirps::router(chirps_state))
        .nest("/polka/webhooks", webhooks::router(webhooks_state))
        .merge(auth::router(auth_state))
}

async fn readiness() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
