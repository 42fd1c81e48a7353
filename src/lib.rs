pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod metrics;
pub mod session;

use api::create_api_router;
use axum::{Router, middleware};
use db::Database;
use jwt::JwtConfig;
use metrics::Metrics;
use session::SessionManager;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// Secret for signing access tokens
    pub jwt_secret: Vec<u8>,
    /// Issuer claim embedded in access tokens
    pub jwt_issuer: String,
    /// Access token lifetime in seconds
    pub jwt_duration_secs: u64,
    /// Refresh token lifetime in days
    pub refresh_token_duration_days: u32,
    /// Deployment platform; destructive admin endpoints require "dev"
    pub platform: String,
    /// Shared API key presented by the Polka webhook sender
    pub polka_key: String,
    /// Directory served at /app
    pub app_dir: String,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::new(
        &config.jwt_secret,
        &config.jwt_issuer,
        config.jwt_duration_secs,
    ));
    let metrics = Metrics::new();
    let session = SessionManager::new(
        config.db.clone(),
        jwt.clone(),
        config.refresh_token_duration_days,
    );

    let api_router = create_api_router(
        config.db.clone(),
        jwt,
        session,
        config.polka_key.clone(),
    );

    let admin_router = api::admin::router(api::AdminState {
        db: config.db.clone(),
        metrics: metrics.clone(),
        platform: config.platform.clone(),
    });

    // Static app assets behind the hit counter
    let app_routes = Router::new()
        .nest_service("/app", ServeDir::new(&config.app_dir))
        .layer(middleware::from_fn_with_state(
            metrics.clone(),
            metrics::track_hits,
        ));

    Router::new()
        .nest("/api", api_router)
        .nest("/admin", admin_router)
        .merge(app_routes)
}

/// Run the server on the given listener. This function blocks until the
/// server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}
