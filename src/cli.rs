//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use crate::jwt::DEFAULT_ACCESS_TOKEN_DURATION_SECS;
use clap::Parser;
use tracing::error;

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "Chirpy", about = "Social posting with token-based authentication")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, env = "DB_PATH", default_value = "chirpy.db")]
    pub database: String,

    /// Deployment platform; destructive admin endpoints require "dev"
    #[arg(long, env = "PLATFORM", default_value = "dev")]
    pub platform: String,

    /// Issuer claim embedded in access tokens
    #[arg(long, default_value = "chirpy")]
    pub jwt_issuer: String,

    /// Access token lifetime in seconds
    #[arg(long, env = "JWT_DURATION", default_value_t = DEFAULT_ACCESS_TOKEN_DURATION_SECS)]
    pub jwt_duration: u64,

    /// Refresh token lifetime in days
    #[arg(long, env = "REFRESH_TOKEN_DURATION", default_value = "60")]
    pub refresh_token_duration: u32,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Shared API key presented by the Polka webhook sender
    #[arg(long, env = "POLKA_KEY")]
    pub polka_key: String,

    /// Directory of static assets served at /app
    #[arg(long, default_value = "./app")]
    pub app_dir: String,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret must be at least {} characters",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Open the database, logging an error on failure.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => Some(db),
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

/// Assemble the server configuration from parsed arguments.
pub fn build_config(args: Args, db: Database, jwt_secret: String) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        jwt_issuer: args.jwt_issuer,
        jwt_duration_secs: args.jwt_duration,
        refresh_token_duration_days: args.refresh_token_duration,
        platform: args.platform,
        polka_key: args.polka_key,
        app_dir: args.app_dir,
    }
}
