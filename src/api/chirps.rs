//! Chirps API endpoints.
//!
//! - POST `/` - Post a chirp (authenticated, validated body)
//! - GET `/` - List chirps, optionally filtered by author and sorted
//! - GET `/{id}` - Fetch a single chirp
//! - DELETE `/{id}` - Delete own chirp (author only)

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::auth::{ApiAuth, assert_owner};
use crate::db::{Chirp, Database, SortOrder};
use crate::impl_has_auth_state;
use crate::jwt::JwtConfig;

const MAX_CHIRP_LENGTH: usize = 140;

const BAD_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

#[derive(Clone)]
pub struct ChirpsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_state!(ChirpsState);

pub fn router(state: ChirpsState) -> Router {
    Router::new()
        .route("/", post(create_chirp))
        .route("/", get(list_chirps))
        .route("/{id}", get(get_chirp))
        .route("/{id}", delete(delete_chirp))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateChirpRequest {
    body: String,
}

#[derive(Deserialize)]
struct ListChirpsQuery {
    #[serde(rename = "authorId")]
    author_id: Option<String>,
    sort: Option<String>,
}

#[derive(Serialize)]
struct ChirpResponse {
    id: String,
    #[serde(rename = "userId")]
    user_id: String,
    body: String,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "updatedAt")]
    updated_at: String,
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.id,
            user_id: chirp.user_id,
            body: chirp.body,
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
        }
    }
}

/// Replace denylisted words with `****`. Whole words only, case-insensitive;
/// punctuation-attached occurrences pass through.
fn clean_chirp_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if BAD_WORDS.contains(&word.to_lowercase().as_str()) {
                "****"
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn validate_chirp_body(body: &str) -> Result<String, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("missing required fields"));
    }
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ApiError::bad_request("Chirp is too long"));
    }
    Ok(clean_chirp_body(body))
}

async fn create_chirp(
    State(state): State<ChirpsState>,
    ApiAuth(user): ApiAuth,
    Json(payload): Json<CreateChirpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cleaned = validate_chirp_body(&payload.body)?;

    let chirp = state
        .db
        .chirps()
        .create(&user.id, &cleaned)
        .await
        .db_err("Failed to create chirp")?;

    Ok((StatusCode::CREATED, Json(ChirpResponse::from(chirp))))
}

async fn list_chirps(
    State(state): State<ChirpsState>,
    Query(query): Query<ListChirpsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let sort = query
        .sort
        .as_deref()
        .map(SortOrder::from_query)
        .unwrap_or_default();

    let chirps = match query.author_id {
        Some(author_id) => state
            .db
            .chirps()
            .list_by_user(&author_id, sort)
            .await
            .db_err("Failed to list chirps")?,
        None => state
            .db
            .chirps()
            .list(sort)
            .await
            .db_err("Failed to list chirps")?,
    };

    let response: Vec<ChirpResponse> = chirps.into_iter().map(ChirpResponse::from).collect();
    Ok(Json(response))
}

async fn get_chirp(
    State(state): State<ChirpsState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let chirp = state
        .db
        .chirps()
        .get(&id)
        .await
        .db_err("Failed to get chirp")?
        .ok_or_else(|| ApiError::not_found("Chirp not found"))?;

    Ok(Json(ChirpResponse::from(chirp)))
}

async fn delete_chirp(
    State(state): State<ChirpsState>,
    ApiAuth(user): ApiAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let chirp = state
        .db
        .chirps()
        .get(&id)
        .await
        .db_err("Failed to get chirp")?
        .ok_or_else(|| ApiError::not_found("Chirp not found"))?;

    assert_owner(&user.id, &chirp.user_id)?;

    state
        .db
        .chirps()
        .delete(&id)
        .await
        .db_err("Failed to delete chirp")?;

    Ok(StatusCode::NO_CONTENT)
}
