//! Liked-songs resource
//!
//! A liked song is a denormalized song copy tagged with `userId`. At most one
//! exists per (`id`, `userId`) pair.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use serde_json::Value;
use songhive_common::models::{LikedSong, Record, EXTERNAL_ID_FIELD, PRIMARY_KEY_FIELD};
use songhive_common::{Collection, Document, Filter, PrimaryKey};
use tracing::debug;

use super::{DeleteResponse, InsertResponse};
use crate::error::{ApiError, ApiResult, OrFail};
use crate::AppState;

/// GET /api/likedSongs/:userId
///
/// Empty array, not 404, when the user has no liked songs. Documents
/// lacking an external `id` get one copied from `_id`.
pub async fn list_liked_songs(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Document>>> {
    let liked = state
        .store
        .find(Collection::LikedSongs, &Filter::field("userId", user_id))
        .await
        .or_fail("Failed to fetch liked songs")?;

    Ok(Json(liked.into_iter().map(with_external_id).collect()))
}

fn with_external_id(mut doc: Document) -> Document {
    if !doc.contains_key(EXTERNAL_ID_FIELD) {
        if let Some(Value::String(key)) = doc.get(PRIMARY_KEY_FIELD).cloned() {
            doc.insert(EXTERNAL_ID_FIELD.to_string(), Value::String(key));
        }
    }
    doc
}

/// POST /api/likedSongs
///
/// 409 if the pair is already liked, then 400 if a required field is absent.
pub async fn create_liked_song(
    State(state): State<AppState>,
    payload: Result<Json<LikedSong>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<InsertResponse>)> {
    const FAILED: &str = "Failed to add liked song";

    let Json(liked) = payload.or_fail(FAILED)?;

    if let (Some(id), Some(user_id)) = (&liked.id, &liked.user_id) {
        let existing = state
            .store
            .find_one(
                Collection::LikedSongs,
                &Filter::external_id(id.clone()).and_field("userId", user_id.clone()),
            )
            .await
            .or_fail(FAILED)?;
        if existing.is_some() {
            return Err(ApiError::Conflict("Song already liked".to_string()));
        }
    }

    let missing = liked.missing_fields();
    if !missing.is_empty() {
        debug!("Liked song rejected, missing: {}", missing.join(", "));
        return Err(ApiError::InvalidRequest(
            "Missing required fields".to_string(),
        ));
    }

    let doc = liked.into_document().or_fail(FAILED)?;
    let outcome = state
        .store
        .insert_one(Collection::LikedSongs, doc)
        .await
        .or_fail(FAILED)?;

    let mut response = InsertResponse::from(outcome);
    response.message = Some("Song added to liked songs".to_string());
    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /api/likedSongs/:id
///
/// Deletes by external `id` first. Only when that removes nothing and `id`
/// is a well-formed primary key is the primary key tried.
pub async fn delete_liked_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    const FAILED: &str = "Failed to remove liked song";

    let mut outcome = state
        .store
        .delete_one(Collection::LikedSongs, &Filter::external_id(id.as_str()))
        .await
        .or_fail(FAILED)?;

    if outcome.deleted_count == 0 {
        if let Some(key) = PrimaryKey::parse(&id) {
            outcome = state
                .store
                .delete_one(Collection::LikedSongs, &Filter::PrimaryKey(key))
                .await
                .or_fail(FAILED)?;
        }
    }

    if outcome.deleted_count == 0 {
        return Err(ApiError::NotFound("Song not found".to_string()));
    }

    let mut response = DeleteResponse::from(outcome);
    response.message = Some("Song removed from liked songs".to_string());
    Ok(Json(response))
}

/// Build liked-song routes
///
/// GET and DELETE share one path pattern: the segment is a user id for GET
/// and a liked-song id for DELETE.
pub fn liked_song_routes() -> Router<AppState> {
    Router::new()
        .route("/api/likedSongs", post(create_liked_song))
        .route(
            "/api/likedSongs/:id",
            delete(delete_liked_song).get(list_liked_songs),
        )
}
