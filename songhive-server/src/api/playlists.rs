//! Playlist resource
//!
//! Playlists embed denormalized song copies in `songs`. Copies are taken at
//! insertion time and never follow later edits of the source song.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use songhive_common::models::{Playlist, Record, PRIMARY_KEY_FIELD};
use songhive_common::{Collection, Document, Filter, Update};

use super::{DeleteResponse, InsertResponse, UpdateResponse};
use crate::error::{ApiError, ApiResult, OrFail};
use crate::AppState;

/// Array field holding the embedded song copies
const SONGS_FIELD: &str = "songs";

/// GET /api/playlists
pub async fn list_playlists(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    let playlists = state
        .store
        .find(Collection::Playlists, &Filter::All)
        .await
        .or_fail("Failed to fetch playlists")?;
    Ok(Json(playlists))
}

/// GET /api/playlists/:id
pub async fn get_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    state
        .store
        .find_one(Collection::Playlists, &Filter::external_id(id))
        .await
        .or_fail("Failed to fetch playlist")?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Playlist not found".to_string()))
}

/// POST /api/playlists
pub async fn create_playlist(
    State(state): State<AppState>,
    payload: Result<Json<Playlist>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<InsertResponse>)> {
    const FAILED: &str = "Failed to create playlist";

    let Json(playlist) = payload.or_fail(FAILED)?;
    let doc = playlist.into_document().or_fail(FAILED)?;
    let outcome = state
        .store
        .insert_one(Collection::Playlists, doc)
        .await
        .or_fail(FAILED)?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// PUT /api/playlists/:id
pub async fn update_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Playlist>, JsonRejection>,
) -> ApiResult<Json<UpdateResponse>> {
    const FAILED: &str = "Failed to update playlist";

    let Json(playlist) = payload.or_fail(FAILED)?;
    let patch = playlist.into_patch().or_fail(FAILED)?;
    let outcome = state
        .store
        .update_one(Collection::Playlists, &Filter::external_id(id), Update::Set(patch))
        .await
        .or_fail(FAILED)?;

    Ok(Json(outcome.into()))
}

/// DELETE /api/playlists/:id
pub async fn delete_playlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let outcome = state
        .store
        .delete_one(Collection::Playlists, &Filter::external_id(id))
        .await
        .or_fail("Failed to delete playlist")?;

    Ok(Json(outcome.into()))
}

/// POST /api/playlists/:id/songs/:song_id
///
/// Appends a copy of the song without its `_id`. The same song may be
/// appended more than once. An unknown playlist yields `modified_count: 0`.
pub async fn add_song_to_playlist(
    State(state): State<AppState>,
    Path((playlist_id, song_id)): Path<(String, String)>,
) -> ApiResult<Json<UpdateResponse>> {
    const FAILED: &str = "Failed to add song to playlist";

    let mut song = state
        .store
        .find_one(Collection::Songs, &Filter::external_id(song_id))
        .await
        .or_fail(FAILED)?
        .ok_or_else(|| ApiError::NotFound("Song not found".to_string()))?;
    song.remove(PRIMARY_KEY_FIELD);

    let outcome = state
        .store
        .update_one(
            Collection::Playlists,
            &Filter::external_id(playlist_id),
            Update::Push {
                field: SONGS_FIELD.to_string(),
                value: Value::Object(song),
            },
        )
        .await
        .or_fail(FAILED)?;

    Ok(Json(outcome.into()))
}

/// DELETE /api/playlists/:id/songs/:song_id
///
/// Removes every embedded copy whose `id` equals `song_id`.
pub async fn remove_song_from_playlist(
    State(state): State<AppState>,
    Path((playlist_id, song_id)): Path<(String, String)>,
) -> ApiResult<Json<UpdateResponse>> {
    let outcome = state
        .store
        .update_one(
            Collection::Playlists,
            &Filter::external_id(playlist_id),
            Update::PullById {
                field: SONGS_FIELD.to_string(),
                id: song_id,
            },
        )
        .await
        .or_fail("Failed to remove song from playlist")?;

    Ok(Json(outcome.into()))
}

/// Build playlist routes
pub fn playlist_routes() -> Router<AppState> {
    Router::new()
        .route("/api/playlists", get(list_playlists).post(create_playlist))
        .route(
            "/api/playlists/:id",
            get(get_playlist).put(update_playlist).delete(delete_playlist),
        )
        .route(
            "/api/playlists/:id/songs/:song_id",
            post(add_song_to_playlist).delete(remove_song_from_playlist),
        )
}
