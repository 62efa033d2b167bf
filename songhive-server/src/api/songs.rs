//! Song resource: CRUD keyed by the external `id`, plus genre filtering

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use songhive_common::models::{Record, Song};
use songhive_common::{Collection, Document, Filter, Update};

use super::{DeleteResponse, InsertResponse, UpdateResponse};
use crate::error::{ApiError, ApiResult, OrFail};
use crate::AppState;

/// GET /api/songs
pub async fn list_songs(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    let songs = state
        .store
        .find(Collection::Songs, &Filter::All)
        .await
        .or_fail("Failed to fetch songs")?;
    Ok(Json(songs))
}

/// POST /api/songs
///
/// Inserts the body verbatim; no schema validation.
pub async fn create_song(
    State(state): State<AppState>,
    payload: Result<Json<Song>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<InsertResponse>)> {
    const FAILED: &str = "Failed to add song";

    let Json(song) = payload.or_fail(FAILED)?;
    let doc = song.into_document().or_fail(FAILED)?;
    let outcome = state
        .store
        .insert_one(Collection::Songs, doc)
        .await
        .or_fail(FAILED)?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// GET /api/songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    state
        .store
        .find_one(Collection::Songs, &Filter::external_id(id))
        .await
        .or_fail("Failed to fetch song")?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Song not found".to_string()))
}

/// PUT /api/songs/:id
///
/// Partial update: only supplied fields are overwritten. An unknown id
/// yields `modified_count: 0`, not a 404.
pub async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Song>, JsonRejection>,
) -> ApiResult<Json<UpdateResponse>> {
    const FAILED: &str = "Failed to update song";

    let Json(song) = payload.or_fail(FAILED)?;
    let patch = song.into_patch().or_fail(FAILED)?;
    let outcome = state
        .store
        .update_one(Collection::Songs, &Filter::external_id(id), Update::Set(patch))
        .await
        .or_fail(FAILED)?;

    Ok(Json(outcome.into()))
}

/// DELETE /api/songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let outcome = state
        .store
        .delete_one(Collection::Songs, &Filter::external_id(id))
        .await
        .or_fail("Failed to delete song")?;

    Ok(Json(outcome.into()))
}

/// GET /api/songs/genre/:genre
///
/// Case-insensitive substring match on `genre`.
pub async fn songs_by_genre(
    State(state): State<AppState>,
    Path(genre): Path<String>,
) -> ApiResult<Json<Vec<Document>>> {
    let songs = state
        .store
        .find(Collection::Songs, &Filter::contains_any(&["genre"], genre))
        .await
        .or_fail("Failed to fetch songs by genre")?;
    Ok(Json(songs))
}

/// Build song routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/api/songs", get(list_songs).post(create_song))
        .route(
            "/api/songs/:id",
            get(get_song).put(update_song).delete(delete_song),
        )
        .route("/api/songs/genre/:genre", get(songs_by_genre))
}
