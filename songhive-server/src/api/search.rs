//! Free-text song search

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use songhive_common::{Collection, Document, Filter};

use crate::error::{ApiResult, OrFail};
use crate::AppState;

/// Song fields a search query is matched against
pub const SEARCH_FIELDS: [&str; 4] = ["title", "artist", "album", "genre"];

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// GET /api/search?q=
///
/// Case-insensitive substring match against title, artist, album or genre.
/// A missing or empty `q` returns `[]` without querying the store.
pub async fn search_songs(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    let needle = match query.q {
        Some(q) if !q.is_empty() => q,
        _ => return Ok(Json(Vec::new())),
    };

    let songs = state
        .store
        .find(Collection::Songs, &Filter::contains_any(&SEARCH_FIELDS, needle))
        .await
        .or_fail("Search failed")?;
    Ok(Json(songs))
}

/// Build search routes
pub fn search_routes() -> Router<AppState> {
    Router::new().route("/api/search", get(search_songs))
}
