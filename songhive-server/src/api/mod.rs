//! HTTP API handlers for songhive-server
//!
//! All resource routes live under `/api`. Response bodies mirror the
//! document store outcomes (`acknowledged`, `inserted_id`, `modified_count`,
//! `deleted_count`).

pub mod auth;
pub mod health;
pub mod liked_songs;
pub mod playlists;
pub mod search;
pub mod songs;
pub mod users;

pub use auth::auth_routes;
pub use health::health_routes;
pub use liked_songs::liked_song_routes;
pub use playlists::playlist_routes;
pub use search::search_routes;
pub use songs::song_routes;
pub use users::user_routes;

use serde::Serialize;
use songhive_common::store::{DeleteOutcome, InsertOutcome, UpdateOutcome};

/// Body of every successful create (201)
#[derive(Debug, Serialize)]
pub struct InsertResponse {
    pub acknowledged: bool,
    pub inserted_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<InsertOutcome> for InsertResponse {
    fn from(outcome: InsertOutcome) -> Self {
        Self {
            acknowledged: outcome.acknowledged,
            inserted_id: outcome.inserted_id,
            message: None,
        }
    }
}

/// Body of every update, including playlist song push/pull
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub acknowledged: bool,
    pub modified_count: u64,
}

impl From<UpdateOutcome> for UpdateResponse {
    fn from(outcome: UpdateOutcome) -> Self {
        Self {
            acknowledged: outcome.acknowledged,
            modified_count: outcome.modified_count,
        }
    }
}

/// Body of every delete
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub acknowledged: bool,
    pub deleted_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<DeleteOutcome> for DeleteResponse {
    fn from(outcome: DeleteOutcome) -> Self {
        Self {
            acknowledged: outcome.acknowledged,
            deleted_count: outcome.deleted_count,
            message: None,
        }
    }
}
