//! songhive-server library
//!
//! HTTP/JSON API over the song, user, liked-song and playlist collections.
//! Every handler performs a single document store operation.

use axum::http::HeaderValue;
use axum::Router;
use chrono::{DateTime, Utc};
use songhive_common::config::CorsConfig;
use songhive_common::credentials::PasswordMode;
use songhive_common::DocumentStore;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod api;
pub mod error;
pub mod seed;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Collection accessors; the MongoDB adapter pools connections internally
    pub store: Arc<dyn DocumentStore>,
    /// How user passwords are stored and compared
    pub password_mode: PasswordMode,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, password_mode: PasswordMode) -> Self {
        Self {
            store,
            password_mode,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::song_routes())
        .merge(api::search_routes())
        .merge(api::user_routes())
        .merge(api::auth_routes())
        .merge(api::liked_song_routes())
        .merge(api::playlist_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy: any origin unless a list is configured
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
