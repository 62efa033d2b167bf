//! Credential check
//!
//! Stateless: a successful login returns the stored user document and
//! nothing else. No sessions, tokens or rate limiting.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use songhive_common::credentials::{password_matches, PasswordMode};
use songhive_common::{Collection, Document, Filter};
use tracing::debug;

use crate::error::{ApiError, ApiResult, OrFail};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".to_string())
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<Document>> {
    const FAILED: &str = "Login failed";

    let Json(request) = payload.or_fail(FAILED)?;
    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(invalid_credentials());
    };

    let user = match state.password_mode {
        PasswordMode::Plaintext => {
            let filter = Filter::field("email", email.as_str()).and_field("password", password);
            state
                .store
                .find_one(Collection::Users, &filter)
                .await
                .or_fail(FAILED)?
        }
        // Several accounts may share an email; any whose hash verifies wins
        PasswordMode::Hashed => state
            .store
            .find(Collection::Users, &Filter::field("email", email.as_str()))
            .await
            .or_fail(FAILED)?
            .into_iter()
            .find(|user| match user.get("password") {
                Some(Value::String(stored)) => {
                    password_matches(&password, stored, PasswordMode::Hashed)
                }
                _ => false,
            }),
    };

    match user {
        Some(user) => Ok(Json(user)),
        None => {
            debug!("Rejected login for {}", email);
            Err(invalid_credentials())
        }
    }
}

/// Build auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}
