//! User resource

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use songhive_common::credentials::protect_password;
use songhive_common::models::{Record, User};
use songhive_common::{Collection, Document, Filter};

use super::InsertResponse;
use crate::error::{ApiError, ApiResult, OrFail};
use crate::AppState;

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    let users = state
        .store
        .find(Collection::Users, &Filter::All)
        .await
        .or_fail("Failed to fetch users")?;
    Ok(Json(users))
}

/// POST /api/users
///
/// Stored verbatim except for a string `password`, which is hashed unless
/// the service runs in plaintext mode.
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<User>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<InsertResponse>)> {
    const FAILED: &str = "Failed to add user";

    let Json(mut user) = payload.or_fail(FAILED)?;
    if let Some(Value::String(password)) = &user.password {
        let protected = protect_password(password, state.password_mode).or_fail(FAILED)?;
        user.password = Some(Value::String(protected));
    }

    let doc = user.into_document().or_fail(FAILED)?;
    let outcome = state
        .store
        .insert_one(Collection::Users, doc)
        .await
        .or_fail(FAILED)?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    state
        .store
        .find_one(Collection::Users, &Filter::external_id(id))
        .await
        .or_fail("Failed to fetch user")?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Build user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/:id", get(get_user))
}
