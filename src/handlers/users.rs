//! User management handlers under `/api/users`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use tracing::info;

use crate::auth::hash_password;
use crate::error::{AppError, AppResult};
use crate::handlers::http::AppState;
use crate::models::{avatar_url, NewUser, UpdateUserRequest, User, UserPatch, UserRequest};
use crate::validation::validate;

/// Parse a path id. Non-numeric ids are reported exactly like missing ones.
fn parse_user_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| AppError::NotFound("User not found".to_string()))
}

/// Validate, hash and derive the avatar for a new account.
pub(crate) fn prepare_new_user(body: UserRequest) -> AppResult<NewUser> {
    validate(&body)?;
    let password = hash_password(&body.password)?;
    Ok(NewUser {
        avatar_url: avatar_url(&body.username),
        username: body.username,
        password,
    })
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<UserRequest>, AppError>,
) -> AppResult<(StatusCode, Json<User>)> {
    let new_user = prepare_new_user(body)?;
    let user = state.users().create(new_user).await?;
    info!(user_id = user.id, username = %user.username, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users().list().await?))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<User>> {
    let id = parse_user_id(&id)?;
    Ok(Json(state.users().get_by_id(id).await?))
}

/// PATCH /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(body), _): WithRejection<Json<UpdateUserRequest>, AppError>,
) -> AppResult<Json<User>> {
    let id = parse_user_id(&id)?;
    validate(&body)?;

    let patch = UserPatch {
        avatar_url: body.username.as_deref().map(avatar_url),
        password: body.password.as_deref().map(hash_password).transpose()?,
        username: body.username,
    };
    let user = if patch.is_empty() {
        state.users().get_by_id(id).await?
    } else {
        state.users().update_by_id(id, patch).await?
    };
    Ok(Json(user))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_user_id(&id)?;
    state.users().delete_by_id(id).await?;
    info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
