//! Auth HTTP handlers: signup, login, me.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::auth::{verify_password, Claims, Identity};
use crate::db::StoreError;
use crate::error::{AppError, AppResult};
use crate::handlers::http::AppState;
use crate::handlers::users::prepare_new_user;
use crate::middleware::auth::AuthUser;
use crate::models::{LoginRequest, UserRequest};

/// Shared by every credential failure so responses cannot reveal which usernames exist.
const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub message: &'static str,
    pub token: String,
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<UserRequest>, AppError>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    let new_user = prepare_new_user(body)?;
    let user = state.users().create(new_user).await?;
    let token = state.tokens().issue(Identity::from(&user))?;
    info!(user_id = user.id, username = %user.username, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            message: "User created successfully",
            token,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, AppError>,
) -> AppResult<Json<TokenResponse>> {
    let user = match state.users().get_by_username(&body.username).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => {
            debug!("login rejected: unknown username");
            return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
        }
        Err(e) => {
            warn!(error = %e, "login lookup failed");
            return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
        }
    };

    if !verify_password(&body.password, &user.password) {
        debug!(user_id = user.id, "login rejected: password mismatch");
        return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    let token = state.tokens().issue(Identity::from(&user))?;
    info!(user_id = user.id, "user logged in");

    Ok(Json(TokenResponse {
        message: "User logged successfully",
        token,
    }))
}

/// GET /api/auth/me — claims of the presented bearer token.
pub async fn me(AuthUser(claims): AuthUser) -> Json<Claims> {
    Json(claims)
}
