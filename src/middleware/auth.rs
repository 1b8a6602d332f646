//! Bearer-token extractor for protected routes.

use axum::http::{header::AUTHORIZATION, request::Parts};

use crate::auth::Claims;
use crate::error::AppError;
use crate::handlers::http::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extractor: verified claims from `Authorization: Bearer <token>`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix(BEARER_PREFIX))
            .ok_or_else(|| AppError::InvalidToken("Missing or invalid Authorization header".to_string()))?;
        let claims = state.tokens().verify(token)?;
        Ok(AuthUser(claims))
    }
}
