use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;
use uuid::Uuid;

use super::jwt::TokenService;
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

/// Resolves a raw `Authorization` value to the caller's user id.
pub fn identify(tokens: &TokenService, authorization: Option<&str>) -> AppResult<Uuid> {
    let raw = match authorization.map(str::trim) {
        None | Some("") => return Err(AppError::MissingCredential),
        Some(raw) => raw,
    };

    // Expect "Bearer <token>"
    let (scheme, token) = raw
        .split_once(' ')
        .ok_or(AppError::MalformedCredential)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AppError::MalformedCredential);
    }

    tokens.validate(token)
}

/// Authenticated caller. Ledger handlers take the user id only from here.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(axum::http::header::AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| AppError::MalformedCredential)?),
            None => None,
        };

        identify(&state.tokens, header).map(AuthUser).map_err(|e| {
            warn!(error = %e, "request authentication failed");
            e
        })
    }
}
