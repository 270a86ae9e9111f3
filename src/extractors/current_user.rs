//! Authenticated account from the `Authorization: Bearer <token>` header.

use crate::error::AppError;
use crate::schema::User;
use crate::service::AccountService;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

/// Extractor that rejects the request with 401 unless it carries a valid token for an
/// existing account. Activity is not checked here.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("not authenticated".into()))?;
        let user = AccountService::resolve_token(state.store.as_ref(), &state.auth, token).await?;
        Ok(CurrentUser(user))
    }
}
