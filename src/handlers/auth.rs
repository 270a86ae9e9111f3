//! Account handlers.

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::response::{created, no_content, ok};
use crate::schema::{user, LoginForm, UserCreate};
use crate::service::{AccountService, RequestValidator};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Form, Json};
use serde_json::Value;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let payload: UserCreate = RequestValidator::parse(body, &user::rules())?;
    let user = AccountService::register(state.store.as_ref(), payload).await?;
    Ok(created(user))
}

/// Form login. Returns the bare token object expected by OAuth2 password-flow clients.
pub async fn token(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let token =
        AccountService::login(state.store.as_ref(), &state.auth, &form.username, &form.password)
            .await?;
    Ok(ok(token))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Result<impl IntoResponse, AppError> {
    if !user.is_active {
        return Err(AppError::BadRequest("inactive user".into()));
    }
    Ok(ok(user))
}

pub async fn delete_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    AccountService::delete_account(state.store.as_ref(), &user).await?;
    Ok(no_content())
}
