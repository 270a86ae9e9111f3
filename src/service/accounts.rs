//! Registration, login, and bearer token resolution.

use crate::auth::{decode_token, hash_password, issue_token, verify_password, DUMMY_HASH};
use crate::config::AuthConfig;
use crate::error::AppError;
use crate::schema::{NewUser, TokenResponse, User, UserCreate};
use crate::store::CatalogStore;

const BAD_CREDENTIALS: &str = "incorrect username or password";
const BAD_TOKEN: &str = "could not validate credentials";

pub struct AccountService;

/// Run CPU-heavy password work off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("password task failed: {}", e)))
}

impl AccountService {
    pub async fn register(store: &dyn CatalogStore, payload: UserCreate) -> Result<User, AppError> {
        if store.find_user_by_username(&payload.username).await?.is_some() {
            return Err(AppError::Conflict("username already registered".into()));
        }
        if store.find_user_by_email(&payload.email).await?.is_some() {
            return Err(AppError::Conflict("email already registered".into()));
        }
        let password = payload.password;
        let hashed_password = blocking(move || hash_password(&password)).await??;
        let user = store
            .insert_user(&NewUser {
                username: payload.username,
                email: payload.email,
                hashed_password,
                full_name: payload.full_name,
                is_active: payload.is_active,
            })
            .await?;
        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Check credentials. Unknown user and wrong password produce the same error.
    pub async fn authenticate(
        store: &dyn CatalogStore,
        username: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let password = password.to_string();
        let Some(user) = store.find_user_by_username(username).await? else {
            blocking(move || verify_password(&password, DUMMY_HASH)).await?;
            tracing::warn!(username, "login for unknown user");
            return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
        };
        let hashed = user.hashed_password.clone();
        if !blocking(move || verify_password(&password, &hashed)).await? {
            tracing::warn!(username, "login with wrong password");
            return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
        }
        if !user.is_active {
            return Err(AppError::BadRequest("inactive user".into()));
        }
        Ok(user)
    }

    pub async fn login(
        store: &dyn CatalogStore,
        auth: &AuthConfig,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, AppError> {
        let user = Self::authenticate(store, username, password).await?;
        let token = issue_token(auth, &user.username)?;
        tracing::info!(user_id = user.id, "access token issued");
        Ok(TokenResponse::bearer(token))
    }

    /// Resolve a bearer token to its account. The account may be inactive.
    pub async fn resolve_token(
        store: &dyn CatalogStore,
        auth: &AuthConfig,
        token: &str,
    ) -> Result<User, AppError> {
        let claims = decode_token(auth, token)?;
        store
            .find_user_by_username(&claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::warn!(subject = %claims.sub, "token for unknown user");
                AppError::Unauthorized(BAD_TOKEN.into())
            })
    }

    pub async fn delete_account(store: &dyn CatalogStore, user: &User) -> Result<(), AppError> {
        if !store.delete_user(user.id).await? {
            return Err(AppError::NotFound(format!("user {} not found", user.id)));
        }
        tracing::info!(user_id = user.id, "user deleted");
        Ok(())
    }
}
