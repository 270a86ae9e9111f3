//! Signed bearer tokens.

use crate::config::AuthConfig;
use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the account.
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

pub fn issue_token(config: &AuthConfig, subject: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let lifetime = Duration::try_minutes(config.access_token_expire_minutes)
        .ok_or_else(|| AppError::Internal("token lifetime out of range".into()))?;
    let claims = Claims {
        sub: subject.to_string(),
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
    };
    encode(
        &Header::new(config.algorithm),
        &claims,
        &EncodingKey::from_secret(config.secret_key.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
}

/// Verify signature and expiry (no leeway). Any failure is reported as an authentication
/// error without detail.
pub fn decode_token(config: &AuthConfig, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(config.algorithm);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret_key.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        AppError::Unauthorized("could not validate credentials".into())
    })
}
