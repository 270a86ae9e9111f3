//! User account shapes.

use crate::service::{Format, Rules, ValidationRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// A validated registration with the password already hashed.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub is_active: bool,
}

/// Form fields of `POST /auth/token`.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        TokenResponse {
            access_token,
            token_type: "bearer".into(),
        }
    }
}

pub fn rules() -> Rules {
    let mut r = Rules::new();
    r.insert(
        "username",
        ValidationRule::default()
            .required()
            .length(3, 50)
            .pattern(r"^[A-Za-z0-9_.-]+$"),
    );
    r.insert(
        "email",
        ValidationRule::default().required().format(Format::Email).max_length(255),
    );
    r.insert("password", ValidationRule::default().required().length(8, 128));
    r.insert("full_name", ValidationRule::default().max_length(100));
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::service::RequestValidator;
    use serde_json::json;

    #[test]
    fn short_password_rejected() {
        let err = RequestValidator::parse::<UserCreate>(
            json!({ "username": "hubble", "email": "edwin@mtwilson.org", "password": "short" }),
            &rules(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, AppError::InvalidFields(f) if f.contains_key("password")));
    }

    #[test]
    fn eight_character_password_accepted() {
        let u: UserCreate = RequestValidator::parse(
            json!({ "username": "hubble", "email": "edwin@mtwilson.org", "password": "Abcdefg1" }),
            &rules(),
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert!(u.is_active);
    }

    #[test]
    fn username_charset_enforced() {
        let err = RequestValidator::parse::<UserCreate>(
            json!({ "username": "edwin hubble", "email": "edwin@mtwilson.org", "password": "Abcdefg1" }),
            &rules(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, AppError::InvalidFields(f) if f.contains_key("username")));
    }

    #[test]
    fn hashed_password_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: 1,
            username: "hubble".into(),
            email: "edwin@mtwilson.org".into(),
            hashed_password: "$argon2id$v=19$...".into(),
            full_name: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let v = serde_json::to_value(&user).unwrap();
        assert!(v.get("hashed_password").is_none());
        assert_eq!(v["username"], "hubble");
    }
}
