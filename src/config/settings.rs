//! Process settings read once from the environment at start-up.

use crate::error::ConfigError;
use jsonwebtoken::Algorithm;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_APP_NAME: &str = "Astronomical Catalog API";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_TOKEN_MINUTES: i64 = 30;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Token signing parameters handed to the auth component.
#[derive(Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
}

impl AuthConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        AuthConfig {
            secret_key: secret_key.into(),
            algorithm: Algorithm::HS256,
            access_token_expire_minutes: DEFAULT_TOKEN_MINUTES,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: String,
    pub app_name: String,
    pub debug: bool,
    pub auth: AuthConfig,
}

impl Settings {
    /// Load `.env` (if present) and read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let secret_key = get("SECRET_KEY").ok_or(ConfigError::Missing("SECRET_KEY"))?;

        let algorithm = match get("ALGORITHM") {
            Some(name) => parse_algorithm(&name)?,
            None => Algorithm::HS256,
        };

        let access_token_expire_minutes = match get("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => {
                let n: i64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "ACCESS_TOKEN_EXPIRE_MINUTES",
                    reason: format!("'{}' is not an integer", raw),
                })?;
                if n <= 0 {
                    return Err(ConfigError::Invalid {
                        var: "ACCESS_TOKEN_EXPIRE_MINUTES",
                        reason: "must be positive".into(),
                    });
                }
                n
            }
            None => DEFAULT_TOKEN_MINUTES,
        };

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "DATABASE_MAX_CONNECTIONS",
                        reason: format!("'{}' is not a positive integer", raw),
                    })
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let debug = match get("DEBUG") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                var: "DEBUG",
                reason: format!("'{}' is not a boolean", raw),
            })?,
            None => false,
        };

        Ok(Settings {
            database_url,
            database_max_connections,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            app_name: get("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.into()),
            debug,
            auth: AuthConfig {
                secret_key,
                algorithm,
                access_token_expire_minutes,
            },
        })
    }
}

/// Only HMAC algorithms are accepted: the signing key is a shared secret.
fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    let alg = Algorithm::from_str(&name.to_uppercase()).map_err(|_| ConfigError::Invalid {
        var: "ALGORITHM",
        reason: format!("unknown algorithm '{}'", name),
    })?;
    match alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(alg),
        other => Err(ConfigError::Invalid {
            var: "ALGORITHM",
            reason: format!("{:?} needs a key pair; use HS256, HS384 or HS512", other),
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_absent() {
        let s = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/astro"),
            ("SECRET_KEY", "s3cret"),
        ]))
        .unwrap();
        assert_eq!(s.app_name, DEFAULT_APP_NAME);
        assert_eq!(s.auth.algorithm, Algorithm::HS256);
        assert_eq!(s.auth.access_token_expire_minutes, 30);
        assert_eq!(s.bind_addr, DEFAULT_BIND_ADDR);
        assert!(!s.debug);
    }

    #[test]
    fn missing_database_url_fails() {
        let err = Settings::from_lookup(lookup(&[("SECRET_KEY", "s3cret")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let err = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/astro"),
            ("SECRET_KEY", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SECRET_KEY")));
    }

    #[test]
    fn parses_overrides() {
        let s = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/astro"),
            ("SECRET_KEY", "s3cret"),
            ("ALGORITHM", "hs512"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "90"),
            ("APP_NAME", "Sky Survey"),
            ("DEBUG", "true"),
        ]))
        .unwrap();
        assert_eq!(s.auth.algorithm, Algorithm::HS512);
        assert_eq!(s.auth.access_token_expire_minutes, 90);
        assert_eq!(s.app_name, "Sky Survey");
        assert!(s.debug);
    }

    #[test]
    fn rejects_asymmetric_algorithm_and_bad_lifetime() {
        let base = [
            ("DATABASE_URL", "postgres://localhost/astro"),
            ("SECRET_KEY", "s3cret"),
        ];
        let mut with_rs = base.to_vec();
        with_rs.push(("ALGORITHM", "RS256"));
        assert!(matches!(
            Settings::from_lookup(lookup(&with_rs)),
            Err(ConfigError::Invalid { var: "ALGORITHM", .. })
        ));

        let mut with_zero = base.to_vec();
        with_zero.push(("ACCESS_TOKEN_EXPIRE_MINUTES", "0"));
        assert!(matches!(
            Settings::from_lookup(lookup(&with_zero)),
            Err(ConfigError::Invalid { var: "ACCESS_TOKEN_EXPIRE_MINUTES", .. })
        ));
    }

    #[test]
    fn empty_connection_pool_rejected() {
        let err = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/astro"),
            ("SECRET_KEY", "s3cret"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { var: "DATABASE_MAX_CONNECTIONS", .. }
        ));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let auth = AuthConfig::new("top-secret");
        assert!(!format!("{:?}", auth).contains("top-secret"));
    }
}
