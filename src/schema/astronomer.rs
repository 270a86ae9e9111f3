//! Astronomer shapes.

use super::nullable;
use crate::service::{Format, Rules, ValidationRule};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Astronomer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub institution: Option<String>,
    pub country: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub specialization: Option<String>,
    pub biography: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Astronomer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AstronomerCreate {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AstronomerUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub institution: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub country: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub specialization: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub biography: Option<Option<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl AstronomerUpdate {
    pub fn apply(&self, a: &mut Astronomer) {
        if let Some(v) = &self.first_name {
            a.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            a.last_name = v.clone();
        }
        if let Some(v) = self.is_active {
            a.is_active = v;
        }
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(v) = &self.$field {
                    a.$field = v.clone();
                })*
            };
        }
        set!(email, institution, country, birth_date, specialization, biography);
    }

    /// The (first, last) pair after applying this update to `current`.
    pub fn resulting_name<'a>(&'a self, current: &'a Astronomer) -> (&'a str, &'a str) {
        (
            self.first_name.as_deref().unwrap_or(&current.first_name),
            self.last_name.as_deref().unwrap_or(&current.last_name),
        )
    }
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct AstronomerRead {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub astronomer: Astronomer,
    pub full_name: String,
    pub observations_count: i64,
    pub observed_bodies_count: i64,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AstronomerStatistics {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub by_country: BTreeMap<String, i64>,
    pub total_observations: i64,
    pub avg_observations_per_astronomer: f64,
}

impl AstronomerStatistics {
    /// Fill in `inactive` and the per-astronomer average (0 when there are no astronomers).
    pub fn from_counts(
        total: i64,
        active: i64,
        by_country: BTreeMap<String, i64>,
        total_observations: i64,
    ) -> Self {
        let avg = if total > 0 {
            total_observations as f64 / total as f64
        } else {
            0.0
        };
        AstronomerStatistics {
            total,
            active,
            inactive: total - active,
            by_country,
            total_observations,
            avg_observations_per_astronomer: avg,
        }
    }
}

pub fn rules() -> Rules {
    let mut r = Rules::new();
    r.insert("first_name", ValidationRule::default().required().length(1, 50));
    r.insert("last_name", ValidationRule::default().required().length(1, 50));
    r.insert(
        "email",
        ValidationRule::default().format(Format::Email).max_length(255),
    );
    r.insert("institution", ValidationRule::default().max_length(200));
    r.insert("country", ValidationRule::default().max_length(100));
    r.insert("birth_date", ValidationRule::default().format(Format::Date));
    r.insert("specialization", ValidationRule::default().max_length(200));
    r.insert("biography", ValidationRule::default().max_length(2000));
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::RequestValidator;
    use serde_json::json;

    #[test]
    fn create_defaults_to_active() {
        let a: AstronomerCreate =
            RequestValidator::parse(json!({ "first_name": "Vera", "last_name": "Rubin" }), &rules())
                .unwrap();
        assert!(a.is_active);
        assert!(a.email.is_none());
    }

    #[test]
    fn bad_birth_date_is_field_error() {
        let err = RequestValidator::parse::<AstronomerCreate>(
            json!({ "first_name": "Vera", "last_name": "Rubin", "birth_date": "1928-13-40" }),
            &rules(),
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::AppError::InvalidFields(f) if f.contains_key("birth_date")));
    }

    #[test]
    fn statistics_average_handles_empty_catalog() {
        let empty = AstronomerStatistics::from_counts(0, 0, BTreeMap::new(), 0);
        assert_eq!(empty.avg_observations_per_astronomer, 0.0);
        let s = AstronomerStatistics::from_counts(4, 3, BTreeMap::new(), 10);
        assert_eq!(s.inactive, 1);
        assert_eq!(s.avg_observations_per_astronomer, 2.5);
    }

    #[test]
    fn resulting_name_merges_current_values() {
        let now = Utc::now();
        let current = Astronomer {
            id: 1,
            first_name: "Edwin".into(),
            last_name: "Hubble".into(),
            email: None,
            institution: None,
            country: None,
            birth_date: None,
            specialization: None,
            biography: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let upd = AstronomerUpdate {
            last_name: Some("Powell Hubble".into()),
            ..Default::default()
        };
        assert_eq!(upd.resulting_name(&current), ("Edwin", "Powell Hubble"));
    }
}
