//! Celestial body shapes.

use super::{nullable, NumericSummary};
use crate::error::AppError;
use crate::service::{Rules, ValidationRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "celestial_body_type", rename_all = "snake_case")]
pub enum BodyType {
    Planet,
    Star,
    Galaxy,
    Nebula,
    Comet,
    Asteroid,
    BlackHole,
}

impl BodyType {
    pub const ALL: [BodyType; 7] = [
        BodyType::Planet,
        BodyType::Star,
        BodyType::Galaxy,
        BodyType::Nebula,
        BodyType::Comet,
        BodyType::Asteroid,
        BodyType::BlackHole,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::Planet => "planet",
            BodyType::Star => "star",
            BodyType::Galaxy => "galaxy",
            BodyType::Nebula => "nebula",
            BodyType::Comet => "comet",
            BodyType::Asteroid => "asteroid",
            BodyType::BlackHole => "black_hole",
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BodyType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "unknown body type '{}' (expected one of: {})",
                    s,
                    BodyType::ALL.map(|t| t.as_str()).join(", ")
                ))
            })
    }
}

/// One `celestial_bodies` row.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct CelestialBody {
    pub id: i64,
    pub name: String,
    pub body_type: BodyType,
    pub mass: Option<f64>,
    pub radius: Option<f64>,
    pub temperature: Option<f64>,
    pub distance: Option<f64>,
    pub apparent_magnitude: Option<f64>,
    pub absolute_magnitude: Option<f64>,
    pub spectral_class: Option<String>,
    pub right_ascension: Option<f64>,
    pub declination: Option<f64>,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CelestialBodyCreate {
    pub name: String,
    pub body_type: BodyType,
    #[serde(default)]
    pub mass: Option<f64>,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub apparent_magnitude: Option<f64>,
    #[serde(default)]
    pub absolute_magnitude: Option<f64>,
    #[serde(default)]
    pub spectral_class: Option<String>,
    #[serde(default)]
    pub right_ascension: Option<f64>,
    #[serde(default)]
    pub declination: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// Partial update. Outer `None` leaves the column untouched; `Some(None)` clears it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CelestialBodyUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body_type: Option<BodyType>,
    #[serde(default, deserialize_with = "nullable")]
    pub mass: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub radius: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub temperature: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub distance: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub apparent_magnitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub absolute_magnitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub spectral_class: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub right_ascension: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub declination: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub parent_id: Option<Option<i64>>,
}

impl CelestialBodyUpdate {
    /// Apply present fields to a row in place.
    pub fn apply(&self, body: &mut CelestialBody) {
        if let Some(v) = &self.name {
            body.name = v.clone();
        }
        if let Some(v) = self.body_type {
            body.body_type = v;
        }
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(v) = &self.$field {
                    body.$field = v.clone();
                })*
            };
        }
        set!(
            mass,
            radius,
            temperature,
            distance,
            apparent_magnitude,
            absolute_magnitude,
            spectral_class,
            right_ascension,
            declination,
            description,
            parent_id
        );
    }
}

/// Response shape: the row plus fields derived from related rows.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct CelestialBodyRead {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub body: CelestialBody,
    pub parent_name: Option<String>,
    pub children_count: i64,
    pub observations_count: i64,
    /// Distinct "first last" names of astronomers who observed this body, sorted.
    pub observers: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct BodyStatistics {
    pub total: i64,
    pub by_type: BTreeMap<String, i64>,
    pub distance: NumericSummary,
    pub apparent_magnitude: NumericSummary,
}

/// Field rules shared by create (full) and update (partial) validation.
pub fn rules() -> Rules {
    let mut r = Rules::new();
    r.insert("name", ValidationRule::default().required().length(1, 100));
    r.insert("body_type", ValidationRule::default().required());
    r.insert("mass", ValidationRule::default().greater_than(0.0));
    r.insert("radius", ValidationRule::default().greater_than(0.0));
    r.insert("temperature", ValidationRule::default().minimum(0.0));
    r.insert("distance", ValidationRule::default().minimum(0.0));
    r.insert("apparent_magnitude", ValidationRule::default().range(-30.0, 30.0));
    r.insert("absolute_magnitude", ValidationRule::default().range(-30.0, 30.0));
    r.insert("spectral_class", ValidationRule::default().max_length(10));
    r.insert("right_ascension", ValidationRule::default().range(0.0, 360.0));
    r.insert("declination", ValidationRule::default().range(-90.0, 90.0));
    r.insert("description", ValidationRule::default().max_length(2000));
    r.insert("parent_id", ValidationRule::default().minimum(1.0));
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::RequestValidator;
    use serde_json::json;

    #[test]
    fn body_type_parses_snake_case() {
        assert_eq!("black_hole".parse::<BodyType>().unwrap(), BodyType::BlackHole);
        assert!("quasar".parse::<BodyType>().is_err());
        assert_eq!(serde_json::to_value(BodyType::BlackHole).unwrap(), json!("black_hole"));
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let upd: CelestialBodyUpdate =
            RequestValidator::parse_partial(json!({ "mass": null, "distance": 4.2 }), &rules())
                .unwrap();
        assert_eq!(upd.mass, Some(None));
        assert_eq!(upd.distance, Some(Some(4.2)));
        assert_eq!(upd.radius, None);
    }

    #[test]
    fn update_rejects_id_field() {
        let err = RequestValidator::parse_partial::<CelestialBodyUpdate>(json!({ "id": 7 }), &rules())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn create_requires_name_and_type() {
        let err = RequestValidator::parse::<CelestialBodyCreate>(json!({ "mass": 1.0 }), &rules())
            .unwrap_err();
        match err {
            AppError::InvalidFields(f) => {
                assert!(f.contains_key("name"));
                assert!(f.contains_key("body_type"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
