//! Observation shapes: one row per (astronomer, body, occasion).

use super::nullable;
use crate::service::{Format, Rules, ValidationRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Observation {
    pub id: i64,
    pub astronomer_id: i64,
    pub celestial_body_id: i64,
    pub observation_date: DateTime<Utc>,
    pub location: Option<String>,
    pub equipment: Option<String>,
    pub duration_minutes: Option<i32>,
    pub weather_conditions: Option<String>,
    pub notes: Option<String>,
    /// Free-form measurements collected during the session.
    pub data: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservationCreate {
    pub astronomer_id: i64,
    pub celestial_body_id: i64,
    pub observation_date: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub weather_conditions: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Partial update. The astronomer and body links are fixed once recorded.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservationUpdate {
    #[serde(default)]
    pub observation_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub equipment: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub duration_minutes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub weather_conditions: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub data: Option<Option<Value>>,
}

impl ObservationUpdate {
    pub fn apply(&self, o: &mut Observation) {
        if let Some(v) = self.observation_date {
            o.observation_date = v;
        }
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(v) = &self.$field {
                    o.$field = v.clone();
                })*
            };
        }
        set!(location, equipment, duration_minutes, weather_conditions, notes, data);
    }
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct ObservationRead {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub observation: Observation,
    pub astronomer_name: String,
    pub celestial_body_name: String,
}

pub fn rules() -> Rules {
    let mut r = Rules::new();
    r.insert("astronomer_id", ValidationRule::default().required().minimum(1.0));
    r.insert("celestial_body_id", ValidationRule::default().required().minimum(1.0));
    r.insert(
        "observation_date",
        ValidationRule::default().required().format(Format::DateTime),
    );
    r.insert("location", ValidationRule::default().max_length(200));
    r.insert("equipment", ValidationRule::default().max_length(200));
    r.insert("duration_minutes", ValidationRule::default().range(0.0, 100_000.0));
    r.insert("weather_conditions", ValidationRule::default().max_length(200));
    r.insert("notes", ValidationRule::default().max_length(2000));
    r
}
