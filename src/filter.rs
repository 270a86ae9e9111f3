//! List criteria and pagination shared by every store backend.
//!
//! Each criterion is optional; a present one narrows the result conjunctively. The SQL
//! rendering lives in [`crate::sql`]; `matches` evaluates the same predicates in memory.

use crate::schema::{Astronomer, BodyType, CelestialBody, Observation};
use chrono::{DateTime, Utc};

pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 1000;

/// Offset/limit window. Rows are always ordered by id ascending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Page {
    /// Limit defaults to 100 and is clamped to 1..=1000; skip defaults to 0.
    pub fn new(skip: Option<u32>, limit: Option<u32>) -> Self {
        Page {
            skip: skip.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(None, None)
    }
}

#[derive(Clone, Debug, Default)]
pub struct BodyFilter {
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    pub body_type: Option<BodyType>,
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
    /// Bounds on apparent magnitude.
    pub min_magnitude: Option<f64>,
    pub max_magnitude: Option<f64>,
    pub spectral_class: Option<String>,
}

impl BodyFilter {
    pub fn matches(&self, b: &CelestialBody) -> bool {
        contains_ci(Some(&b.name), self.search.as_deref())
            && self.body_type.is_none_or(|t| b.body_type == t)
            && in_range(b.distance, self.min_distance, self.max_distance)
            && in_range(b.apparent_magnitude, self.min_magnitude, self.max_magnitude)
            && self
                .spectral_class
                .as_deref()
                .is_none_or(|s| b.spectral_class.as_deref() == Some(s))
    }
}

#[derive(Clone, Debug, Default)]
pub struct AstronomerFilter {
    /// Case-insensitive substring of first name, last name, or institution.
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub country: Option<String>,
}

impl AstronomerFilter {
    pub fn matches(&self, a: &Astronomer) -> bool {
        let search = self.search.as_deref();
        let search_ok = search.is_none()
            || contains_ci(Some(&a.first_name), search)
            || contains_ci(Some(&a.last_name), search)
            || contains_ci(a.institution.as_deref(), search);
        search_ok
            && self.is_active.is_none_or(|v| a.is_active == v)
            && self
                .country
                .as_deref()
                .is_none_or(|c| a.country.as_deref() == Some(c))
    }
}

#[derive(Clone, Debug, Default)]
pub struct ObservationFilter {
    pub astronomer_id: Option<i64>,
    pub celestial_body_id: Option<i64>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl ObservationFilter {
    pub fn matches(&self, o: &Observation) -> bool {
        self.astronomer_id.is_none_or(|id| o.astronomer_id == id)
            && self.celestial_body_id.is_none_or(|id| o.celestial_body_id == id)
            && self.date_from.is_none_or(|d| o.observation_date >= d)
            && self.date_to.is_none_or(|d| o.observation_date <= d)
    }
}

fn contains_ci(haystack: Option<&str>, needle: Option<&str>) -> bool {
    match (haystack, needle) {
        (_, None) => true,
        (None, Some(_)) => false,
        (Some(h), Some(n)) => h.to_lowercase().contains(&n.to_lowercase()),
    }
}

/// Inclusive bounds. A row without a value never satisfies a present bound.
fn in_range(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(v) = value else { return false };
    min.is_none_or(|m| v >= m) && max.is_none_or(|m| v <= m)
}
