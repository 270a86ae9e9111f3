//! Request and response shapes per entity, with their field rule tables.

pub mod astronomer;
pub mod celestial_body;
pub mod observation;
pub mod user;

pub use astronomer::{
    Astronomer, AstronomerCreate, AstronomerRead, AstronomerStatistics, AstronomerUpdate,
};
pub use celestial_body::{
    BodyStatistics, BodyType, CelestialBody, CelestialBodyCreate, CelestialBodyRead,
    CelestialBodyUpdate,
};
pub use observation::{Observation, ObservationCreate, ObservationRead, ObservationUpdate};
pub use user::{LoginForm, NewUser, TokenResponse, User, UserCreate};

use serde::{Deserialize, Deserializer, Serialize};

/// Distinguishes an absent field (`None`) from an explicit null (`Some(None)`) in partial updates.
/// Use with `#[serde(default, deserialize_with = "nullable")]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// avg/min/max over one numeric column. All `None` when no row has a value.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NumericSummary {
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericSummary {
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;
        for v in values {
            count += 1;
            sum += v;
            min = Some(min.map_or(v, |m| m.min(v)));
            max = Some(max.map_or(v, |m| m.max(v)));
        }
        NumericSummary {
            avg: (count > 0).then(|| sum / count as f64),
            min,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_empty_set_is_all_none() {
        assert_eq!(NumericSummary::from_values(Vec::new()), NumericSummary::default());
    }

    #[test]
    fn summary_of_values() {
        let s = NumericSummary::from_values([4.0, 1.0, 7.0]);
        assert_eq!(s.avg, Some(4.0));
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.max, Some(7.0));
    }
}
