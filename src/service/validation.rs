//! Request validation from per-entity field rules.

use crate::error::AppError;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Email,
    /// ISO calendar date (YYYY-MM-DD).
    Date,
    /// RFC 3339 timestamp.
    DateTime,
}

/// Constraints for one body field. Length bounds count characters, not bytes.
#[derive(Clone, Debug, Default)]
pub struct ValidationRule {
    pub required: bool,
    pub format: Option<Format>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<&'static str>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
}

impl ValidationRule {
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.minimum = Some(min);
        self.maximum = Some(max);
        self
    }

    pub fn minimum(mut self, min: f64) -> Self {
        self.minimum = Some(min);
        self
    }

    pub fn greater_than(mut self, bound: f64) -> Self {
        self.exclusive_minimum = Some(bound);
        self
    }
}

pub type Rules = BTreeMap<&'static str, ValidationRule>;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create body: every required field must be present and non-null.
    pub fn validate(body: &Map<String, Value>, rules: &Rules) -> Result<(), AppError> {
        let mut errors = FieldErrors::default();
        for (field, rule) in rules {
            match body.get(*field) {
                None | Some(Value::Null) if rule.required => {
                    errors.push(field, format!("{} is required", field));
                }
                Some(v) => validate_field(field, v, rule, &mut errors),
                None => {}
            }
        }
        errors.into_result()
    }

    /// Validate only the fields present in body (partial update). Required fields may be
    /// omitted but not set to null.
    pub fn validate_partial(body: &Map<String, Value>, rules: &Rules) -> Result<(), AppError> {
        let mut errors = FieldErrors::default();
        for (field, v) in body {
            let Some(rule) = rules.get(field.as_str()) else { continue };
            if v.is_null() && rule.required {
                errors.push(field, format!("{} cannot be null", field));
                continue;
            }
            validate_field(field, v, rule, &mut errors);
        }
        errors.into_result()
    }

    /// Validate a create body and deserialize it into its typed shape.
    pub fn parse<T: DeserializeOwned>(body: Value, rules: &Rules) -> Result<T, AppError> {
        let map = body_to_map(body)?;
        Self::validate(&map, rules)?;
        deserialize(map)
    }

    /// Validate a partial update body and deserialize it into its typed shape.
    pub fn parse_partial<T: DeserializeOwned>(body: Value, rules: &Rules) -> Result<T, AppError> {
        let map = body_to_map(body)?;
        Self::validate_partial(&map, rules)?;
        deserialize(map)
    }
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

fn deserialize<T: DeserializeOwned>(map: Map<String, Value>) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(map)).map_err(|e| AppError::Validation(e.to_string()))
}

#[derive(Default)]
struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    fn push(&mut self, field: &str, message: String) {
        self.0.entry(field.to_string()).or_default().push(message);
    }

    fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidFields(self.0))
        }
    }
}

fn validate_field(field: &str, v: &Value, rule: &ValidationRule, errors: &mut FieldErrors) {
    if v.is_null() {
        return;
    }
    if let Some(s) = v.as_str() {
        let chars = s.chars().count();
        if let Some(min) = rule.min_length {
            if chars < min {
                errors.push(field, format!("{} must be at least {} characters", field, min));
            }
        }
        if let Some(max) = rule.max_length {
            if chars > max {
                errors.push(field, format!("{} must be at most {} characters", field, max));
            }
        }
        if let Some(pattern) = rule.pattern {
            match Regex::new(pattern) {
                Ok(re) if !re.is_match(s) => {
                    errors.push(field, format!("{} does not match required pattern", field));
                }
                Ok(_) => {}
                Err(_) => errors.push(field, format!("invalid pattern for {}", field)),
            }
        }
        if let Some(format) = rule.format {
            if let Err(message) = validate_format(field, s, format) {
                errors.push(field, message);
            }
        }
    }
    if let Some(n) = v.as_f64() {
        if let Some(min) = rule.minimum {
            if n < min {
                errors.push(field, format!("{} must be at least {}", field, min));
            }
        }
        if let Some(max) = rule.maximum {
            if n > max {
                errors.push(field, format!("{} must be at most {}", field, max));
            }
        }
        if let Some(bound) = rule.exclusive_minimum {
            if n <= bound {
                errors.push(field, format!("{} must be greater than {}", field, bound));
            }
        }
    }
}

fn validate_format(field: &str, s: &str, format: Format) -> Result<(), String> {
    let ok = match format {
        Format::Email => Regex::new(EMAIL_PATTERN).map(|re| re.is_match(s)).unwrap_or(false),
        Format::Date => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
        Format::DateTime => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
    };
    if ok {
        return Ok(());
    }
    Err(match format {
        Format::Email => format!("{} must be a valid email", field),
        Format::Date => format!("{} must be a date (YYYY-MM-DD)", field),
        Format::DateTime => format!("{} must be an RFC 3339 timestamp", field),
    })
}
