//! HTTP handlers for catalog entities and accounts.

pub mod astronomer;
pub mod auth;
pub mod celestial_body;
pub mod observation;

use crate::error::AppError;
use crate::filter::Page;
use std::collections::HashMap;
use std::str::FromStr;

pub(crate) type QueryParams = HashMap<String, String>;

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::Validation(format!("invalid id '{}'", id_str)))
}

/// Typed query parameter; absent or empty means `None`.
fn query_param<T: FromStr>(params: &QueryParams, key: &str) -> Result<Option<T>, AppError> {
    match params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("invalid value '{}' for {}", raw, key))),
    }
}

fn query_string(params: &QueryParams, key: &str) -> Option<String> {
    params
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `skip` / `limit` from the query string.
fn page(params: &QueryParams) -> Result<Page, AppError> {
    Ok(Page::new(query_param(params, "skip")?, query_param(params, "limit")?))
}
