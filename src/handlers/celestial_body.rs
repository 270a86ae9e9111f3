//! Celestial body handlers.

use super::{page, parse_id, query_param, query_string, QueryParams};
use crate::error::AppError;
use crate::filter::BodyFilter;
use crate::response::{created, many, no_content, ok};
use crate::schema::{celestial_body, CelestialBodyCreate, CelestialBodyUpdate};
use crate::service::{CatalogService, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

fn body_filter(params: &QueryParams) -> Result<BodyFilter, AppError> {
    Ok(BodyFilter {
        search: query_string(params, "search"),
        body_type: query_param(params, "body_type")?,
        min_distance: query_param(params, "min_distance")?,
        max_distance: query_param(params, "max_distance")?,
        min_magnitude: query_param(params, "min_magnitude")?,
        max_magnitude: query_param(params, "max_magnitude")?,
        spectral_class: query_string(params, "spectral_class"),
    })
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = body_filter(&params)?;
    let rows = CatalogService::list_bodies(state.store.as_ref(), &filter, page(&params)?).await?;
    Ok(many(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let new: CelestialBodyCreate = RequestValidator::parse(body, &celestial_body::rules())?;
    let row = CatalogService::create_body(state.store.as_ref(), new).await?;
    Ok(created(row))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    Ok(ok(CatalogService::get_body(state.store.as_ref(), id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let changes: CelestialBodyUpdate =
        RequestValidator::parse_partial(body, &celestial_body::rules())?;
    let row = CatalogService::update_body(state.store.as_ref(), id, changes).await?;
    Ok(ok(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    CatalogService::delete_body(state.store.as_ref(), id).await?;
    Ok(no_content())
}

pub async fn statistics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(CatalogService::body_statistics(state.store.as_ref()).await?))
}
