//! Observation handlers.

use super::{page, parse_id, query_param, QueryParams};
use crate::error::AppError;
use crate::filter::ObservationFilter;
use crate::response::{created, many, no_content, ok};
use crate::schema::{observation, ObservationCreate, ObservationUpdate};
use crate::service::{CatalogService, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = ObservationFilter {
        astronomer_id: query_param(&params, "astronomer_id")?,
        celestial_body_id: query_param(&params, "celestial_body_id")?,
        date_from: query_param::<DateTime<Utc>>(&params, "date_from")?,
        date_to: query_param::<DateTime<Utc>>(&params, "date_to")?,
    };
    let rows =
        CatalogService::list_observations(state.store.as_ref(), &filter, page(&params)?).await?;
    Ok(many(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let new: ObservationCreate = RequestValidator::parse(body, &observation::rules())?;
    let row = CatalogService::create_observation(state.store.as_ref(), new).await?;
    Ok(created(row))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    Ok(ok(CatalogService::get_observation(state.store.as_ref(), id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let changes: ObservationUpdate = RequestValidator::parse_partial(body, &observation::rules())?;
    let row = CatalogService::update_observation(state.store.as_ref(), id, changes).await?;
    Ok(ok(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    CatalogService::delete_observation(state.store.as_ref(), id).await?;
    Ok(no_content())
}
