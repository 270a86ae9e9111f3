//! Astronomer handlers.

use super::{page, parse_id, query_param, query_string, QueryParams};
use crate::error::AppError;
use crate::filter::AstronomerFilter;
use crate::response::{created, many, no_content, ok};
use crate::schema::{astronomer, AstronomerCreate, AstronomerUpdate};
use crate::service::{CatalogService, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = AstronomerFilter {
        search: query_string(&params, "search"),
        is_active: query_param(&params, "is_active")?,
        country: query_string(&params, "country"),
    };
    let rows =
        CatalogService::list_astronomers(state.store.as_ref(), &filter, page(&params)?).await?;
    Ok(many(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let new: AstronomerCreate = RequestValidator::parse(body, &astronomer::rules())?;
    let row = CatalogService::create_astronomer(state.store.as_ref(), new).await?;
    Ok(created(row))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    Ok(ok(CatalogService::get_astronomer(state.store.as_ref(), id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let changes: AstronomerUpdate = RequestValidator::parse_partial(body, &astronomer::rules())?;
    let row = CatalogService::update_astronomer(state.store.as_ref(), id, changes).await?;
    Ok(ok(row))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    CatalogService::delete_astronomer(state.store.as_ref(), id).await?;
    Ok(no_content())
}

pub async fn statistics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(CatalogService::astronomer_statistics(state.store.as_ref()).await?))
}
