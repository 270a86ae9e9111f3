//! Route tables and the assembled application router.

mod auth;
mod catalog;
mod common;

pub use auth::auth_routes;
pub use catalog::{astronomer_routes, celestial_body_routes, observation_routes};
pub use common::common_routes;

use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Every route with request tracing and a body size cap.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(celestial_body_routes(state.clone()))
        .merge(astronomer_routes(state.clone()))
        .merge(observation_routes(state.clone()))
        .merge(auth_routes(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}
