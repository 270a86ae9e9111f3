//! Account routes.

use crate::handlers::auth::{delete_me, me, register, token};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/token", post(token))
        .route("/auth/me", get(me).delete(delete_me))
        .with_state(state)
}
