//! Catalog resource routes. Collection paths answer with and without a trailing slash.

use crate::handlers::{astronomer, celestial_body, observation};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn celestial_body_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/celestial-bodies",
            get(celestial_body::list).post(celestial_body::create),
        )
        .route(
            "/celestial-bodies/",
            get(celestial_body::list).post(celestial_body::create),
        )
        .route("/celestial-bodies/statistics", get(celestial_body::statistics))
        .route(
            "/celestial-bodies/:id",
            get(celestial_body::read)
                .put(celestial_body::update)
                .delete(celestial_body::delete),
        )
        .with_state(state)
}

pub fn astronomer_routes(state: AppState) -> Router {
    Router::new()
        .route("/astronomers", get(astronomer::list).post(astronomer::create))
        .route("/astronomers/", get(astronomer::list).post(astronomer::create))
        .route("/astronomers/statistics", get(astronomer::statistics))
        .route(
            "/astronomers/:id",
            get(astronomer::read)
                .put(astronomer::update)
                .delete(astronomer::delete),
        )
        .with_state(state)
}

pub fn observation_routes(state: AppState) -> Router {
    Router::new()
        .route("/observations", get(observation::list).post(observation::create))
        .route("/observations/", get(observation::list).post(observation::create))
        .route(
            "/observations/:id",
            get(observation::read)
                .put(observation::update)
                .delete(observation::delete),
        )
        .with_state(state)
}
