//! Astronomical catalog: REST service for celestial bodies, astronomers, observations, and
//! user accounts, backed by PostgreSQL.

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod filter;
pub mod handlers;
pub mod migration;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod telemetry;

pub use config::{AuthConfig, Settings};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use routes::app;
pub use state::AppState;
pub use store::{ensure_database_exists, CatalogStore, MemoryStore, PgStore};
pub use telemetry::init_tracing;
