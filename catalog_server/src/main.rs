//! Catalog server: reads settings, prepares the database, and serves the API.
//!
//! Run from repo root: `cargo run -p catalog-server`

use astro_catalog::{
    app, apply_migrations, ensure_database_exists, init_tracing, AppState, PgStore, Settings,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    init_tracing(settings.debug);

    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .connect(&settings.database_url)
        .await?;
    apply_migrations(&pool).await?;

    let state = AppState::from_settings(Arc::new(PgStore::new(pool)), &settings);
    let router = app(state);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!(
        "{} listening on http://{}",
        settings.app_name,
        listener.local_addr()?
    );
    axum::serve(listener, router).await?;
    Ok(())
}
