//! Tracing subscriber set-up.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("astro_catalog={level},catalog_server={level},tower_http={level}")
}

/// Install the global fmt subscriber. `RUST_LOG` overrides the default filter. A second call
/// is a no-op.
pub fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
