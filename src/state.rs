//! Shared application state for all routes.

use crate::config::{AuthConfig, Settings};
use crate::store::CatalogStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub auth: Arc<AuthConfig>,
    /// Reported by `/version`.
    pub app_name: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, auth: AuthConfig, app_name: &str) -> Self {
        AppState {
            store,
            auth: Arc::new(auth),
            app_name: Arc::from(app_name),
        }
    }

    pub fn from_settings(store: Arc<dyn CatalogStore>, settings: &Settings) -> Self {
        Self::new(store, settings.auth.clone(), &settings.app_name)
    }
}
