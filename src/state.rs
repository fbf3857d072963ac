use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::{ItemStore, UserStore};

/// Shared router state: immutable configuration plus the store handles.
/// Cloned per request by axum; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub items: Arc<dyn ItemStore>,
}

impl AppState {
    pub fn new(config: AppConfig, users: Arc<dyn UserStore>, items: Arc<dyn ItemStore>) -> Self {
        Self {
            config: Arc::new(config),
            users,
            items,
        }
    }
}
