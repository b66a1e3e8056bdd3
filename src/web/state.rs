use std::sync::Arc;

use crate::{backend::BackendClient, config::AppConfig};

use super::views::ViewStore;

#[derive(Clone)]
pub struct AppState {
    backend: BackendClient,
    views: ViewStore,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config.backend_url.clone()),
            views: ViewStore::new(config.view_ttl),
            config: Arc::new(config),
        }
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    pub fn views(&self) -> &ViewStore {
        &self.views
    }

    pub fn secure_cookies(&self) -> bool {
        self.config.secure_cookies
    }
}
