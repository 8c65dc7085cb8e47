use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::services::CallbackService;

#[derive(Clone)]
pub struct AppState {
    pub callbacks: CallbackService,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: &AppConfig) -> Self {
        AppState {
            callbacks: CallbackService::new(store, config),
        }
    }
}
