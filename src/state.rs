//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::MappingService;

/// Cloned per request by axum; holds only shared, immutable handles.
#[derive(Clone)]
pub struct AppState {
    pub mapping_service: Arc<MappingService>,
}

impl AppState {
    pub fn new(mapping_service: Arc<MappingService>) -> Self {
        Self { mapping_service }
    }
}
