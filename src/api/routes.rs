//! API route configuration.

use crate::api::handlers::{custom_handler, shorten_handler};
use crate::state::AppState;
use axum::{Router, routing::post};

/// Mapping creation routes.
///
/// # Endpoints
///
/// - `POST /shorten` - Shorten with a generated code
/// - `POST /custom`  - Shorten with a caller-chosen code
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/custom", post(custom_handler))
}
