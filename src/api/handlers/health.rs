//! Handlers for the welcome and health endpoints.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse, WelcomeResponse};
use crate::state::AppState;

/// `GET /` - 202 Accepted with a greeting.
pub async fn welcome_handler() -> (StatusCode, Json<WelcomeResponse>) {
    (
        StatusCode::ACCEPTED,
        Json(WelcomeResponse {
            message: "Welcome to shrtn url",
        }),
    )
}

/// Returns service health status.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: The mapping store answers
/// - **503 Service Unavailable**: The mapping store failed
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "store": { "status": "ok", "message": "postgres, 42 mappings" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store_check = check_store(&state).await;
    let healthy = store_check.status == "ok";

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks { store: store_check },
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks the mapping store by counting mappings.
async fn check_store(state: &AppState) -> CheckStatus {
    let backend = state.mapping_service.backend();

    match state.mapping_service.count().await {
        Ok(count) => CheckStatus {
            status: "ok".to_string(),
            message: Some(format!("{}, {} mappings", backend, count)),
        },
        Err(e) => CheckStatus {
            status: "error".to_string(),
            message: Some(format!("{} error: {}", backend, e)),
        },
    }
}
