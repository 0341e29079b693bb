//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Expiry is not checked: a mapping past its expiry keeps redirecting until
/// the sweeper deletes it.
///
/// # Errors
///
/// Returns 404 Not Found if the code doesn't exist, 500 on store failure.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let mapping = state.mapping_service.resolve(&code).await?;

    debug!("Redirecting {} to {}", code, mapping.long_url);

    Ok(Redirect::permanent(&mapping.long_url))
}
