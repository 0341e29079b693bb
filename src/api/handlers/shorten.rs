//! Handlers for the link shortening endpoints.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::dto::shorten::{CreatedResponse, CustomRequest, MappingDocument, ShortenRequest};
use crate::application::services::ShortenOutcome;
use crate::error::AppError;
use crate::state::AppState;

/// Shortens a URL under a generated code.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// { "longUrl": "https://example.com/a" }
/// ```
///
/// # Responses
///
/// - **201 Created**: `{ "newUrl", "expires", "db_id" }`
/// - **202 Accepted**: the generated code already mapped to this URL; the
///   stored document `{ urlCode, longUrl, shortUrl, postedDate, expiresDate }`
///
/// # Errors
///
/// Returns 400 for a malformed body or a URL that is not absolute, and 500 on
/// store or code generation failure.
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;

    match state.mapping_service.shorten(&payload.long_url).await? {
        ShortenOutcome::Created(mapping) => Ok((
            StatusCode::CREATED,
            Json(CreatedResponse::from(&mapping)),
        )
            .into_response()),
        ShortenOutcome::Existing(mapping) => {
            Ok((StatusCode::ACCEPTED, Json(MappingDocument::from(mapping))).into_response())
        }
    }
}

/// Shortens a URL under a caller-chosen code.
///
/// # Endpoint
///
/// `POST /custom`
///
/// # Request Body
///
/// ```json
/// { "longUrl": "https://example.com/b", "customCode": "promo" }
/// ```
///
/// # Errors
///
/// Returns 400 if the URL is invalid, the code has 3 characters or fewer, or
/// the code is already in use (`"Custom code: promo already in use"`).
/// Returns 500 on store failure.
pub async fn custom_handler(
    State(state): State<AppState>,
    payload: Result<Json<CustomRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let Json(payload) = payload?;

    let mapping = state
        .mapping_service
        .create_custom(&payload.long_url, &payload.custom_code)
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse::from(&mapping))))
}
