//! HTTP status classification
//!
//! Maps every response onto either a success or a typed [`ApiError`]. The
//! classifier is pure: it never retries and never touches token state.

use amocrm_domain::constants::SUCCESS_STATUS_CODES;
use amocrm_domain::{ApiError, ApiErrorKind};
use reqwest::StatusCode;
use tracing::warn;

use super::response::ApiResponse;
use crate::http::HttpResponse;

/// Error kind for `status`, or `None` for a success status.
#[must_use]
pub fn classify_status(status: StatusCode) -> Option<ApiErrorKind> {
    let code = status.as_u16();
    if SUCCESS_STATUS_CODES.contains(&code) {
        return None;
    }

    Some(match code {
        301 => ApiErrorKind::MovedPermanently,
        400 => ApiErrorKind::BadRequest,
        401 => ApiErrorKind::Unauthorized,
        403 => ApiErrorKind::Forbidden,
        404 => ApiErrorKind::NotFound,
        500 => ApiErrorKind::InternalError,
        502 => ApiErrorKind::BadGateway,
        503 => ApiErrorKind::ServiceUnavailable,
        _ => ApiErrorKind::Unknown,
    })
}

/// Pass success responses through unchanged; turn everything else into an
/// [`ApiError`] carrying the status code and raw body.
///
/// # Errors
/// Returns the classified [`ApiError`] for any non-success status.
pub fn classify(response: HttpResponse) -> Result<ApiResponse, ApiError> {
    let (status, body) = response.into_parts();

    match classify_status(status) {
        None => Ok(ApiResponse::new(status, body)),
        Some(kind) => {
            let body = String::from_utf8_lossy(&body).into_owned();
            warn!(status = status.as_u16(), kind = kind.as_str(), "API request rejected");
            Err(ApiError::new(kind, status.as_u16(), body))
        }
    }
}
