//! Defines the response for an internal server error.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::ErrorBody;

/// The error message sent for any error the client cannot act on.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// A generic 500 response that hides the details of the underlying error.
///
/// Callers should log the underlying error before returning this.
pub struct InternalServerError;

impl IntoResponse for InternalServerError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(INTERNAL_ERROR_MESSAGE)),
        )
            .into_response()
    }
}
