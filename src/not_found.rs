//! The fallback response for routes and resources that do not exist.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::ErrorBody;

/// The error message sent for unknown routes and missing resources.
pub const NOT_FOUND_MESSAGE: &str = "Resource not found";

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new(NOT_FOUND_MESSAGE)),
    )
        .into_response()
}
