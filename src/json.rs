//! A JSON extractor that reports malformed bodies with the app's error format.

use axum::extract::FromRequest;

use crate::Error;

/// Same as [axum::Json], but rejections are converted into [Error] so that the
/// client receives `{"error": ...}` instead of plain text.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);
