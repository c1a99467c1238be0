//! A record-keeping backend for users, financial transactions and fraud cases.
//!
//! This library provides a JSON REST API backed by SQLite, and broadcasts newly
//! recorded transactions to websocket subscribers.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod config;
mod database_id;
mod db;
mod endpoints;
mod fraud_case;
mod internal_server_error;
mod json;
mod logging;
mod not_found;
mod notification;
mod rate_limit;
mod routing;
mod security;
mod timestamp;
mod transaction;
mod user;

pub use app_state::AppState;
pub use config::Config;
pub use database_id::{DatabaseId, FraudCaseId, TransactionId, UserId};
pub use db::initialize as initialize_db;
pub use fraud_case::{
    DEFAULT_STATUS, FraudCase, FraudCaseBuilder, create_fraud_case, get_fraud_cases,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use notification::{Event, Notifier, TransactionEvent};
pub use rate_limit::RateLimiter;
pub use routing::build_router;
pub use transaction::{NewTransaction, Transaction, create_transaction, get_transaction};
pub use user::{User, create_user, get_user};

use crate::{internal_server_error::InternalServerError, not_found::get_404_not_found_response};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required text field was missing or only contained whitespace.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// The request body could not be parsed as the expected JSON object.
    ///
    /// The status code is the one chosen by the JSON extractor, e.g. 415 for
    /// a missing content type or 422 for a missing field.
    #[error("{1}")]
    InvalidRequestBody(StatusCode, String),

    /// The email address is already used by another user.
    #[error("a user with the email \"{0}\" already exists")]
    DuplicateEmail(String),

    /// The user ID used to create a transaction does not refer to a user.
    #[error("no user exists with the ID {0}")]
    UserNotFound(UserId),

    /// The transaction ID used to create a fraud case does not refer to a transaction.
    #[error("no transaction exists with the ID {0}")]
    TransactionNotFound(TransactionId),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The client has sent too many requests in the current window.
    #[error("Too many requests")]
    TooManyRequests,

    /// A websocket handshake came from a browser origin that is not allowed.
    #[error("the origin \"{0}\" is not allowed")]
    ForbiddenOrigin(String),

    /// The request body is larger than the server will read.
    #[error("the request body is larger than {0} bytes")]
    PayloadTooLarge(usize),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// A date-time could not be rendered as text.
    #[error("could not format date-time: {0}")]
    DateFormatError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Could not acquire the lock on the rate limiting counters.
    #[error("could not acquire the rate limiter lock")]
    RateLimiterLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequestBody(rejection.status(), rejection.body_text())
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub(crate) fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::EmptyField(_) => StatusCode::BAD_REQUEST,
            Error::InvalidRequestBody(status, _) => *status,
            Error::DuplicateEmail(_) => StatusCode::CONFLICT,
            Error::UserNotFound(_) | Error::TransactionNotFound(_) => StatusCode::NOT_FOUND,
            Error::NotFound => return get_404_not_found_response(),
            Error::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Error::ForbiddenOrigin(_) => StatusCode::FORBIDDEN,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                return InternalServerError.into_response();
            }
        };

        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
