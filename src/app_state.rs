//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::http::HeaderValue;
use rusqlite::Connection;

use crate::{Error, db::initialize, notification::Notifier, rate_limit::RateLimiter};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// Broadcasts events to websocket subscribers.
    pub notifier: Notifier,

    /// Limits how many requests each client may make per minute.
    pub rate_limiter: RateLimiter,

    /// The only browser origin allowed to call the API or open the websocket.
    pub allowed_origin: HeaderValue,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        notifier: Notifier,
        rate_limiter: RateLimiter,
        allowed_origin: HeaderValue,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            notifier,
            rate_limiter,
            allowed_origin,
        })
    }
}
