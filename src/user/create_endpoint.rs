//! Defines the endpoint for creating a new user.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, database_id::UserId, json::JsonBody, user::create_user};

/// The state needed to create a user.
#[derive(Debug, Clone)]
pub struct CreateUserState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a user.
#[derive(Debug, Deserialize, Serialize)]
pub struct UserForm {
    /// The user's name.
    pub name: String,
    /// The user's email address.
    pub email: String,
}

/// The response body for a newly created user.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct UserCreated {
    pub message: String,
    pub id: UserId,
}

/// A route handler for creating a new user, responds with the new user's ID.
pub async fn create_user_endpoint(
    State(state): State<CreateUserState>,
    JsonBody(form): JsonBody<UserForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let user = match create_user(&form.name, &form.email, &connection) {
        Ok(user) => user,
        Err(error) => {
            tracing::warn!("could not create user: {error}");
            return error.into_response();
        }
    };

    tracing::info!("created user {}", user.id);

    (
        StatusCode::CREATED,
        Json(UserCreated {
            message: "User created successfully".to_owned(),
            id: user.id,
        }),
    )
        .into_response()
}
