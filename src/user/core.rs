//! Code for creating the user table and storing users in the database.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::UserId};

/// A person whose transactions are being tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The user's name.
    pub name: String,
    /// The user's email address, unique across all users.
    pub email: String,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE
                )",
        (),
    )?;

    Ok(())
}

pub fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
    })
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::EmptyField] if `name` or `email` is blank,
/// - [Error::DuplicateEmail] if another user already has `email`,
/// - or [Error::SqlError] if some other SQL error occurred.
pub fn create_user(name: &str, email: &str, connection: &Connection) -> Result<User, Error> {
    if name.trim().is_empty() {
        return Err(Error::EmptyField("name"));
    }

    if email.trim().is_empty() {
        return Err(Error::EmptyField("email"));
    }

    connection
        .prepare("INSERT INTO user (name, email) VALUES (?1, ?2) RETURNING id, name, email")?
        .query_row((name, email), map_user_row)
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateEmail(email.to_owned()),
            error => error.into(),
        })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a user,
/// - there was an error trying to access the database.
pub fn get_user(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id)], map_user_row)
        .map_err(|error| error.into())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}
