//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row, Transaction as SqlTransaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::{
    Error,
    database_id::{TransactionId, UserId},
};

// ============================================================================
// MODELS
// ============================================================================

/// A payment made by a user at some place and time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the user that made the transaction.
    pub user_id: UserId,
    /// The amount of money moved in this transaction.
    pub amount: f64,
    /// Where the transaction happened, e.g. "NYC".
    pub location: String,
    /// When the transaction happened.
    #[serde(with = "crate::timestamp")]
    pub timestamp: PrimitiveDateTime,
}

/// The fields needed to record a new [Transaction].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// The ID of the user that made the transaction, must refer to an existing user.
    pub user_id: UserId,
    /// The amount of money moved in this transaction.
    pub amount: f64,
    /// Where the transaction happened.
    pub location: String,
    /// When the transaction happened.
    #[serde(with = "crate::timestamp")]
    pub timestamp: PrimitiveDateTime,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                location TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id)
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = row.get(1)?;
    let amount = row.get(2)?;
    let location = row.get(3)?;
    let timestamp = row.get(4)?;

    Ok(Transaction {
        id,
        user_id,
        amount,
        location,
        timestamp,
    })
}

/// Create a new transaction in the database.
///
/// The user is checked and the row inserted within a single SQL transaction,
/// so nothing is written if any step fails.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyField] if `location` is blank,
/// - [Error::UserNotFound] if `user_id` does not refer to an existing user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if new_transaction.location.trim().is_empty() {
        return Err(Error::EmptyField("location"));
    }

    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let user_exists: bool = sql_transaction.query_row(
        "SELECT EXISTS(SELECT 1 FROM user WHERE id = ?1)",
        (new_transaction.user_id,),
        |row| row.get(0),
    )?;

    if !user_exists {
        return Err(Error::UserNotFound(new_transaction.user_id));
    }

    let transaction = sql_transaction
        .prepare(
            "INSERT INTO \"transaction\" (user_id, amount, location, timestamp)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, amount, location, timestamp",
        )?
        .query_row(
            (
                new_transaction.user_id,
                new_transaction.amount,
                &new_transaction.location,
                new_transaction.timestamp,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::UserNotFound(new_transaction.user_id),
            error => error.into(),
        })?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, amount, location, timestamp FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

// ============================================================================
// TESTS
// ============================================================================
