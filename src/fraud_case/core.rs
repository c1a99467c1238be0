//! Defines the fraud case model and its database queries.

use rusqlite::{Connection, Row, Transaction as SqlTransaction, TransactionBehavior};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::{
    Error,
    database_id::{FraudCaseId, TransactionId},
};

/// The status given to fraud cases that do not specify one.
pub const DEFAULT_STATUS: &str = "Open";

/// An investigation into a possibly fraudulent transaction.
///
/// To create a new `FraudCase`, use [FraudCase::build].
#[derive(Debug, Clone, PartialEq)]
pub struct FraudCase {
    /// The ID of the fraud case.
    pub id: FraudCaseId,
    /// The transaction under investigation.
    pub transaction_id: TransactionId,
    /// Where the investigation is at, e.g. "Open".
    pub status: String,
    /// When the fraud case was opened.
    pub created_at: PrimitiveDateTime,
}

impl FraudCase {
    /// Start building a fraud case for the transaction `transaction_id`.
    ///
    /// Shortcut for [FraudCaseBuilder] for discoverability.
    pub fn build(transaction_id: TransactionId) -> FraudCaseBuilder {
        let now = OffsetDateTime::now_utc();

        FraudCaseBuilder {
            transaction_id,
            status: DEFAULT_STATUS.to_owned(),
            created_at: PrimitiveDateTime::new(now.date(), now.time()),
        }
    }
}

/// A builder for creating [FraudCase] instances.
///
/// The status defaults to [DEFAULT_STATUS] and the creation time defaults to
/// the current UTC time.
#[derive(Debug, Clone, PartialEq)]
pub struct FraudCaseBuilder {
    /// The transaction under investigation, must refer to an existing transaction.
    pub transaction_id: TransactionId,
    /// The initial status of the case.
    pub status: String,
    /// When the case was opened.
    pub created_at: PrimitiveDateTime,
}

impl FraudCaseBuilder {
    /// Set the status for the fraud case.
    pub fn status(mut self, status: &str) -> Self {
        self.status = status.to_owned();
        self
    }

    /// Set when the fraud case was opened.
    pub fn created_at(mut self, created_at: PrimitiveDateTime) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Create the fraud case table in the database.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_fraud_case_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS fraud_case (
                id INTEGER PRIMARY KEY,
                transaction_id INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'Open',
                created_at TEXT NOT NULL,
                FOREIGN KEY(transaction_id) REFERENCES \"transaction\"(id)
                )",
        (),
    )?;

    Ok(())
}

fn map_fraud_case_row(row: &Row) -> Result<FraudCase, rusqlite::Error> {
    Ok(FraudCase {
        id: row.get(0)?,
        transaction_id: row.get(1)?,
        status: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Create a new fraud case in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if the transaction ID does not refer to an existing transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_fraud_case(
    builder: FraudCaseBuilder,
    connection: &Connection,
) -> Result<FraudCase, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let transaction_exists: bool = sql_transaction.query_row(
        "SELECT EXISTS(SELECT 1 FROM \"transaction\" WHERE id = ?1)",
        (builder.transaction_id,),
        |row| row.get(0),
    )?;

    if !transaction_exists {
        return Err(Error::TransactionNotFound(builder.transaction_id));
    }

    let fraud_case = sql_transaction
        .prepare(
            "INSERT INTO fraud_case (transaction_id, status, created_at)
             VALUES (?1, ?2, ?3)
             RETURNING id, transaction_id, status, created_at",
        )?
        .query_row(
            (builder.transaction_id, &builder.status, builder.created_at),
            map_fraud_case_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::TransactionNotFound(builder.transaction_id),
            error => error.into(),
        })?;

    sql_transaction.commit()?;

    Ok(fraud_case)
}

/// Get every fraud case in the order they were created.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_fraud_cases(connection: &Connection) -> Result<Vec<FraudCase>, Error> {
    connection
        .prepare("SELECT id, transaction_id, status, created_at FROM fraud_case ORDER BY id ASC")?
        .query_map([], map_fraud_case_row)?
        .map(|maybe_case| maybe_case.map_err(|error| error.into()))
        .collect()
}
