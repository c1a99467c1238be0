//! Defines the endpoint for listing fraud cases.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    database_id::FraudCaseId,
    fraud_case::{FraudCase, get_fraud_cases},
    timestamp,
};

/// The state needed to list fraud cases.
#[derive(Debug, Clone)]
pub struct FraudCasesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for FraudCasesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A fraud case as shown to API clients.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct FraudCaseSummary {
    pub id: FraudCaseId,
    pub status: String,
    pub created_at: String,
}

impl TryFrom<FraudCase> for FraudCaseSummary {
    type Error = Error;

    fn try_from(fraud_case: FraudCase) -> Result<Self, Self::Error> {
        let created_at = timestamp::render(&fraud_case.created_at)
            .map_err(|error| Error::DateFormatError(error.to_string()))?;

        Ok(Self {
            id: fraud_case.id,
            status: fraud_case.status,
            created_at,
        })
    }
}

/// List every fraud case as JSON.
pub async fn get_fraud_cases_endpoint(
    State(state): State<FraudCasesState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let fraud_cases = get_fraud_cases(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve fraud cases: {error}"))?;

    let summaries = fraud_cases
        .into_iter()
        .map(FraudCaseSummary::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(summaries).into_response())
}
