//! Fraud cases opened against transactions.
//!
//! There is no endpoint for creating fraud cases. They are inserted directly
//! through [create_fraud_case], e.g. by the `create_test_db` tool.

mod core;
mod list_endpoint;

pub use core::{
    DEFAULT_STATUS, FraudCase, FraudCaseBuilder, create_fraud_case, create_fraud_case_table,
    get_fraud_cases,
};
pub use list_endpoint::get_fraud_cases_endpoint;
