//! Transactions made by users.
//!
//! This module contains the `Transaction` model, the database functions for
//! storing and reading transactions, and the endpoint for recording them.

mod core;
mod create_endpoint;

pub use core::{
    NewTransaction, Transaction, create_transaction, create_transaction_table, get_transaction,
};
pub use create_endpoint::create_transaction_endpoint;

#[cfg(test)]
pub use core::count_transactions;
