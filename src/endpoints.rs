//! The API endpoints URIs.

/// The root route which greets the client.
pub const ROOT: &str = "/";
/// The route to create users.
pub const USERS: &str = "/api/users";
/// The route to create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to list fraud cases.
pub const FRAUD_CASES: &str = "/api/fraud_cases";
/// The websocket route for real-time notifications.
pub const NOTIFICATIONS: &str = "/ws";
