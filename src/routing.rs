//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState, endpoints,
    fraud_case::get_fraud_cases_endpoint,
    logging_middleware,
    not_found::get_404_not_found,
    notification::notifications_endpoint,
    rate_limit::rate_limit,
    security::{content_security_policy_layer, cors_layer},
    transaction::create_transaction_endpoint,
    user::create_user_endpoint,
};

/// The text served at the root route.
pub const WELCOME_MESSAGE: &str = "Welcome to the ID Fraud Detection System!";

/// Return a router with all the app's routes.
///
/// Only browsers at the state's `allowed_origin` may call the API cross-origin.
pub fn build_router(state: AppState) -> Router {
    let allowed_origin = state.allowed_origin.clone();

    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::USERS, post(create_user_endpoint))
        .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
        .route(endpoints::FRAUD_CASES, get(get_fraud_cases_endpoint))
        .route(endpoints::NOTIFICATIONS, get(notifications_endpoint))
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(content_security_policy_layer())
        .layer(cors_layer(allowed_origin))
        .with_state(state)
}

/// The root path '/' greets the client.
async fn get_index_page() -> &'static str {
    WELCOME_MESSAGE
}
