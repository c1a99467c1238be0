//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    json::JsonBody,
    notification::{Event, Notifier, TransactionEvent},
    transaction::{NewTransaction, create_transaction},
};

/// The state needed to create a transaction and notify subscribers about it.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Broadcasts new transactions to websocket subscribers.
    pub notifier: Notifier,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            notifier: state.notifier.clone(),
        }
    }
}

/// The response body for a newly created transaction.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct TransactionCreated {
    pub message: String,
}

/// A route handler for creating a new transaction.
///
/// The transaction is committed to the database before the
/// [Event::NewTransaction] event is published. Publishing never fails the request.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    JsonBody(new_transaction): JsonBody<NewTransaction>,
) -> Response {
    let transaction = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match create_transaction(new_transaction, &connection) {
            Ok(transaction) => transaction,
            Err(error) => {
                tracing::warn!("could not create transaction: {error}");
                return error.into_response();
            }
        }
    };

    tracing::info!(
        "created transaction {} for user {}",
        transaction.id,
        transaction.user_id
    );

    state
        .notifier
        .publish(Event::NewTransaction(TransactionEvent {
            id: transaction.id,
            amount: transaction.amount,
        }));

    (
        StatusCode::CREATED,
        Json(TransactionCreated {
            message: "Transaction added successfully".to_owned(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, extract::State, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;
    use time::macros::datetime;
    use tokio::sync::broadcast::error::TryRecvError;

    use crate::{
        db::initialize,
        endpoints,
        json::JsonBody,
        notification::{Event, Notifier, TransactionEvent},
        transaction::{
            NewTransaction, count_transactions,
            create_endpoint::{CreateTransactionState, TransactionCreated},
            create_transaction_endpoint, get_transaction,
        },
        user::create_user,
    };

    fn get_test_state() -> CreateTransactionState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        create_user("Ada", "ada@x.com", &conn).unwrap();

        CreateTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
            notifier: Notifier::new(16),
        }
    }

    fn get_test_server(state: CreateTransactionState) -> TestServer {
        let app = Router::new()
            .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn new_transaction(user_id: i64) -> NewTransaction {
        NewTransaction {
            user_id,
            amount: 42.5,
            location: "NYC".to_owned(),
            timestamp: datetime!(2024-01-01 00:00:00),
        }
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let state = get_test_state();

        let response =
            create_transaction_endpoint(State(state.clone()), JsonBody(new_transaction(1))).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        // We know the first transaction will have ID 1
        let connection = state.db_connection.lock().unwrap();
        let transaction = get_transaction(1, &connection).unwrap();
        assert_eq!(transaction.amount, 42.5);
        assert_eq!(transaction.location, "NYC");
    }

    #[tokio::test]
    async fn publishes_one_event_with_id_and_amount() {
        let state = get_test_state();
        let mut subscriber = state.notifier.subscribe();

        create_transaction_endpoint(State(state.clone()), JsonBody(new_transaction(1))).await;

        assert_eq!(
            subscriber.try_recv(),
            Ok(Event::NewTransaction(TransactionEvent { id: 1, amount: 42.5 }))
        );
        assert_eq!(subscriber.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn late_subscriber_does_not_receive_earlier_event() {
        let state = get_test_state();

        create_transaction_endpoint(State(state.clone()), JsonBody(new_transaction(1))).await;
        let mut late_subscriber = state.notifier.subscribe();

        assert_eq!(late_subscriber.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn succeeds_without_subscribers() {
        let state = get_test_state();

        let response =
            create_transaction_endpoint(State(state.clone()), JsonBody(new_transaction(1))).await;

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn missing_user_creates_no_row_and_no_event() {
        let state = get_test_state();
        let mut subscriber = state.notifier.subscribe();

        let response =
            create_transaction_endpoint(State(state.clone()), JsonBody(new_transaction(99))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(subscriber.try_recv(), Err(TryRecvError::Empty));
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection).unwrap(), 0);
    }

    #[tokio::test]
    async fn responds_with_message_only() {
        let server = get_test_server(get_test_state());

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "user_id": 1,
                "amount": 42.5,
                "location": "NYC",
                "timestamp": "2024-01-01T00:00:00"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        response.assert_json(&TransactionCreated {
            message: "Transaction added successfully".to_owned(),
        });
    }

    #[tokio::test]
    async fn malformed_timestamp_is_rejected() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "user_id": 1,
                "amount": 42.5,
                "location": "NYC",
                "timestamp": "yesterday"
            }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<serde_json::Value>();
        assert!(body["error"].is_string());
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection).unwrap(), 0);
    }
}
