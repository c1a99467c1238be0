//! The websocket endpoint that streams [Event]s to clients.

use axum::{
    extract::{
        FromRef, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, HeaderValue, header::ORIGIN},
    response::{IntoResponse, Response},
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::{
    AppState, Error,
    notification::{Event, Notifier},
};

/// The state needed to subscribe websocket clients to events.
#[derive(Debug, Clone)]
pub struct NotificationState {
    pub notifier: Notifier,
    pub allowed_origin: HeaderValue,
}

impl FromRef<AppState> for NotificationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            notifier: state.notifier.clone(),
            allowed_origin: state.allowed_origin.clone(),
        }
    }
}

/// The endpoint for the websocket API.
///
/// Browsers do not apply CORS to websocket handshakes, so a handshake with an
/// `Origin` header other than the allowed origin is refused with 403.
/// Clients that send no `Origin` header are not browsers and are let through.
///
/// The client is subscribed as soon as the upgrade request is accepted, so it
/// receives every event published after the handshake.
pub async fn notifications_endpoint(
    State(state): State<NotificationState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let foreign_origin = headers
        .get(ORIGIN)
        .filter(|origin| **origin != state.allowed_origin);

    if let Some(origin) = foreign_origin {
        let origin = String::from_utf8_lossy(origin.as_bytes()).into_owned();
        tracing::warn!("refused websocket handshake from origin {origin}");

        return Error::ForbiddenOrigin(origin).into_response();
    }

    let events = state.notifier.subscribe();

    ws.on_upgrade(move |socket| handle(socket, events))
}

/// Runs the read and write halves of the socket until either one finishes.
async fn handle(socket: WebSocket, events: broadcast::Receiver<Event>) {
    let (sender, receiver) = socket.split();

    let mut read_task = tokio::spawn(read(receiver));
    let mut write_task = tokio::spawn(write(sender, events));

    tokio::select! {
        _ = &mut read_task => write_task.abort(),
        _ = &mut write_task => read_task.abort(),
    }

    tracing::debug!("websocket subscriber disconnected");
}

/// Read side of the websocket connection.
///
/// Clients have nothing to say, so incoming messages are discarded until the
/// client closes the connection.
async fn read(mut receiver: SplitStream<WebSocket>) {
    while let Some(Ok(message)) = receiver.next().await {
        if let Message::Close(_) = message {
            break;
        }
    }
}

/// Write side of the websocket connection.
///
/// Forwards every event to the client as a JSON text message.
async fn write(mut sender: SplitSink<WebSocket, Message>, mut events: broadcast::Receiver<Event>) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("websocket subscriber fell behind and missed {skipped} event(s)");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        let serialized = match serde_json::to_string(&event) {
            Ok(serialized) => serialized,
            Err(error) => {
                tracing::error!("could not serialize {event:?}: {error}");
                continue;
            }
        };

        if let Err(error) = sender.send(Message::Text(serialized.into())).await {
            tracing::debug!("could not send event to websocket subscriber: {error}");
            break;
        }
    }
}
