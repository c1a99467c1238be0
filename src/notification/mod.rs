//! Real-time notifications for websocket subscribers.

mod core;
mod socket;

pub use core::{DEFAULT_CAPACITY, Event, Notifier, TransactionEvent};
pub use socket::notifications_endpoint;
