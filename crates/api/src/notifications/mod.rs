//! Real-time delivery of persisted notifications.
//!
//! The [`NotificationDispatcher`] trait sits between request handlers /
//! background tasks and the WebSocket layer. Rows are committed first;
//! dispatch happens after, and a failed or absent connection never fails
//! the request.

mod dispatcher;

pub use dispatcher::{
    notification_event, seats_event, NoopDispatcher, NotificationDispatcher, WsDispatcher,
};
