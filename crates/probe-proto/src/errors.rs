//! Protocol error taxonomy and the outbound `"error"` event shape.

use serde_json::{Map, Value, json};

use crate::types::LogLevel;

/// A frame the session could not turn into a handled request.
///
/// All variants are recovered locally and surfaced to the peer as an
/// `"error"` event; none of them closes the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BadMessage {
    /// Text frame that did not parse as JSON.
    #[error("Bad message: invalid JSON")]
    InvalidJson,

    /// JSON without a string `"event"` field.
    #[error("Bad message: no event property")]
    MissingEvent,

    /// Event name with no registered handler.
    #[error("Bad message: unknown event")]
    UnknownEvent,

    /// Binary frames are never valid protocol input.
    #[error("Bad message")]
    BinaryFrame,
}

impl BadMessage {
    /// Build the `"error"` event reporting this failure to the peer.
    pub fn to_event(self, ticket: Option<&Value>) -> Value {
        error_event(&self.to_string(), LogLevel::Error, ticket)
    }
}

/// Build an outbound `"error"` event.
///
/// Shape: `{"event": "error", "message": .., "level": 1..6, "ticket": ..}`
/// with the ticket echoed verbatim when one was extractable from the
/// offending request.
pub fn error_event(message: &str, level: LogLevel, ticket: Option<&Value>) -> Value {
    let mut obj = Map::new();
    let _ = obj.insert("event".into(), json!("error"));
    let _ = obj.insert("message".into(), json!(message));
    let _ = obj.insert("level".into(), json!(level.code()));
    if let Some(t) = ticket {
        let _ = obj.insert("ticket".into(), t.clone());
    }
    Value::Object(obj)
}
