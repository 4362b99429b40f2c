//! Envelope accessors, severity levels, and the implicit finish event.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Severity attached to outbound `"error"` events.
///
/// Serialized as its integer code, matching the wire protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LogLevel {
    /// Noteworthy but not a problem.
    Notice = 1,
    /// The request could not be carried out.
    Error = 2,
    /// Something suspicious, request still handled.
    Warn = 3,
    /// Informational.
    Info = 4,
    /// Debug detail.
    Debug = 5,
    /// Very chatty detail.
    Verbose = 6,
}

impl LogLevel {
    /// Integer code used on the wire (1..=6).
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        match code {
            1 => Ok(Self::Notice),
            2 => Ok(Self::Error),
            3 => Ok(Self::Warn),
            4 => Ok(Self::Info),
            5 => Ok(Self::Debug),
            6 => Ok(Self::Verbose),
            other => Err(other),
        }
    }
}

/// Read the `"event"` name from an inbound root, if it is a string.
pub fn event_name(root: &Value) -> Option<&str> {
    root.get("event").and_then(Value::as_str)
}

/// Read the opaque `"ticket"` from an inbound root, if present.
///
/// Tickets are never interpreted, only echoed back verbatim.
pub fn ticket(root: &Value) -> Option<&Value> {
    root.get("ticket")
}

/// Build the implicit success acknowledgement for a handled request.
///
/// Sent when a handler returns without responding or failing; repeats the
/// request's event name and ticket so the client can correlate it.
pub fn finish_event(event: &str, ticket: Option<&Value>) -> Value {
    let mut obj = Map::new();
    let _ = obj.insert("event".into(), Value::String(event.into()));
    if let Some(t) = ticket {
        let _ = obj.insert("ticket".into(), t.clone());
    }
    Value::Object(obj)
}
