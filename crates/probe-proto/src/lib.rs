//! # probe-proto
//!
//! Wire-format types for the JSON debugger protocol.
//!
//! Every message on the wire is a JSON object carrying an `"event"` name.
//! Requests from a client may carry an opaque `"ticket"` which the server
//! echoes verbatim in the matching response or error. Errors are reported
//! as `"error"` events with a message string and an integer severity.

#![deny(unsafe_code)]

pub mod errors;
pub mod types;

pub use errors::{BadMessage, error_event};
pub use types::{LogLevel, event_name, finish_event, ticket};
