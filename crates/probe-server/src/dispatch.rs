//! Inbound frame dispatch — parses text frames into debugger requests and
//! routes them through the `EventRegistry`.

use metrics::counter;
use serde_json::Value;
use tracing::{debug, warn};

use probe_proto::{BadMessage, event_name, ticket};

use crate::channel::{DebugChannel, Frame};
use crate::registry::EventRegistry;
use crate::request::DebuggerRequest;

/// Dispatch one inbound frame.
pub fn handle_frame(frame: &Frame, registry: &mut EventRegistry, channel: &mut dyn DebugChannel) {
    match frame {
        Frame::Text(text) => handle_text(text, registry, channel),
        Frame::Binary(data) => handle_binary(data.len(), channel),
    }
}

/// Dispatch one text frame.
///
/// Framing errors (invalid JSON, missing event property) and protocol
/// errors (unknown event) are reported to the peer as `"error"` events and
/// never close the session. Each frame is handled exactly once; there is
/// no retry.
pub fn handle_text(text: &str, registry: &mut EventRegistry, channel: &mut dyn DebugChannel) {
    let root: Value = match serde_json::from_str(text) {
        Ok(root) => root,
        Err(_) => {
            warn!("text frame is not valid JSON");
            counter!("debugger_bad_messages_total", "kind" => "invalid_json").increment(1);
            channel.send(BadMessage::InvalidJson.to_event(None));
            return;
        }
    };

    let Some(name) = event_name(&root) else {
        warn!("message without an event property");
        counter!("debugger_bad_messages_total", "kind" => "no_event").increment(1);
        // Echo the ticket when the partial parse yields one.
        channel.send(BadMessage::MissingEvent.to_event(ticket(&root)));
        return;
    };

    debug!(event = name, "dispatching event");
    counter!("debugger_events_total", "event" => name.to_owned()).increment(1);

    let mut request = DebuggerRequest::new(name, &root, channel);
    match registry.get_mut(name) {
        Some(handler) => {
            handler(&mut request);
            request.finish();
        }
        None => {
            warn!(event = name, "unknown event");
            counter!("debugger_bad_messages_total", "kind" => "unknown_event").increment(1);
            request.fail(&BadMessage::UnknownEvent.to_string());
        }
    }
}

/// Reject one binary frame. Binary payloads are never valid protocol
/// input; no ticket can be extracted so none is echoed.
pub fn handle_binary(len: usize, channel: &mut dyn DebugChannel) {
    warn!(len, "binary frame rejected");
    counter!("debugger_bad_messages_total", "kind" => "binary").increment(1);
    channel.send(BadMessage::BinaryFrame.to_event(None));
}
