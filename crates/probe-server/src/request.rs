//! One inbound debugger event and its response lifecycle.

use serde_json::{Map, Value};

use probe_proto::{LogLevel, error_event, finish_event};

use crate::channel::DebugChannel;

/// Where a request is in its response lifecycle.
///
/// Every request reaches exactly one terminal outcome: an explicit
/// response, an explicit failure, or the implicit finish synthesized when
/// a handler returns while the request is still pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// No terminal response sent yet.
    Pending,
    /// A success response (explicit or implicit finish) was sent.
    Responded,
    /// An error event was sent; no finish follows.
    Failed,
}

/// An inbound event being dispatched to a handler.
///
/// Wraps the parsed JSON root, the correlation ticket, and the channel so
/// handlers can stream partial events, respond, or fail the request.
pub struct DebuggerRequest<'a> {
    name: &'a str,
    root: &'a Value,
    channel: &'a mut dyn DebugChannel,
    outcome: RequestOutcome,
}

impl<'a> DebuggerRequest<'a> {
    pub(crate) fn new(name: &'a str, root: &'a Value, channel: &'a mut dyn DebugChannel) -> Self {
        Self {
            name,
            root,
            channel,
            outcome: RequestOutcome::Pending,
        }
    }

    /// Event name that selected the handler.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Full parsed request root, for handler-specific fields.
    pub fn data(&self) -> &Value {
        self.root
    }

    /// Opaque correlation ticket, echoed verbatim in responses.
    pub fn ticket(&self) -> Option<&Value> {
        self.root.get("ticket")
    }

    /// Current lifecycle outcome.
    pub fn outcome(&self) -> RequestOutcome {
        self.outcome
    }

    /// Send a partial/streaming event without ending the request.
    ///
    /// The payload goes out verbatim; the implicit finish still follows
    /// unless the handler later responds or fails explicitly.
    pub fn send(&mut self, payload: Value) {
        self.channel.send(payload);
    }

    /// Send the terminal success response.
    ///
    /// `payload` should be a JSON object; the request's event name and
    /// ticket are filled in when the handler did not set them itself.
    pub fn respond(&mut self, payload: Value) {
        let mut obj = match payload {
            Value::Object(obj) => obj,
            _ => Map::new(),
        };
        if !obj.contains_key("event") {
            let _ = obj.insert("event".into(), Value::String(self.name.into()));
        }
        if !obj.contains_key("ticket") {
            if let Some(t) = self.root.get("ticket") {
                let _ = obj.insert("ticket".into(), t.clone());
            }
        }
        self.channel.send(Value::Object(obj));
        self.outcome = RequestOutcome::Responded;
    }

    /// Fail the request with an `"error"` event at ERROR severity.
    ///
    /// Echoes the ticket when present and suppresses the implicit finish.
    pub fn fail(&mut self, message: &str) {
        self.fail_with(message, LogLevel::Error);
    }

    /// Fail the request with an explicit severity.
    pub fn fail_with(&mut self, message: &str, level: LogLevel) {
        let event = error_event(message, level, self.root.get("ticket"));
        self.channel.send(event);
        self.outcome = RequestOutcome::Failed;
    }

    /// Synthesize the implicit finish if the handler left the request
    /// pending. Called once by the dispatcher after the handler returns.
    pub(crate) fn finish(&mut self) {
        if self.outcome == RequestOutcome::Pending {
            let event = finish_event(self.name, self.root.get("ticket"));
            self.channel.send(event);
            self.outcome = RequestOutcome::Responded;
        }
    }
}
