//! Broadcasters — pluggable modules that emit spontaneous events.

use crate::channel::DebugChannel;

/// A module invoked once per tick, after the inbound drain, to push
/// events the client did not ask for (log lines, state transitions).
///
/// A broadcaster decides from its own state whether this tick produces
/// zero or more events. Broadcast events never carry a ticket; they are
/// not responses.
pub trait Broadcaster: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Emit zero or more events for this tick.
    fn broadcast(&mut self, channel: &mut dyn DebugChannel);
}
