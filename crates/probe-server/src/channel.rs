//! Transport seam between a `Session` and its underlying message channel.
//!
//! The session never touches a socket directly; it drives this trait from
//! its own tick loop, so the whole protocol state machine can be exercised
//! in tests without any network.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// One inbound frame from the peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// Text payload, expected to be a JSON event.
    Text(String),
    /// Binary payload — never valid protocol input.
    Binary(Vec<u8>),
}

/// Reason given to the peer when closing the channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseReason {
    /// Ordinary close.
    Normal,
    /// The server is shutting down.
    GoingAway,
}

impl CloseReason {
    /// WebSocket close code for this reason.
    pub fn code(self) -> u16 {
        match self {
            Self::Normal => 1000,
            Self::GoingAway => 1001,
        }
    }

    /// Human-readable close reason.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal closure",
            Self::GoingAway => "going away",
        }
    }
}

/// A duplex, message-oriented channel carrying JSON payloads.
#[async_trait]
pub trait DebugChannel: Send {
    /// Pump channel I/O for at most `budget` and return the inbound frames
    /// received, or `None` once the connection is terminally closed.
    async fn process(&mut self, budget: Duration) -> Option<Vec<Frame>>;

    /// Queue a JSON event for delivery to the peer.
    ///
    /// Delivery happens during a subsequent `process` call; a send never
    /// fails from the caller's point of view, an unreachable peer simply
    /// surfaces as a terminal close.
    fn send(&mut self, payload: Value);

    /// Start the close handshake. Terminal close is still reported through
    /// `process`, which keeps draining until the peer confirms.
    fn close(&mut self, reason: CloseReason);
}
