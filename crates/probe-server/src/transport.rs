//! WebSocket transport — adapts an upgraded `axum` socket to the
//! [`DebugChannel`] seam.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use serde_json::Value;
use tracing::{debug, error};

use crate::channel::{CloseReason, DebugChannel, Frame};

/// [`DebugChannel`] over an upgraded WebSocket.
///
/// Outbound events queue up between ticks and are flushed at the start of
/// each `process` call; inbound frames are read under the tick deadline.
pub struct WsChannel {
    socket: WebSocket,
    outbound: VecDeque<Value>,
    close_requested: Option<CloseReason>,
    close_sent: bool,
    peer_closed: bool,
}

impl WsChannel {
    /// Wrap an already-upgraded socket.
    pub fn new(socket: WebSocket) -> Self {
        Self {
            socket,
            outbound: VecDeque::new(),
            close_requested: None,
            close_sent: false,
            peer_closed: false,
        }
    }

    async fn flush(&mut self) -> Result<(), axum::Error> {
        while let Some(payload) = self.outbound.pop_front() {
            let text = match serde_json::to_string(&payload) {
                Ok(text) => text,
                Err(e) => {
                    error!(error = %e, "failed to serialize outbound event");
                    continue;
                }
            };
            self.socket.send(Message::Text(text.into())).await?;
        }
        if let Some(reason) = self.close_requested {
            if !self.close_sent {
                debug!(reason = reason.as_str(), "sending close frame");
                self.socket
                    .send(Message::Close(Some(CloseFrame {
                        code: reason.code(),
                        reason: reason.as_str().into(),
                    })))
                    .await?;
                self.close_sent = true;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DebugChannel for WsChannel {
    async fn process(&mut self, budget: Duration) -> Option<Vec<Frame>> {
        if self.peer_closed {
            return None;
        }
        if self.flush().await.is_err() {
            return None;
        }

        let deadline = Instant::now() + budget;
        let mut frames = Vec::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match tokio::time::timeout(remaining, self.socket.recv()).await {
                // Budget spent; deliver what we have.
                Err(_) => break,
                Ok(Some(Ok(message))) => match message {
                    Message::Text(text) => frames.push(Frame::Text(text.as_str().to_owned())),
                    Message::Binary(data) => frames.push(Frame::Binary(data.to_vec())),
                    Message::Close(_) => {
                        // Deliver frames read before the close; the next
                        // tick reports terminal close.
                        self.peer_closed = true;
                        break;
                    }
                    // axum answers pings on its own.
                    Message::Ping(_) | Message::Pong(_) => {}
                },
                Ok(Some(Err(_)) | None) => {
                    self.peer_closed = true;
                    break;
                }
            }
        }

        if frames.is_empty() && self.peer_closed {
            return None;
        }
        Some(frames)
    }

    fn send(&mut self, payload: Value) {
        self.outbound.push_back(payload);
    }

    fn close(&mut self, reason: CloseReason) {
        if self.close_requested.is_none() {
            self.close_requested = Some(reason);
        }
    }
}
