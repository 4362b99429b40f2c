//! # probe-server
//!
//! Per-connection session handling for the JSON-over-WebSocket remote
//! debugging protocol.
//!
//! - `Session` drives one connected client from accept to teardown
//! - `EventRegistry` maps event names to handlers installed by `Subscriber`s
//! - `Broadcaster`s push spontaneous (non-request) events once per tick
//! - `ShutdownRegistry` synchronizes draining of all open sessions
//! - `WsChannel` adapts an upgraded `axum` WebSocket to the channel seam

#![deny(unsafe_code)]

pub mod broadcaster;
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod registry;
pub mod request;
pub mod session;
pub mod shutdown;
pub mod subscriber;
pub mod transport;

pub use broadcaster::Broadcaster;
pub use channel::{CloseReason, DebugChannel, Frame};
pub use config::SessionConfig;
pub use registry::EventRegistry;
pub use request::{DebuggerRequest, RequestOutcome};
pub use session::{Session, SessionState};
pub use shutdown::ShutdownRegistry;
pub use subscriber::{Subscriber, SubscriberState};
pub use transport::WsChannel;
