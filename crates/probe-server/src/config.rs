//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// WebSocket subprotocol identifier spoken by this debugger.
pub const SUBPROTOCOL: &str = "debugger.json.v1";

/// Configuration for a debugger session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Per-tick channel I/O budget in milliseconds.
    pub tick_budget_ms: u64,
    /// Subprotocol identifier offered during the upgrade.
    pub subprotocol: String,
}

impl SessionConfig {
    /// Per-tick I/O budget as a `Duration`.
    pub fn tick_budget(&self) -> Duration {
        Duration::from_millis(self.tick_budget_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            // ~60 ticks per second.
            tick_budget_ms: 16,
            subprotocol: SUBPROTOCOL.into(),
        }
    }
}
