//! Cross-session shutdown barrier.
//!
//! The registry counts open sessions and carries a cooperative stop flag.
//! Stopping is a barrier, not a cancellation: sessions observe the flag at
//! their own tick boundary, close their channel, and drain; the stopper
//! blocks until the count reaches zero.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::info;

/// Shared registry of open sessions plus the stop flag.
///
/// One instance is created at startup and handed (`Arc`-shared) to every
/// session; keeping it constructible rather than process-global lets the
/// barrier be tested in isolation.
pub struct ShutdownRegistry {
    stop: AtomicBool,
    active: watch::Sender<usize>,
}

impl ShutdownRegistry {
    /// Create a registry with no active sessions and the flag cleared.
    pub fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            active: watch::Sender::new(0),
        }
    }

    /// Count one more active session.
    ///
    /// Sessions registering while a stop is in progress are still counted
    /// and must drain before the barrier releases.
    pub fn register(&self) {
        self.active.send_modify(|n| *n += 1);
    }

    /// Count one session as drained; releases the barrier at zero.
    pub fn unregister(&self) {
        self.active.send_modify(|n| *n = n.saturating_sub(1));
    }

    /// Number of sessions currently open.
    pub fn active_sessions(&self) -> usize {
        *self.active.borrow()
    }

    /// Whether a stop has been requested.
    ///
    /// Relaxed load: sessions poll this once per tick, and a stale read
    /// only delays shutdown by one tick.
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Request all sessions to stop and wait until they have drained.
    ///
    /// Returns immediately when no session is active. The flag is cleared
    /// on return so sessions accepted afterwards are unaffected.
    pub async fn request_stop_and_wait(&self) {
        self.stop.store(true, Ordering::SeqCst);
        info!(
            active = self.active_sessions(),
            "stop requested, waiting for sessions to drain"
        );

        // wait_for checks the current value first, so an idle registry
        // returns without suspending.
        let mut rx = self.active.subscribe();
        let _ = rx.wait_for(|active| *active == 0).await;

        self.stop.store(false, Ordering::SeqCst);
        info!("all sessions drained");
    }
}

impl Default for ShutdownRegistry {
    fn default() -> Self {
        Self::new()
    }
}
