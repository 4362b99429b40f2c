//! Subscriber lifecycle — pluggable modules that install event handlers
//! and own per-session state.

use std::any::Any;

use tracing::debug;

use crate::registry::EventRegistry;

/// Opaque per-session state returned by [`Subscriber::init`].
pub type SubscriberState = Box<dyn Any + Send>;

/// A pluggable module that registers event handlers into a session's
/// [`EventRegistry`] at start and tears its state down at end.
///
/// The init/shutdown lists are positional: the state produced by
/// subscriber *i*'s `init` is the exact argument to subscriber *i*'s
/// `shutdown`.
pub trait Subscriber: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Install handlers; any returned state is handed back to `shutdown`.
    fn init(&mut self, registry: &mut EventRegistry) -> Option<SubscriberState>;

    /// Tear down state produced by `init`.
    ///
    /// The default body is for subscribers with nothing to tear down;
    /// returning state from `init` without overriding this is a contract
    /// violation, fatal in debug builds and ignored in release.
    fn shutdown(&mut self, state: Option<SubscriberState>) {
        debug_assert!(
            state.is_none(),
            "subscriber '{}' returned init state but has no shutdown",
            self.name()
        );
        drop(state);
    }
}

/// Initialize subscribers in list order, collecting their states into a
/// parallel, identically indexed list.
pub fn init_subscribers(
    subscribers: &mut [Box<dyn Subscriber>],
    registry: &mut EventRegistry,
) -> Vec<Option<SubscriberState>> {
    subscribers
        .iter_mut()
        .map(|subscriber| {
            debug!(subscriber = subscriber.name(), "initializing subscriber");
            subscriber.init(registry)
        })
        .collect()
}

/// Shut subscribers down with their corresponding states.
///
/// Teardown deliberately runs in init order, not reversed.
pub fn shutdown_subscribers(
    subscribers: &mut [Box<dyn Subscriber>],
    states: Vec<Option<SubscriberState>>,
) {
    debug_assert_eq!(subscribers.len(), states.len());
    for (subscriber, state) in subscribers.iter_mut().zip(states) {
        debug!(subscriber = subscriber.name(), "shutting down subscriber");
        subscriber.shutdown(state);
    }
}
