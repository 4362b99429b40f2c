//! Event-name → handler table, populated by subscribers at session start.

use std::collections::HashMap;

use crate::request::DebuggerRequest;

/// Handler invoked synchronously for one inbound event.
pub type EventHandler = Box<dyn FnMut(&mut DebuggerRequest<'_>) + Send>;

/// Per-session mapping from event name to handler.
///
/// Owned by exactly one session; never shared across connections.
pub struct EventRegistry {
    handlers: HashMap<String, EventHandler>,
}

impl EventRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for an event name.
    ///
    /// Last registration wins: a later subscriber silently replaces an
    /// earlier handler for the same name. This mirrors the original
    /// protocol's behavior and is relied on for overrides.
    pub fn register(
        &mut self,
        event: impl Into<String>,
        handler: impl FnMut(&mut DebuggerRequest<'_>) + Send + 'static,
    ) {
        let _ = self.handlers.insert(event.into(), Box::new(handler));
    }

    /// Check whether an event name has a handler.
    pub fn has_event(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    /// List all registered event names (sorted).
    pub fn events(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub(crate) fn get_mut(&mut self, event: &str) -> Option<&mut EventHandler> {
        self.handlers.get_mut(event)
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}
