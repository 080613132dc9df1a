//! In-process publish/subscribe registry for decoded events
//!
//! The dispatcher is owned by the read loop and invoked synchronously in
//! its thread of control: every matching handler runs to completion
//! before the next device read is issued.

use crate::events::{EventKey, InputEvent};
use std::collections::HashMap;
use tracing::debug;

/// Callback invoked for every published event matching its key.
pub type Handler = Box<dyn FnMut(&InputEvent) + Send + 'static>;

/// Registry of event handlers keyed by [`EventKey`].
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<EventKey, Vec<Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler. Handlers sharing a key are invoked in
    /// registration order.
    pub fn subscribe(&mut self, key: EventKey, handler: Handler) {
        debug!(key = %key, "registering handler");
        self.handlers.entry(key).or_default().push(handler);
    }

    /// Delivers one event to every handler registered for its key.
    pub fn publish(&mut self, event: &InputEvent) {
        if let Some(handlers) = self.handlers.get_mut(&event.key()) {
            for handler in handlers.iter_mut() {
                handler(event);
            }
        }
    }

    /// Removes every registration.
    pub fn clear(&mut self) {
        if !self.handlers.is_empty() {
            debug!(keys = self.handlers.len(), "clearing all handlers");
        }
        self.handlers.clear();
    }

    /// Number of keys with at least one handler.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
