// Copyright 2025 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Click event routing: keyed, owned handlers invoked exactly once per emit.

use core::hash::Hash;
use std::collections::HashMap;

/// Routes click events to per-key handlers.
///
/// `K` is the node key type (any copyable hashable id). `E` is the event
/// payload delivered by reference.
///
/// Handlers are owned boxed closures. Ownership is the pinning mechanism:
/// whatever host-side resources a handler captures stay alive exactly as
/// long as the registration, and are released on [`ClickRouter::remove`],
/// re-registration, or drop of the router.
pub struct ClickRouter<K, E> {
    handlers: HashMap<K, Box<dyn FnMut(&E)>>,
}

impl<K: Copy + Eq + Hash, E> Default for ClickRouter<K, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, E> core::fmt::Debug for ClickRouter<K, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClickRouter")
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq + Hash, E> ClickRouter<K, E> {
    /// Create an empty router.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for `key`, replacing (and dropping) any previous
    /// handler for the same key.
    pub fn register(&mut self, key: K, handler: Box<dyn FnMut(&E)>) {
        tracing::trace!(target: "espalier_dispatch::click", "register");
        self.handlers.insert(key, handler);
    }

    /// Remove the handler for `key`, dropping its captured resources.
    ///
    /// Returns whether a handler was registered.
    pub fn remove(&mut self, key: K) -> bool {
        self.handlers.remove(&key).is_some()
    }

    /// Returns true if a handler is registered for `key`.
    pub fn is_registered(&self, key: K) -> bool {
        self.handlers.contains_key(&key)
    }

    /// Deliver `event` to the handler for `key`, synchronously and exactly
    /// once.
    ///
    /// Returns whether a handler ran; an unregistered key is a silent no-op.
    pub fn emit(&mut self, key: K, event: &E) -> bool {
        match self.handlers.get_mut(&key) {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }
}
