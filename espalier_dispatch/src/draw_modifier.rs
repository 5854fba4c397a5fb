// Copyright 2025 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw-modifier dispatch: three ordered per-key draw phases.

use core::hash::Hash;
use std::collections::HashMap;

/// The three draw-modifier phases, in invocation order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DrawPhase {
    /// Painted behind the node's own content.
    Behind,
    /// Replaces the node's own content pass.
    Content,
    /// Painted in front of the node's own content.
    Front,
}

impl DrawPhase {
    const ORDER: [Self; 3] = [Self::Behind, Self::Content, Self::Front];

    const fn slot(self) -> usize {
        match self {
            Self::Behind => 0,
            Self::Content => 1,
            Self::Front => 2,
        }
    }
}

/// Opaque drawing context handed to modifier callbacks.
///
/// Carries the host's 64-bit canvas token. Outside a real host embedding the
/// synthetic placeholder is used.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DrawContext(pub u64);

impl DrawContext {
    /// The placeholder context used when no real canvas is attached.
    pub const SYNTHETIC: Self = Self((42 << 32) | 42);
}

type DrawFn = Box<dyn FnMut(DrawContext)>;

/// Per-key holder of the three phase slots, lazily created on first
/// registration.
struct Holder {
    slots: [Option<DrawFn>; 3],
}

impl Holder {
    fn empty() -> Self {
        Self {
            slots: [None, None, None],
        }
    }
}

/// Registry of draw-modifier callbacks keyed by node.
///
/// Callbacks are owned boxed closures, same pinning contract as
/// [`ClickRouter`](crate::ClickRouter): captured resources live until the
/// slot is replaced, the key is removed, or the registry drops.
pub struct DrawModifierRegistry<K> {
    holders: HashMap<K, Holder>,
}

impl<K: Copy + Eq + Hash> Default for DrawModifierRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> core::fmt::Debug for DrawModifierRegistry<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DrawModifierRegistry")
            .field("holders", &self.holders.len())
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq + Hash> DrawModifierRegistry<K> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            holders: HashMap::new(),
        }
    }

    /// Register `callback` for one phase of `key`, replacing any previous
    /// callback in that slot. The key's holder is created on first use.
    pub fn register(&mut self, key: K, phase: DrawPhase, callback: DrawFn) {
        tracing::trace!(target: "espalier_dispatch::draw", ?phase, "register");
        self.holders.entry(key).or_insert_with(Holder::empty).slots[phase.slot()] = Some(callback);
    }

    /// Remove every callback registered for `key`.
    ///
    /// Returns whether a holder existed.
    pub fn remove(&mut self, key: K) -> bool {
        self.holders.remove(&key).is_some()
    }

    /// Returns true if `key` has a callback in `phase`.
    pub fn is_registered(&self, key: K, phase: DrawPhase) -> bool {
        self.holders
            .get(&key)
            .is_some_and(|h| h.slots[phase.slot()].is_some())
    }

    /// Invoke the registered phases for `key` in Behind, Content, Front
    /// order, silently skipping empty slots.
    ///
    /// Returns the number of callbacks run (zero for an unknown key).
    pub fn invoke_all(&mut self, key: K, ctx: DrawContext) -> usize {
        let Some(holder) = self.holders.get_mut(&key) else {
            return 0;
        };
        let mut run = 0;
        for phase in DrawPhase::ORDER {
            if let Some(callback) = holder.slots[phase.slot()].as_mut() {
                callback(ctx);
                run += 1;
            }
        }
        run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn invoke_all_runs_registered_phases_in_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut registry: DrawModifierRegistry<u32> = DrawModifierRegistry::new();

        // Register Front before Behind; invocation order must not depend on
        // registration order. Content is left empty.
        let o = Rc::clone(&order);
        registry.register(5, DrawPhase::Front, Box::new(move |_| o.borrow_mut().push("front")));
        let o = Rc::clone(&order);
        registry.register(
            5,
            DrawPhase::Behind,
            Box::new(move |ctx| {
                assert_eq!(ctx, DrawContext::SYNTHETIC);
                o.borrow_mut().push("behind");
            }),
        );

        let run = registry.invoke_all(5, DrawContext::SYNTHETIC);
        assert_eq!(run, 2);
        assert_eq!(order.borrow().as_slice(), &["behind", "front"]);
    }

    #[test]
    fn unknown_key_runs_nothing() {
        let mut registry: DrawModifierRegistry<u32> = DrawModifierRegistry::new();
        assert_eq!(registry.invoke_all(9, DrawContext::SYNTHETIC), 0);
    }

    #[test]
    fn default_registry_is_empty() {
        let mut registry: DrawModifierRegistry<u32> = DrawModifierRegistry::default();
        assert!(!registry.is_registered(1, DrawPhase::Content));
        assert_eq!(registry.invoke_all(1, DrawContext::SYNTHETIC), 0);
    }

    #[test]
    fn re_register_replaces_only_that_slot() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut registry: DrawModifierRegistry<u32> = DrawModifierRegistry::new();

        let h = Rc::clone(&hits);
        registry.register(1, DrawPhase::Behind, Box::new(move |_| h.borrow_mut().push("old")));
        let h = Rc::clone(&hits);
        registry.register(1, DrawPhase::Behind, Box::new(move |_| h.borrow_mut().push("new")));
        let h = Rc::clone(&hits);
        registry.register(1, DrawPhase::Content, Box::new(move |_| h.borrow_mut().push("content")));

        assert_eq!(registry.invoke_all(1, DrawContext::SYNTHETIC), 2);
        assert_eq!(hits.borrow().as_slice(), &["new", "content"]);
    }

    #[test]
    fn remove_clears_the_whole_holder() {
        let mut registry: DrawModifierRegistry<u32> = DrawModifierRegistry::new();
        registry.register(1, DrawPhase::Front, Box::new(|_| {}));
        assert!(registry.is_registered(1, DrawPhase::Front));
        assert!(!registry.is_registered(1, DrawPhase::Behind));

        assert!(registry.remove(1));
        assert!(!registry.is_registered(1, DrawPhase::Front));
        assert_eq!(registry.invoke_all(1, DrawContext::SYNTHETIC), 0);
    }
}
