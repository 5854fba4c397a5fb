// Copyright 2025 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=espalier_dispatch --heading-base-level=0

//! Espalier Dispatch: event routing and frame pacing for the Espalier engine.
//!
//! ## Overview
//!
//! This crate carries the host-facing dispatch plumbing that sits next to
//! the node tree: click-event routing, draw-modifier callbacks, and a
//! cancellable frame clock. It knows nothing about tree structure; callers
//! key registrations by whatever node handle their tree uses.
//!
//! ## Ownership as resource pinning
//!
//! Handlers and draw callbacks are owned boxed closures. A registration
//! keeps whatever the closure captures alive; removal or replacement drops
//! it. This is the whole lifetime story — there is no separate pin/unpin
//! bookkeeping to forget.
//!
//! ## Pieces
//!
//! - [`ClickRouter`]: one handler per key, synchronous exactly-once
//!   delivery, silent no-op for unregistered keys.
//! - [`DrawModifierRegistry`]: up to three callbacks per key
//!   ([`DrawPhase::Behind`], [`DrawPhase::Content`], [`DrawPhase::Front`]),
//!   invoked in fixed phase order.
//! - [`FrameClock`]: a named worker thread invoking a callback every period
//!   (default [`VSYNC_PERIOD`]); stoppable and joined on drop, so no thread
//!   outlives its clock.
//!
//! ```
//! use espalier_dispatch::{ClickRouter, DrawContext, DrawModifierRegistry, DrawPhase};
//!
//! let mut clicks: ClickRouter<u32, (f64, f64)> = ClickRouter::new();
//! clicks.register(1, Box::new(|&(x, y)| println!("clicked at {x},{y}")));
//! assert!(clicks.emit(1, &(10.0, 20.0)));
//!
//! let mut draws: DrawModifierRegistry<u32> = DrawModifierRegistry::new();
//! draws.register(1, DrawPhase::Front, Box::new(|_| println!("front")));
//! assert_eq!(draws.invoke_all(1, DrawContext::SYNTHETIC), 1);
//! ```

mod click;
mod draw_modifier;
mod frame_clock;

pub use click::ClickRouter;
pub use draw_modifier::{DrawContext, DrawModifierRegistry, DrawPhase};
pub use frame_clock::{FrameClock, VSYNC_PERIOD};
