// Copyright 2025 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=espalier_tree --heading-base-level=0

//! Espalier Tree: a Kurbo-native UI node tree with a three-pass frame protocol.
//!
//! Espalier Tree is the core of a host-embeddable UI engine. It owns a
//! hierarchy of nodes and runs the measure, layout, and draw passes over it,
//! optionally delegating individual phases to a host runtime through a
//! callback bridge.
//!
//! - Represents a hierarchy of nodes with declared dimensions, alignment,
//!   and delegation flags.
//! - Runs measurement (constraint resolution, wrap-content), layout
//!   (alignment-driven positioning), and draw walks in a single frame step.
//! - Simulates per-kind workload with configurable busy-wait delays.
//! - Mirrors every engine entry point into an optional trace sink for
//!   interop debugging.
//!
//! ## Where this fits
//!
//! The tree is the engine half of a two-sided interop design. The host side
//! (language runtime, scripting VM, test harness) drives mutations and
//! receives delegated passes through the [`HostBridge`] trait; event and
//! frame-clock plumbing lives in the companion `espalier_dispatch` crate.
//!
//! ## Not a general layout engine
//!
//! The measure pass implements exactly the constraint arithmetic of the
//! interop protocol it mirrors, including its historical quirks. It is not a
//! flex/grid/stack layout system and does not try to become one.
//!
//! ## API overview
//!
//! - [`Tree`]: container managing nodes, delays, the host bridge, and the
//!   trace sink.
//! - [`NodeId`]: generational handle of a node.
//! - [`NodeKind`]: small integer tag indexing the delay table.
//! - [`NodeFlags`]: per-phase delegation controls.
//! - [`Dim`] / [`DimUnit`]: declared lengths (px, percent, auto).
//! - [`Alignment`]: 9-way child placement.
//! - [`MeasureSpec`] / [`Frame`]: pass inputs.
//! - [`HostBridge`], [`HostRequest`], [`HostResponse`]: the delegation seam.
//! - [`DelayTable`], [`DelayPhase`]: simulated per-kind workload.
//! - [`TraceSink`], [`MemorySink`]: the call-mirror side channel.
//!
//! Key operations:
//! - [`Tree::create`] → [`NodeId`], [`Tree::dispose`]
//! - [`Tree::add_child`], [`Tree::insert_child_after`],
//!   [`Tree::insert_child_before`], [`Tree::insert_child_at`],
//!   [`Tree::remove_child`]
//! - [`Tree::measure`], [`Tree::layout`], [`Tree::draw`],
//!   [`Tree::measure_layout_and_draw`]
//! - [`Tree::dump`] for a depth-indented diagnostic listing.
//!
//! ### Minimal usage
//!
//! ```
//! use espalier_tree::{Alignment, Dim, NodeFlags, NodeKind, Tree};
//!
//! // Build a tiny tree: a centering root wrapping one fixed-size child.
//! let mut tree = Tree::new();
//! let root = tree.create(NodeKind(0), NodeFlags::empty());
//! let child = tree.create(NodeKind(1), NodeFlags::empty());
//! tree.add_child(root, child).unwrap();
//!
//! tree.set_alignment(root, Alignment::Center);
//! tree.set_width(child, Dim::px(40.0));
//! tree.set_height(child, Dim::px(20.0));
//!
//! // Run one frame against the fixed 800×600 viewport.
//! let size = tree.measure_layout_and_draw(root).unwrap();
//! assert_eq!(size, kurbo::Size::new(40.0, 20.0));
//!
//! println!("{}", tree.dump(root));
//! ```
//!
//! See the `engine_basics` example in this workspace for a runnable version
//! with printed output, and `host_bridge` for phase delegation.

mod delay;
mod host;
mod passes;
mod trace;
mod tree;
mod types;

pub use delay::{DelayPhase, DelayTable, busy_wait};
pub use host::{CanvasHandle, HostBridge, HostRequest, HostResponse};
pub use trace::{MemorySink, TraceSink};
pub use tree::Tree;
pub use types::{
    Alignment, Dim, DimUnit, Error, Frame, MAX_NODE_KIND, MeasureSpec, NodeFlags, NodeId, NodeKind,
    resolve_len,
};
