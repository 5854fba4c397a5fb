// Copyright 2025 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: node lifecycle, structure mutation, diagnostics.

use core::fmt::Write as _;
use std::time::Duration;

use kurbo::{Point, Size};

use crate::delay::{DelayPhase, DelayTable, busy_wait};
use crate::host::HostBridge;
use crate::trace::TraceSink;
use crate::types::{Alignment, Dim, Error, MAX_NODE_KIND, NodeFlags, NodeId, NodeKind};

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) generation: u32,
    pub(crate) peer_id: u32,
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) flags: NodeFlags,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) width: Dim,
    pub(crate) height: Dim,
    pub(crate) alignment: Alignment,
    pub(crate) size: Size,
    pub(crate) origin: Point,
}

impl Node {
    fn new(generation: u32, peer_id: u32, kind: NodeKind, flags: NodeFlags) -> Self {
        Self {
            generation,
            peer_id,
            name: format!("node{}", kind.raw()),
            kind,
            flags,
            parent: None,
            children: Vec::new(),
            width: Dim::AUTO,
            height: Dim::AUTO,
            alignment: Alignment::default(),
            size: Size::ZERO,
            origin: Point::ZERO,
        }
    }
}

/// The node tree engine.
///
/// Owns the nodes, the per-kind [`DelayTable`], the optional [`HostBridge`],
/// and the optional [`TraceSink`]. All entry points consumed by the host
/// runtime are methods here; there is no process-wide state, so independent
/// trees coexist and tests stay isolated.
pub struct Tree {
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    next_peer_id: u32,
    pub(crate) delays: DelayTable,
    pub(crate) host: Option<Box<dyn HostBridge>>,
    trace: Option<Box<dyn TraceSink>>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("next_peer_id", &self.next_peer_id)
            .field("has_host_bridge", &self.host.is_some())
            .finish_non_exhaustive()
    }
}

impl Tree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            next_peer_id: 1,
            delays: DelayTable::new(),
            host: None,
            trace: None,
        }
    }

    // --- lifecycle ---

    /// Create a new detached node of `kind`.
    ///
    /// Applies the kind-indexed creation delay and assigns the next peer id.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is at or beyond [`MAX_NODE_KIND`]. Out-of-range kinds
    /// are never clamped into range.
    pub fn create(&mut self, kind: NodeKind, flags: NodeFlags) -> NodeId {
        assert!(
            kind.raw() < MAX_NODE_KIND,
            "node kind {} out of range (max {MAX_NODE_KIND})",
            kind.raw()
        );
        busy_wait(self.delays.get(kind, DelayPhase::Create));
        let peer_id = self.next_peer_id;
        self.next_peer_id += 1;

        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, peer_id, kind, flags));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes
                .push(Some(Node::new(generation, peer_id, kind, flags)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        tracing::trace!(target: "espalier_tree::tree", ?id, kind = kind.raw(), "create");
        self.record("createNode", format_args!("kind={} -> {id:?}", kind.raw()));
        id
    }

    /// Release `id` and its entire subtree.
    ///
    /// The handle (and every descendant handle) becomes stale; later
    /// operations on it report [`Error::NotFound`] rather than touching a
    /// reused slot.
    pub fn dispose(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        self.record("disposeNode", format_args!("{id:?}"));
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        self.dispose_subtree(id);
    }

    fn dispose_subtree(&mut self, id: NodeId) {
        let children = self.node(id).children.clone();
        for child in children {
            self.dispose_subtree(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    // --- structure mutation ---

    /// Append `child` to the end of `parent`'s child sequence.
    ///
    /// A child already linked elsewhere is detached first.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        self.ensure_linkable(parent, child)?;
        self.record("addChild", format_args!("parent={parent:?} child={child:?}"));
        self.detach(child);
        self.link_parent(child, parent);
        Ok(())
    }

    /// Insert `child` immediately after `sibling` in `parent`'s child
    /// sequence.
    pub fn insert_child_after(
        &mut self,
        parent: NodeId,
        child: NodeId,
        sibling: NodeId,
    ) -> Result<(), Error> {
        self.ensure_linkable(parent, child)?;
        self.record(
            "insertChildAfter",
            format_args!("parent={parent:?} child={child:?} sibling={sibling:?}"),
        );
        if child == sibling {
            // Anchoring on itself leaves the order unchanged.
            self.sibling_position(parent, child)?;
            return Ok(());
        }
        let at = self.detach_for_insert(parent, child, sibling)?;
        self.link_parent_at(child, parent, at + 1);
        Ok(())
    }

    /// Insert `child` immediately before `sibling` in `parent`'s child
    /// sequence.
    pub fn insert_child_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        sibling: NodeId,
    ) -> Result<(), Error> {
        self.ensure_linkable(parent, child)?;
        self.record(
            "insertChildBefore",
            format_args!("parent={parent:?} child={child:?} sibling={sibling:?}"),
        );
        if child == sibling {
            // Anchoring on itself leaves the order unchanged.
            self.sibling_position(parent, child)?;
            return Ok(());
        }
        let at = self.detach_for_insert(parent, child, sibling)?;
        self.link_parent_at(child, parent, at);
        Ok(())
    }

    /// Insert `child` at `position` in `parent`'s child sequence.
    ///
    /// `position` is clamped to the current child count.
    pub fn insert_child_at(
        &mut self,
        parent: NodeId,
        child: NodeId,
        position: usize,
    ) -> Result<(), Error> {
        self.ensure_linkable(parent, child)?;
        self.record(
            "insertChildAt",
            format_args!("parent={parent:?} child={child:?} position={position}"),
        );
        self.detach(child);
        let at = position.min(self.node(parent).children.len());
        self.link_parent_at(child, parent, at);
        Ok(())
    }

    /// Remove one occurrence of `child` from `parent`.
    ///
    /// Best-effort: returns whether a child was actually removed. A stale
    /// `child` handle removes nothing.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool, Error> {
        self.ensure_alive(parent)?;
        self.record(
            "removeChild",
            format_args!("parent={parent:?} child={child:?}"),
        );
        if !self.is_alive(child) {
            return Ok(false);
        }
        let children = &mut self.node_mut(parent).children;
        match children.iter().position(|&c| c == child) {
            Some(at) => {
                children.remove(at);
                self.node_mut(child).parent = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // --- diagnostics ---

    /// Produce a depth-indented `peer_id: name` listing of the subtree rooted
    /// at `id`. Diagnostic only; no tree state is touched.
    pub fn dump(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.dump_inner(id, 0, &mut out);
        out
    }

    fn dump_inner(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = self.node_opt(id) else {
            return;
        };
        for _ in 0..depth {
            out.push_str("  ");
        }
        let _ = writeln!(out, "{}: {}", node.peer_id, node.name);
        for &child in &node.children {
            self.dump_inner(child, depth + 1, out);
        }
    }

    // --- configuration ---

    /// Register the single host bridge, replacing any previous one.
    pub fn set_host_bridge(&mut self, bridge: Box<dyn HostBridge>) {
        self.record("setHostBridge", format_args!(""));
        self.host = Some(bridge);
    }

    /// Remove the registered host bridge, if any.
    pub fn clear_host_bridge(&mut self) -> Option<Box<dyn HostBridge>> {
        self.host.take()
    }

    /// Install a trace sink mirroring every entry-point invocation.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace = Some(sink);
    }

    /// Remove the trace sink, if any.
    pub fn clear_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.trace.take()
    }

    /// Configure the simulated delay for one kind and phase.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is at or beyond [`MAX_NODE_KIND`].
    pub fn set_delay(&mut self, kind: NodeKind, phase: DelayPhase, delay: Duration) {
        self.delays.set(kind, phase, delay);
    }

    // --- node state ---

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some()
    }

    /// The kind of a live node.
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node_opt(id).map(|n| n.kind)
    }

    /// The monotonically assigned peer id of a live node.
    pub fn peer_id(&self, id: NodeId) -> Option<u32> {
        self.node_opt(id).map(|n| n.peer_id)
    }

    /// The display name of a live node.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node_opt(id).map(|n| n.name.as_str())
    }

    /// The parent of a live node, if linked.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// The ordered children of a node. Empty for stale handles.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// The computed size of a live node (zero until measured).
    pub fn size(&self, id: NodeId) -> Option<Size> {
        self.node_opt(id).map(|n| n.size)
    }

    /// The computed absolute position of a live node (zero until laid out).
    pub fn origin(&self, id: NodeId) -> Option<Point> {
        self.node_opt(id).map(|n| n.origin)
    }

    /// Set the declared width. Silently ignores stale handles.
    pub fn set_width(&mut self, id: NodeId, width: Dim) {
        if let Some(n) = self.node_opt_mut(id) {
            n.width = width;
        }
    }

    /// Set the declared height. Silently ignores stale handles.
    pub fn set_height(&mut self, id: NodeId, height: Dim) {
        if let Some(n) = self.node_opt_mut(id) {
            n.height = height;
        }
    }

    /// Set the child alignment. Silently ignores stale handles.
    pub fn set_alignment(&mut self, id: NodeId, alignment: Alignment) {
        if let Some(n) = self.node_opt_mut(id) {
            n.alignment = alignment;
        }
    }

    /// Replace the delegation flags. Silently ignores stale handles.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.flags = flags;
        }
    }

    /// Set the display name. Silently ignores stale handles.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.name = name.into();
        }
    }

    // --- internals ---

    pub(crate) fn record(&mut self, op: &'static str, detail: core::fmt::Arguments<'_>) {
        if let Some(sink) = self.trace.as_mut() {
            sink.record(op, detail);
        }
    }

    pub(crate) fn ensure_alive(&self, id: NodeId) -> Result<(), Error> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(Error::NotFound(id))
        }
    }

    fn ensure_linkable(&self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        self.ensure_alive(parent)?;
        self.ensure_alive(child)?;
        if parent == child {
            return Err(Error::SelfParent(child));
        }
        Ok(())
    }

    /// Validate the sibling and detach `child`, returning the sibling's
    /// position after the detach. All failures happen before any mutation.
    fn detach_for_insert(
        &mut self,
        parent: NodeId,
        child: NodeId,
        sibling: NodeId,
    ) -> Result<usize, Error> {
        let sibling_at = self.sibling_position(parent, sibling)?;
        let child_at = self
            .node(parent)
            .children
            .iter()
            .position(|&c| c == child);
        self.detach(child);
        // Detaching a child that sat before the sibling shifts it left.
        Ok(match child_at {
            Some(at) if at < sibling_at => sibling_at - 1,
            _ => sibling_at,
        })
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    pub(crate) fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    pub(crate) fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(parent).children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn link_parent_at(&mut self, id: NodeId, parent: NodeId, at: usize) {
        self.node_mut(parent).children.insert(at, id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(parent).children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
    }

    fn sibling_position(&self, parent: NodeId, sibling: NodeId) -> Result<usize, Error> {
        self.node(parent)
            .children
            .iter()
            .position(|&c| c == sibling)
            .ok_or(Error::NotFound(sibling))
    }
}
