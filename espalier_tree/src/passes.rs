// Copyright 2025 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The measure, layout, and draw passes.

use kurbo::Size;

use crate::delay::{DelayPhase, busy_wait};
use crate::host::{CanvasHandle, HostRequest, HostResponse};
use crate::tree::Tree;
use crate::types::{DimUnit, Error, Frame, MeasureSpec, NodeFlags, NodeId, resolve_len};

impl Tree {
    /// Measure the subtree rooted at `id` under `spec` and cache the result
    /// on each node.
    ///
    /// Nodes flagged [`NodeFlags::CUSTOM_MEASURE`] delegate to the host
    /// bridge instead of recursing.
    pub fn measure(&mut self, id: NodeId, spec: MeasureSpec) -> Result<Size, Error> {
        self.ensure_alive(id)?;
        self.record("measureNode", format_args!("{id:?} spec={spec:?}"));
        let node = self.node(id);
        let kind = node.kind;

        if node.flags.contains(NodeFlags::CUSTOM_MEASURE) {
            let size = match self.dispatch_host(id, HostRequest::Measure { spec })? {
                HostResponse::Measured(size) => size,
                HostResponse::Done => Size::ZERO,
            };
            self.node_mut(id).size = size;
            busy_wait(self.delays.get(kind, DelayPhase::Measure));
            return Ok(size);
        }

        let (width, height) = (node.width, node.height);
        let mut size = Size::new(
            resolve_len(spec.max.width, width),
            resolve_len(spec.max.height, height),
        );

        // Inherited wire-format quirk: the third slot of the child constraint
        // carries min height, not min width. Preserved bit-for-bit.
        let child_spec = MeasureSpec {
            min: spec.min,
            max: Size::new(spec.min.height, spec.max.height),
        };
        let children = self.node(id).children.clone();
        let mut children_max = Size::ZERO;
        for child in children {
            let child_size = self.measure(child, child_spec)?;
            children_max.width = children_max.width.max(child_size.width);
            children_max.height = children_max.height.max(child_size.height);
        }

        // Wrap-content axes take the largest child; explicit axes stand.
        let node = self.node(id);
        if width.unit == DimUnit::Auto && !node.children.is_empty() {
            size.width = children_max.width;
        }
        if height.unit == DimUnit::Auto && !node.children.is_empty() {
            size.height = children_max.height;
        }
        self.node_mut(id).size = size;
        busy_wait(self.delays.get(kind, DelayPhase::Measure));
        Ok(size)
    }

    /// Position the subtree rooted at `id` within `frame` and cache each
    /// node's absolute origin.
    ///
    /// Uses the sizes cached by [`Tree::measure`]. Nodes flagged
    /// [`NodeFlags::CUSTOM_LAYOUT`] delegate to the host bridge and keep
    /// their previous origin.
    pub fn layout(&mut self, id: NodeId, frame: Frame) -> Result<(), Error> {
        self.ensure_alive(id)?;
        self.record("layoutNode", format_args!("{id:?} frame={frame:?}"));
        let node = self.node(id);
        let kind = node.kind;

        if node.flags.contains(NodeFlags::CUSTOM_LAYOUT) {
            self.dispatch_host(id, HostRequest::Layout)?;
            busy_wait(self.delays.get(kind, DelayPhase::Layout));
            return Ok(());
        }

        let alignment = node.alignment;
        let container = node.size;
        self.node_mut(id).origin = frame.origin;

        let children = self.node(id).children.clone();
        for child in children {
            let child_size = self.node(child).size;
            let displacement = alignment.displacement(container, child_size);
            self.layout(
                child,
                Frame {
                    origin: frame.origin + displacement,
                    size: child_size,
                },
            )?;
        }
        busy_wait(self.delays.get(kind, DelayPhase::Layout));
        Ok(())
    }

    /// Walk the subtree rooted at `id` for drawing.
    ///
    /// Nodes flagged [`NodeFlags::CUSTOM_DRAW`] delegate to the host bridge
    /// with the synthetic canvas handle and `region`; other nodes recurse
    /// into their children with a zeroed region.
    pub fn draw(&mut self, id: NodeId, region: Frame) -> Result<(), Error> {
        self.ensure_alive(id)?;
        self.record("drawNode", format_args!("{id:?} region={region:?}"));
        let node = self.node(id);
        let kind = node.kind;

        if node.flags.contains(NodeFlags::CUSTOM_DRAW) {
            self.dispatch_host(
                id,
                HostRequest::Draw {
                    canvas: CanvasHandle::SYNTHETIC,
                    region,
                },
            )?;
            busy_wait(self.delays.get(kind, DelayPhase::Draw));
            return Ok(());
        }

        let children = self.node(id).children.clone();
        for child in children {
            self.draw(child, Frame::ZERO)?;
        }
        busy_wait(self.delays.get(kind, DelayPhase::Draw));
        Ok(())
    }

    /// Run all three passes over the subtree rooted at `root` with the
    /// fixed 800×600 viewport, returning the measured root size.
    pub fn measure_layout_and_draw(&mut self, root: NodeId) -> Result<Size, Error> {
        self.record("measureLayoutAndDraw", format_args!("{root:?}"));
        tracing::debug!(target: "espalier_tree::passes", ?root, "frame");
        let viewport = Size::new(800.0, 600.0);
        let size = self.measure(root, MeasureSpec::tight(viewport))?;
        let frame = Frame::new(0.0, 0.0, viewport.width, viewport.height);
        self.layout(root, frame)?;
        self.draw(root, frame)?;
        Ok(size)
    }

    fn dispatch_host(&mut self, id: NodeId, request: HostRequest) -> Result<HostResponse, Error> {
        let mut host = self.host.take().ok_or(Error::HostNotConfigured)?;
        let response = host.dispatch(id, request);
        self.host = Some(host);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostBridge;
    use crate::types::{Alignment, Dim, NodeKind};
    use kurbo::Point;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    fn kind0() -> NodeKind {
        NodeKind(0)
    }

    /// Bridge that records every request and answers measures with a fixed
    /// size.
    struct FakeBridge {
        measured: Size,
        log: Arc<Mutex<Vec<(NodeId, &'static str)>>>,
    }

    impl HostBridge for FakeBridge {
        fn dispatch(&mut self, node: NodeId, request: HostRequest) -> HostResponse {
            let (label, response) = match request {
                HostRequest::Measure { .. } => ("measure", HostResponse::Measured(self.measured)),
                HostRequest::Layout => ("layout", HostResponse::Done),
                HostRequest::Draw { canvas, .. } => {
                    assert_eq!(canvas, CanvasHandle::SYNTHETIC);
                    ("draw", HostResponse::Done)
                }
            };
            self.log.lock().unwrap().push((node, label));
            response
        }
    }

    #[test]
    fn explicit_axes_ignore_children() {
        let mut tree = Tree::new();
        let root = tree.create(kind0(), NodeFlags::empty());
        let child = tree.create(kind0(), NodeFlags::empty());
        tree.add_child(root, child).unwrap();
        tree.set_width(root, Dim::px(300.0));
        tree.set_height(root, Dim::px(200.0));
        tree.set_width(child, Dim::px(500.0));
        tree.set_height(child, Dim::px(500.0));

        let size = tree
            .measure(root, MeasureSpec::tight(Size::new(800.0, 600.0)))
            .unwrap();
        assert_eq!(size, Size::new(300.0, 200.0));
    }

    #[test]
    fn wrap_content_takes_largest_child_per_axis() {
        let mut tree = Tree::new();
        let root = tree.create(kind0(), NodeFlags::empty());
        let a = tree.create(kind0(), NodeFlags::empty());
        let b = tree.create(kind0(), NodeFlags::empty());
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.set_width(a, Dim::px(40.0));
        tree.set_height(a, Dim::px(90.0));
        tree.set_width(b, Dim::px(70.0));
        tree.set_height(b, Dim::px(20.0));

        let size = tree
            .measure(root, MeasureSpec::tight(Size::new(800.0, 600.0)))
            .unwrap();
        assert_eq!(size, Size::new(70.0, 90.0));
    }

    #[test]
    fn percent_resolves_against_incoming_max() {
        let mut tree = Tree::new();
        let root = tree.create(kind0(), NodeFlags::empty());
        tree.set_width(root, Dim::percent(50.0));
        tree.set_height(root, Dim::percent(25.0));

        let size = tree
            .measure(root, MeasureSpec::tight(Size::new(800.0, 600.0)))
            .unwrap();
        assert_eq!(size, Size::new(400.0, 150.0));
    }

    #[test]
    fn child_constraint_reuses_min_height() {
        // The child's max-width slot carries the parent's min height.
        let mut tree = Tree::new();
        let root = tree.create(kind0(), NodeFlags::empty());
        let child = tree.create(kind0(), NodeFlags::empty());
        tree.add_child(root, child).unwrap();
        tree.set_width(child, Dim::percent(100.0));

        let spec = MeasureSpec {
            min: Size::new(10.0, 30.0),
            max: Size::new(800.0, 600.0),
        };
        tree.measure(root, spec).unwrap();
        // 100% of the child's max width, which is the parent's min height.
        assert_eq!(tree.size(child).unwrap().width, 30.0);
    }

    #[test]
    fn delegated_measure_skips_recursion() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut tree = Tree::new();
        tree.set_host_bridge(Box::new(FakeBridge {
            measured: Size::new(123.0, 45.0),
            log: Arc::clone(&log),
        }));
        let root = tree.create(kind0(), NodeFlags::CUSTOM_MEASURE);
        let child = tree.create(kind0(), NodeFlags::empty());
        tree.add_child(root, child).unwrap();

        let size = tree
            .measure(root, MeasureSpec::tight(Size::new(800.0, 600.0)))
            .unwrap();
        assert_eq!(size, Size::new(123.0, 45.0));
        assert_eq!(tree.size(root), Some(size));
        // The child was never visited.
        assert_eq!(tree.size(child), Some(Size::ZERO));
        assert_eq!(log.lock().unwrap().as_slice(), &[(root, "measure")]);
    }

    #[test]
    fn delegated_pass_without_bridge_is_an_error() {
        let mut tree = Tree::new();
        let root = tree.create(kind0(), NodeFlags::CUSTOM_MEASURE);
        assert_eq!(
            tree.measure(root, MeasureSpec::tight(Size::new(800.0, 600.0))),
            Err(Error::HostNotConfigured)
        );
    }

    #[test]
    fn delegated_layout_keeps_previous_origin() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut tree = Tree::new();
        tree.set_host_bridge(Box::new(FakeBridge {
            measured: Size::ZERO,
            log: Arc::clone(&log),
        }));
        let root = tree.create(kind0(), NodeFlags::CUSTOM_LAYOUT);
        tree.layout(root, Frame::new(10.0, 20.0, 100.0, 100.0))
            .unwrap();
        assert_eq!(tree.origin(root), Some(Point::ZERO));
        assert_eq!(log.lock().unwrap().as_slice(), &[(root, "layout")]);
    }

    #[test]
    fn delegated_draw_receives_synthetic_canvas() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut tree = Tree::new();
        tree.set_host_bridge(Box::new(FakeBridge {
            measured: Size::ZERO,
            log: Arc::clone(&log),
        }));
        let root = tree.create(kind0(), NodeFlags::CUSTOM_DRAW);
        let child = tree.create(kind0(), NodeFlags::CUSTOM_DRAW);
        tree.add_child(root, child).unwrap();
        tree.draw(root, Frame::new(0.0, 0.0, 800.0, 600.0)).unwrap();
        // Delegated draw does not recurse.
        assert_eq!(log.lock().unwrap().as_slice(), &[(root, "draw")]);
    }

    #[test]
    fn full_frame_centers_wrapped_child() {
        let mut tree = Tree::new();
        let root = tree.create(kind0(), NodeFlags::empty());
        let child = tree.create(kind0(), NodeFlags::empty());
        tree.add_child(root, child).unwrap();
        tree.set_alignment(root, Alignment::Center);
        tree.set_width(child, Dim::px(40.0));
        tree.set_height(child, Dim::px(20.0));

        let size = tree.measure_layout_and_draw(root).unwrap();
        // Both root axes wrap to the child, so centering degenerates to zero.
        assert_eq!(size, Size::new(40.0, 20.0));
        assert_eq!(tree.origin(root), Some(Point::ZERO));
        assert_eq!(tree.origin(child), Some(Point::ZERO));
    }

    #[test]
    fn alignment_displaces_within_fixed_parent() {
        let mut tree = Tree::new();
        let root = tree.create(kind0(), NodeFlags::empty());
        let child = tree.create(kind0(), NodeFlags::empty());
        tree.add_child(root, child).unwrap();
        tree.set_width(root, Dim::px(100.0));
        tree.set_height(root, Dim::px(50.0));
        tree.set_alignment(root, Alignment::BottomEnd);
        tree.set_width(child, Dim::px(40.0));
        tree.set_height(child, Dim::px(20.0));

        tree.measure(root, MeasureSpec::tight(Size::new(800.0, 600.0)))
            .unwrap();
        tree.layout(root, Frame::new(0.0, 0.0, 100.0, 50.0)).unwrap();
        assert_eq!(tree.origin(child), Some(Point::new(60.0, 30.0)));
    }

    #[test]
    fn configured_delay_blocks_the_pass() {
        let mut tree = Tree::new();
        let kind = NodeKind(7);
        tree.set_delay(kind, DelayPhase::Measure, Duration::from_millis(5));
        let root = tree.create(kind, NodeFlags::empty());

        let start = Instant::now();
        tree.measure(root, MeasureSpec::tight(Size::new(800.0, 600.0)))
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    /// Bridge that timestamps each dispatch relative to construction.
    struct StopwatchBridge {
        start: Instant,
        seen: Arc<Mutex<Vec<Duration>>>,
    }

    impl HostBridge for StopwatchBridge {
        fn dispatch(&mut self, _node: NodeId, _request: HostRequest) -> HostResponse {
            self.seen.lock().unwrap().push(self.start.elapsed());
            HostResponse::Measured(Size::ZERO)
        }
    }

    #[test]
    fn delay_applies_after_child_recursion() {
        let delay = Duration::from_millis(150);
        let mut tree = Tree::new();
        let parent_kind = NodeKind(9);
        tree.set_delay(parent_kind, DelayPhase::Measure, delay);
        let root = tree.create(parent_kind, NodeFlags::empty());
        let child = tree.create(kind0(), NodeFlags::CUSTOM_MEASURE);
        tree.add_child(root, child).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let start = Instant::now();
        tree.set_host_bridge(Box::new(StopwatchBridge {
            start,
            seen: Arc::clone(&seen),
        }));
        tree.measure(root, MeasureSpec::tight(Size::new(800.0, 600.0)))
            .unwrap();

        // The child is visited before the parent's delay burns down.
        let child_at = seen.lock().unwrap()[0];
        assert!(child_at < delay, "child measured at {child_at:?}");
        assert!(start.elapsed() >= delay);
    }

    #[test]
    fn measure_on_stale_handle_reports_not_found() {
        let mut tree = Tree::new();
        let root = tree.create(kind0(), NodeFlags::empty());
        tree.dispose(root);
        assert_eq!(
            tree.measure(root, MeasureSpec::tight(Size::new(800.0, 600.0))),
            Err(Error::NotFound(root))
        );
    }

    #[test]
    fn frame_passes_reach_the_trace_sink() {
        use crate::trace::MemorySink;
        use core::cell::RefCell;

        let sink = Rc::new(RefCell::new(MemorySink::new()));
        let mut tree = Tree::new();
        let root = tree.create(kind0(), NodeFlags::empty());
        tree.set_trace_sink(Box::new(Rc::clone(&sink)));
        tree.measure_layout_and_draw(root).unwrap();
        let lines = sink.borrow().lines().to_vec();
        assert!(lines[0].starts_with("measureLayoutAndDraw("));
        assert!(lines.iter().any(|l| l.starts_with("measureNode(")));
        assert!(lines.iter().any(|l| l.starts_with("layoutNode(")));
        assert!(lines.iter().any(|l| l.starts_with("drawNode(")));
    }
}
