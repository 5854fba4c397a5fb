// Copyright 2025 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the node tree: identifiers, kinds, flags, dimensions,
//! alignment, and the pass buffers.

use kurbo::{Point, Size, Vec2};

/// Identifier for a node in the tree.
///
/// This is the opaque handle that crosses the engine boundary. It consists of
/// a slot index and a generation counter.
///
/// ## Semantics
///
/// - On create, a fresh slot is allocated with generation `1`.
/// - On dispose, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// ### Liveness
///
/// Use [`Tree::is_alive`](crate::Tree::is_alive) to check whether a `NodeId` still refers to a live node.
/// Stale `NodeId`s never alias a different live node because the generation must match.
/// Operations on a stale handle surface [`Error::NotFound`] rather than touching reused state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Exclusive upper bound for [`NodeKind`] raw values.
///
/// Creating a node or configuring delays with a kind at or beyond this bound
/// is a fatal precondition violation (panic), never a recoverable error.
pub const MAX_NODE_KIND: u32 = 128;

/// Small integer tag identifying a node kind.
///
/// Indexes the per-kind [`DelayTable`](crate::DelayTable) and derives the
/// default display name shown by [`Tree::dump`](crate::Tree::dump).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeKind(pub u32);

impl NodeKind {
    /// The raw tag value.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

bitflags::bitflags! {
    /// Per-node flags selecting host delegation for individual passes.
    ///
    /// A delegated pass is computed entirely by the registered
    /// [`HostBridge`](crate::HostBridge); the engine does not recurse into
    /// children for that pass.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Measurement is delegated to the host.
        const CUSTOM_MEASURE = 0b0000_0001;
        /// Layout is delegated to the host.
        const CUSTOM_LAYOUT  = 0b0000_0010;
        /// Drawing is delegated to the host.
        const CUSTOM_DRAW    = 0b0000_0100;
    }
}

/// Unit of a declared dimension.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum DimUnit {
    /// Device pixels (scale factor currently fixed at 1).
    Px,
    /// Percentage of the parent-provided length on the same axis.
    Percent,
    /// Unspecified: wrap-content sizing derived from children.
    #[default]
    Auto,
}

/// A declared length: value plus unit.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Dim {
    /// Declared value, interpreted per [`DimUnit`].
    pub value: f64,
    /// Unit selecting how `value` is resolved.
    pub unit: DimUnit,
}

impl Dim {
    /// Unspecified dimension (wrap-content).
    pub const AUTO: Self = Self {
        value: 0.0,
        unit: DimUnit::Auto,
    };

    /// A pixel dimension.
    pub const fn px(value: f64) -> Self {
        Self {
            value,
            unit: DimUnit::Px,
        }
    }

    /// A percentage dimension.
    pub const fn percent(value: f64) -> Self {
        Self {
            value,
            unit: DimUnit::Percent,
        }
    }
}

/// Resolve a declared length against a parent-provided length.
///
/// - `Px` returns the raw value (scale factor currently fixed at 1).
/// - `Percent` returns `parent / 100 * value`.
/// - `Auto` passes the raw value through unscaled. Known placeholder
///   inherited from the original engine; preserved, not corrected.
pub fn resolve_len(parent: f64, dim: Dim) -> f64 {
    match dim.unit {
        DimUnit::Px => dim.value,
        DimUnit::Percent => parent / 100.0 * dim.value,
        DimUnit::Auto => dim.value,
    }
}

/// Nine-way alignment of children within a node.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Alignment {
    /// Top-left corner.
    #[default]
    TopStart,
    /// Top edge, horizontally centered.
    Top,
    /// Top-right corner.
    TopEnd,
    /// Left edge, vertically centered.
    Start,
    /// Both axes centered.
    Center,
    /// Right edge, vertically centered.
    End,
    /// Bottom-left corner.
    BottomStart,
    /// Bottom edge, horizontally centered.
    Bottom,
    /// Bottom-right corner.
    BottomEnd,
}

impl Alignment {
    /// Displacement of a child of size `child` placed within a container of
    /// size `container`.
    pub fn displacement(self, container: Size, child: Size) -> Vec2 {
        let dw = container.width - child.width;
        let dh = container.height - child.height;
        let (dx, dy) = match self {
            Self::TopStart => (0.0, 0.0),
            Self::Top => (dw / 2.0, 0.0),
            Self::TopEnd => (dw, 0.0),
            Self::Start => (0.0, dh / 2.0),
            Self::Center => (dw / 2.0, dh / 2.0),
            Self::End => (dw, dh / 2.0),
            Self::BottomStart => (0.0, dh),
            Self::Bottom => (dw / 2.0, dh),
            Self::BottomEnd => (dw, dh),
        };
        Vec2::new(dx, dy)
    }
}

/// Measure-pass constraints: minimum and maximum sizes.
///
/// The engine rendition of the four-float constraint buffer
/// `{min_w, min_h, max_w, max_h}` handed in by the host.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MeasureSpec {
    /// Minimum size.
    pub min: Size,
    /// Maximum size.
    pub max: Size,
}

impl MeasureSpec {
    /// A spec whose minimum and maximum are both `size`.
    pub fn tight(size: Size) -> Self {
        Self {
            min: size,
            max: size,
        }
    }
}

/// Layout- and draw-pass buffer: an origin plus an extent.
///
/// The engine rendition of the four-float `{x, y, w, h}` buffer.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// Absolute position.
    pub origin: Point,
    /// Extent.
    pub size: Size,
}

impl Frame {
    /// The all-zero frame.
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    /// Construct a frame from scalars.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }
}

/// Errors surfaced by tree mutation and the layout passes.
///
/// Fatal preconditions (a [`NodeKind`] at or beyond [`MAX_NODE_KIND`]) panic
/// instead, and unregistered callback slots are silent no-ops, not errors.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// A structural reference named a missing or stale node.
    #[error("no live node for {0:?}")]
    NotFound(NodeId),
    /// A node was asked to become its own child.
    #[error("cannot link {0:?} under itself")]
    SelfParent(NodeId),
    /// A delegated pass ran with no host bridge registered.
    #[error("delegated pass invoked before a host bridge was registered")]
    HostNotConfigured,
}
