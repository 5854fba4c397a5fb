// Copyright 2025 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host callback bridge: typed delegation of measure/layout/draw to the host
//! runtime.
//!
//! ## Overview
//!
//! The original interop surface multiplexed every delegated pass through one
//! function pointer taking an opcode plus a flat float/int argument array.
//! Here that is a tagged request/response pair dispatched through the
//! [`HostBridge`] trait, so the host side pattern-matches instead of decoding
//! argument slots.
//!
//! Exactly one bridge may be registered at a time via
//! [`Tree::set_host_bridge`](crate::Tree::set_host_bridge). Running a
//! delegated pass with no bridge registered surfaces
//! [`Error::HostNotConfigured`](crate::Error::HostNotConfigured) instead of a
//! null call.

use kurbo::Size;

use crate::types::{Frame, MeasureSpec, NodeId};

/// Opaque handle to a host-side canvas object.
///
/// The engine never draws; when a draw pass is delegated it passes this fixed
/// placeholder, which the original wire format carried as two 32-bit halves.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CanvasHandle(pub u64);

impl CanvasHandle {
    /// The synthetic placeholder handle used for delegated draws.
    pub const SYNTHETIC: Self = Self((42 << 32) | 42);

    /// High 32 bits, as carried on the original wire.
    pub const fn hi(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Low 32 bits, as carried on the original wire.
    pub const fn lo(self) -> u32 {
        self.0 as u32
    }
}

/// A delegated pass request, dispatched to the host.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum HostRequest {
    /// Delegated measurement: the host owns the entire subtree's sizing and
    /// must report the node's size.
    Measure {
        /// Constraints the node was measured with.
        spec: MeasureSpec,
    },
    /// Delegated layout. The original engine passes zeros; the host positions
    /// the subtree itself.
    Layout,
    /// Delegated drawing of the node's subtree.
    Draw {
        /// Synthetic canvas handle.
        canvas: CanvasHandle,
        /// Region handed to the draw pass.
        region: Frame,
    },
}

/// The host's answer to a [`HostRequest`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum HostResponse {
    /// Size reported for a [`HostRequest::Measure`].
    Measured(Size),
    /// Acknowledgement for requests with no payload.
    Done,
}

/// Host-side dispatcher for delegated passes.
///
/// Implemented by the host runtime and registered on the tree; the engine
/// calls it synchronously from within the pass recursion.
pub trait HostBridge {
    /// Handle one delegated request for `node`.
    fn dispatch(&mut self, node: NodeId, request: HostRequest) -> HostResponse;
}
