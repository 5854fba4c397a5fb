// Copyright 2025 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-kind busy-wait delay simulation.
//!
//! Each [`NodeKind`] carries four configurable latencies, one per lifecycle
//! phase, applied as a CPU-bound spin of bounded duration. The spins stand in
//! for real per-node work so downstream timing and scheduling tests stay
//! deterministic; they must block the calling thread, never sleep it.

use std::time::{Duration, Instant};

use crate::types::{MAX_NODE_KIND, NodeKind};

/// The lifecycle phase a delay applies to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DelayPhase {
    /// Node creation.
    Create,
    /// The measure pass.
    Measure,
    /// The layout pass.
    Layout,
    /// The draw pass.
    Draw,
}

impl DelayPhase {
    const fn slot(self) -> usize {
        match self {
            Self::Create => 0,
            Self::Measure => 1,
            Self::Layout => 2,
            Self::Draw => 3,
        }
    }
}

/// Per-kind simulated latencies, indexed by [`NodeKind`] and [`DelayPhase`].
///
/// All delays default to zero.
#[derive(Clone, Debug)]
pub struct DelayTable {
    slots: Vec<[Duration; 4]>,
}

impl Default for DelayTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayTable {
    /// Create a table with all delays zero.
    pub fn new() -> Self {
        Self {
            slots: vec![[Duration::ZERO; 4]; MAX_NODE_KIND as usize],
        }
    }

    /// Configure the delay for one kind and phase.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is at or beyond [`MAX_NODE_KIND`]. This is the same
    /// fatal precondition as node creation; out-of-range kinds are never
    /// clamped into range.
    pub fn set(&mut self, kind: NodeKind, phase: DelayPhase, delay: Duration) {
        assert!(
            kind.raw() < MAX_NODE_KIND,
            "node kind {} out of range (max {MAX_NODE_KIND})",
            kind.raw()
        );
        self.slots[kind.raw() as usize][phase.slot()] = delay;
    }

    /// The configured delay for one kind and phase.
    pub fn get(&self, kind: NodeKind, phase: DelayPhase) -> Duration {
        self.slots[kind.raw() as usize][phase.slot()]
    }
}

/// Block the calling thread for `duration` of CPU time.
///
/// A bounded spin on [`Instant`], not a sleep. `spin_loop` keeps the loop
/// from being optimized away while hinting the CPU.
pub fn busy_wait(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    let start = Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}
