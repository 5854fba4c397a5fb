// Copyright 2025 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostic call-trace side channel.
//!
//! Every public entry point on [`Tree`](crate::Tree) mirrors its invocation
//! into an optional sink. This replaces the original dual-mode textual trace
//! (human-readable log plus reconstructed call source) with a single
//! append-only event sink; it is a diagnostic aid, not part of the
//! algorithmic contract.

use core::fmt;

/// Receives one record per engine entry-point invocation.
pub trait TraceSink {
    /// Record one invocation: the operation name plus formatted arguments.
    fn record(&mut self, op: &'static str, detail: fmt::Arguments<'_>);
}

/// A sink that appends formatted call lines to a vector.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded lines, in call order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl TraceSink for MemorySink {
    fn record(&mut self, op: &'static str, detail: fmt::Arguments<'_>) {
        self.lines.push(format!("{op}({detail})"));
    }
}

// Lets a test hold on to a sink it has also installed on the tree.
impl<T: TraceSink> TraceSink for std::rc::Rc<core::cell::RefCell<T>> {
    fn record(&mut self, op: &'static str, detail: fmt::Arguments<'_>) {
        self.borrow_mut().record(op, detail);
    }
}
