// Copyright 2025 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cancellable frame clock driving per-frame callbacks on a worker thread.

use std::io;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Sender, bounded};

/// The default frame period, approximating a 60 Hz vsync.
pub const VSYNC_PERIOD: Duration = Duration::from_millis(16);

/// Periodic callback driver on a dedicated worker thread.
///
/// The callback runs once per period until the clock is stopped. Stopping is
/// cooperative: [`FrameClock::stop`] (or drop) signals the worker over a
/// channel and joins it, so no thread outlives the clock.
pub struct FrameClock {
    stop: Sender<()>,
    worker: Option<thread::JoinHandle<()>>,
}

impl core::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameClock")
            .field("running", &self.worker.is_some())
            .finish_non_exhaustive()
    }
}

impl FrameClock {
    /// Start a clock invoking `callback` every `period`.
    ///
    /// Returns an error only if the worker thread cannot be spawned.
    pub fn start<F>(period: Duration, mut callback: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (stop, ticks) = bounded::<()>(1);
        let worker = thread::Builder::new()
            .name("espalier-frame-clock".into())
            .spawn(move || {
                loop {
                    match ticks.recv_timeout(period) {
                        Err(crossbeam_channel::RecvTimeoutError::Timeout) => callback(),
                        // Stop signal or sender dropped.
                        _ => break,
                    }
                }
            })?;
        tracing::debug!(target: "espalier_dispatch::frame_clock", ?period, "started");
        Ok(Self {
            stop,
            worker: Some(worker),
        })
    }

    /// Start a clock at the default [`VSYNC_PERIOD`].
    pub fn start_vsync<F>(callback: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        Self::start(VSYNC_PERIOD, callback)
    }

    /// Returns true until [`FrameClock::stop`] has run.
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Stop the clock and join the worker thread. Idempotent.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        // Ignore send failure: the worker already exited.
        let _ = self.stop.send(());
        let _ = worker.join();
        tracing::debug!(target: "espalier_dispatch::frame_clock", "stopped");
    }
}

impl Drop for FrameClock {
    fn drop(&mut self) {
        self.stop();
    }
}
