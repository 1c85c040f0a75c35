// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cooperative cancellation and the blocking run loop.
//!
//! A [`RunToken`] is a cloneable handle to one shared stop flag. The quit key,
//! a toplevel close request and the interrupt signal all raise it;
//! [`run_until_stopped`] checks it once per dispatch iteration, so a stop
//! requested while a handler runs takes effect before the next dispatch
//! begins and never interrupts a handler midway.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

/// Shared stop flag for the run loop.
#[derive(Clone, Debug)]
pub struct RunToken {
    stop: Arc<AtomicBool>,
}

impl RunToken {
    /// Creates a token in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the run loop should keep going.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.stop.load(Ordering::Acquire)
    }

    /// Asks the run loop to stop after the current iteration.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Returns the underlying stop flag for async-signal-safe writers.
    ///
    /// Storing `true` is equivalent to [`request_stop`](Self::request_stop).
    #[must_use]
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }
}

impl Default for RunToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Why [`run_until_stopped`] returned.
#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome<E> {
    /// A stop was requested through the token.
    Stopped,
    /// The dispatch primitive failed; treated as a request to stop.
    Disconnected(E),
}

impl<E> RunOutcome<E> {
    /// Whether the loop ended through the token.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Calls `dispatch` until `token` requests a stop or `dispatch` fails.
///
/// `dispatch` is the blocking event pump; it is the only suspension point.
/// The token is checked before every call, including the first.
pub fn run_until_stopped<E>(
    token: &RunToken,
    mut dispatch: impl FnMut() -> Result<usize, E>,
) -> RunOutcome<E> {
    let mut iterations: u64 = 0;
    while token.is_running() {
        if let Err(err) = dispatch() {
            tracing::debug!(iterations, "dispatch failed, leaving run loop");
            return RunOutcome::Disconnected(err);
        }
        iterations += 1;
    }
    tracing::debug!(iterations, "stop requested, leaving run loop");
    RunOutcome::Stopped
}
