// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic clock reads for animation time.
//!
//! Compositor frame timestamps only have a meaningful difference, so the
//! render callback additionally gets the time elapsed since window creation,
//! read from `CLOCK_MONOTONIC`.

use std::time::Duration;

use rustix::time::{ClockId, Timespec, clock_gettime};

/// Returns the current `CLOCK_MONOTONIC` reading.
#[must_use]
pub fn now() -> Duration {
    timespec_to_duration(clock_gettime(ClockId::Monotonic))
}

fn timespec_to_duration(timespec: Timespec) -> Duration {
    let seconds = u64::try_from(timespec.tv_sec).unwrap_or(0);
    let nanos = u32::try_from(timespec.tv_nsec)
        .unwrap_or(0)
        .min(999_999_999);
    Duration::new(seconds, nanos)
}

/// Elapsed-time source started at window creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameClock {
    start: Duration,
}

impl FrameClock {
    /// Starts the clock now.
    #[must_use]
    pub fn start() -> Self {
        Self::starting_at(now())
    }

    const fn starting_at(start: Duration) -> Self {
        Self { start }
    }

    /// Time since [`start`](Self::start).
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(now())
    }

    fn elapsed_at(&self, now: Duration) -> Duration {
        now.saturating_sub(self.start)
    }
}
