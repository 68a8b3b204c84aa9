//! Countdown scheduling.
//!
//! This module drives countdowns on a host-provided periodic tick:
//! - `TickScheduler`: the host's "run this every N ticks" facility
//! - `TokioTickScheduler`: tick facility backed by `tokio::time::interval`
//! - `ManualTickScheduler`: tick facility advanced by the host's own loop
//! - `CountdownDriver`: the per-countdown state machine
//! - `TimerScheduler`: entry point that wires requests, sinks and drivers
//!
//! Every countdown owns its state exclusively and is invoked serially by
//! the tick facility, so no locking is needed on the tick path.

mod driver;
mod feed;
mod handle;
mod manual;
mod runtime;
mod timer;

pub use driver::{CompletionAction, CountdownDriver, CountdownRequest};
pub use feed::{
    CompletableText, FADE_OUT_TICKS, OVERLAY_FEED_CHECK_TICKS, STATIC_OVERLAY_CHECK_TICKS,
    STATIC_OVERLAY_REFRESH_TICKS,
};
pub use handle::{CountdownHandle, CountdownStatus};
pub use manual::ManualTickScheduler;
pub use runtime::TokioTickScheduler;
pub use timer::TimerScheduler;

/// Returned by a repeating task to keep or drop its registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    Continue,
    Stop,
}

/// A task invoked repeatedly by a [`TickScheduler`].
pub type RepeatingTask = Box<dyn FnMut() -> TaskControl + Send + 'static>;

/// Deregisters a repeating task.
pub trait CancelHandle: Send + Sync {
    /// Stops future invocations. Does not interrupt a running invocation.
    fn cancel(&self);
}

/// The host's periodic scheduling facility.
///
/// A task is first invoked as soon as possible (delay 0) and then every
/// `interval_ticks` host ticks, until it returns [`TaskControl::Stop`] or
/// its handle is cancelled. Invocations of one task never overlap.
pub trait TickScheduler: Send + Sync {
    fn schedule_repeating(
        &self,
        interval_ticks: u32,
        task: RepeatingTask,
    ) -> Box<dyn CancelHandle>;
}

// ============================================================================
// Cadence
// ============================================================================

/// Accumulates host ticks and reports when an interval has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cadence {
    interval: u32,
    elapsed: u32,
}

impl Cadence {
    pub(crate) fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            elapsed: 0,
        }
    }

    /// Adds `ticks`; returns true once the interval is reached.
    pub(crate) fn advance(&mut self, ticks: u32) -> bool {
        self.elapsed = self.elapsed.saturating_add(ticks);
        if self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            true
        } else {
            false
        }
    }

    pub(crate) fn reset(&mut self) {
        self.elapsed = 0;
    }
}

pub(crate) fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}
