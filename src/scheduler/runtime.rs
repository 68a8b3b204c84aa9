//! Tick facility backed by the tokio timer.

use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use super::{CancelHandle, RepeatingTask, TaskControl, TickScheduler};

/// Runs each repeating task on its own `tokio::time::interval`.
///
/// One host tick lasts `tick`. Missed ticks are skipped, not replayed.
#[derive(Debug, Clone)]
pub struct TokioTickScheduler {
    runtime: Handle,
    tick: Duration,
}

impl TokioTickScheduler {
    pub fn new(runtime: Handle, tick: Duration) -> Self {
        Self { runtime, tick }
    }

    /// Uses the runtime of the calling context.
    ///
    /// Returns `None` outside of a tokio runtime.
    pub fn try_current(tick: Duration) -> Option<Self> {
        Handle::try_current().ok().map(|runtime| Self::new(runtime, tick))
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }
}

impl TickScheduler for TokioTickScheduler {
    fn schedule_repeating(
        &self,
        interval_ticks: u32,
        mut task: RepeatingTask,
    ) -> Box<dyn CancelHandle> {
        let period = self.tick.saturating_mul(interval_ticks.max(1));
        let join = self.runtime.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if task() == TaskControl::Stop {
                    break;
                }
            }
        });
        Box::new(TokioCancelHandle(join.abort_handle()))
    }
}

struct TokioCancelHandle(AbortHandle);

impl CancelHandle for TokioCancelHandle {
    fn cancel(&self) {
        self.0.abort();
    }
}
