//! Tick facility advanced explicitly by the host loop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::{CancelHandle, RepeatingTask, TaskControl, TickScheduler};

struct Registration {
    interval: u32,
    countdown: u32,
    task: RepeatingTask,
    cancelled: Arc<AtomicBool>,
}

/// A [`TickScheduler`] whose clock only moves when [`advance`] is called.
///
/// Hosts with their own game loop call `advance(1)` once per tick. Tests use
/// it to step countdowns deterministically.
///
/// [`advance`]: ManualTickScheduler::advance
#[derive(Default)]
pub struct ManualTickScheduler {
    tasks: Mutex<Vec<Registration>>,
    tick: AtomicU64,
}

impl ManualTickScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock by `ticks`, running every task that is due.
    ///
    /// A newly scheduled task runs on the next tick processed, including a
    /// task scheduled by another task during this call.
    pub fn advance(&self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    fn step(&self) {
        // Tasks run outside the lock so they may schedule further tasks.
        let mut due = std::mem::take(&mut *self.lock());
        due.retain_mut(|registration| {
            if registration.cancelled.load(Ordering::SeqCst) {
                return false;
            }
            if registration.countdown == 0 {
                registration.countdown = registration.interval;
                if (registration.task)() == TaskControl::Stop {
                    return false;
                }
            }
            registration.countdown -= 1;
            !registration.cancelled.load(Ordering::SeqCst)
        });

        let mut tasks = self.lock();
        let added = std::mem::replace(&mut *tasks, due);
        tasks.extend(added);
        drop(tasks);

        self.tick.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of registered tasks that have not stopped.
    pub fn task_count(&self) -> usize {
        self.lock().len()
    }

    /// Ticks processed so far.
    pub fn current_tick(&self) -> u64 {
        self.tick.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Registration>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TickScheduler for ManualTickScheduler {
    fn schedule_repeating(
        &self,
        interval_ticks: u32,
        task: RepeatingTask,
    ) -> Box<dyn CancelHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.lock().push(Registration {
            interval: interval_ticks.max(1),
            countdown: 0,
            task,
            cancelled: Arc::clone(&cancelled),
        });
        Box::new(ManualCancelHandle { cancelled })
    }
}

impl std::fmt::Debug for ManualTickScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualTickScheduler")
            .field("tasks", &self.task_count())
            .field("tick", &self.current_tick())
            .finish()
    }
}

struct ManualCancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle for ManualCancelHandle {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}
