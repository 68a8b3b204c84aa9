//! Caller-side handle to a running countdown.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use super::CancelHandle;
use crate::sink::BarId;

/// Lifecycle of a countdown. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStatus {
    Running,
    Completed,
    Cancelled,
}

impl CountdownStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CountdownStatus::Running)
    }

    fn as_u8(self) -> u8 {
        match self {
            CountdownStatus::Running => 0,
            CountdownStatus::Completed => 1,
            CountdownStatus::Cancelled => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => CountdownStatus::Running,
            1 => CountdownStatus::Completed,
            _ => CountdownStatus::Cancelled,
        }
    }
}

/// State shared between a driver and its handle.
#[derive(Debug)]
pub(crate) struct CountdownShared {
    status: AtomicU8,
    cancel_requested: AtomicBool,
}

impl CountdownShared {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            status: AtomicU8::new(CountdownStatus::Running.as_u8()),
            cancel_requested: AtomicBool::new(false),
        })
    }

    pub(crate) fn status(&self) -> CountdownStatus {
        CountdownStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    /// Moves `Running` to `terminal`. Returns false if already terminal.
    pub(crate) fn finish(&self, terminal: CountdownStatus) -> bool {
        self.status
            .compare_exchange(
                CountdownStatus::Running.as_u8(),
                terminal.as_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    pub(crate) fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    pub(crate) fn cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }
}

/// Handle returned when a countdown is scheduled.
///
/// Dropping the handle does not stop the countdown.
pub struct CountdownHandle {
    id: Uuid,
    bar: Option<BarId>,
    shared: Arc<CountdownShared>,
    registration: Box<dyn CancelHandle>,
}

impl CountdownHandle {
    pub(crate) fn new(
        id: Uuid,
        shared: Arc<CountdownShared>,
        registration: Box<dyn CancelHandle>,
    ) -> Self {
        Self {
            id,
            bar: None,
            shared,
            registration,
        }
    }

    pub(crate) fn with_bar(mut self, bar: BarId) -> Self {
        self.bar = Some(bar);
        self
    }

    /// Identifier used in log events for this countdown.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The progress bar this countdown updates, matching the `bar` of its
    /// [`DisplayCommand`](crate::sink::DisplayCommand)s. `None` for overlays.
    pub fn bar_id(&self) -> Option<BarId> {
        self.bar
    }

    pub fn status(&self) -> CountdownStatus {
        self.shared.status()
    }

    pub fn is_finished(&self) -> bool {
        self.status().is_terminal()
    }

    /// Requests cancellation. Observed at the start of the next tick, which
    /// clears the notification and stops without running the completion
    /// action. Idempotent; no effect once the countdown has finished.
    pub fn cancel(&self) {
        self.shared.request_cancel();
    }

    /// Cancels and deregisters immediately, without waiting for a tick.
    ///
    /// The notification is left for the client to fade or for the host to
    /// remove.
    pub fn abort(&self) {
        self.shared.request_cancel();
        if self.shared.finish(CountdownStatus::Cancelled) {
            tracing::debug!(countdown = %self.id, "countdown aborted");
        }
        self.registration.cancel();
    }
}

impl std::fmt::Debug for CountdownHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownHandle")
            .field("id", &self.id)
            .field("bar", &self.bar)
            .field("status", &self.status())
            .finish()
    }
}
