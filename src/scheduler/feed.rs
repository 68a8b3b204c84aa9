//! Overlay text that is not tied to a countdown.
//!
//! Two sources are supported:
//! - fixed text shown for a duration, re-pushed so it never fades early
//! - a [`CompletableText`] buffer that other code keeps updating until it
//!   marks the buffer complete

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use super::handle::{CountdownShared, CountdownStatus};
use super::TaskControl;
use crate::sink::{NotificationSink, OverlayTextSink};

/// Host ticks before the end of a static overlay at which it is pushed for
/// the last time. Clients fade overlay text out over about this long.
pub const FADE_OUT_TICKS: u64 = 60;

/// Host ticks between two checks of a static overlay.
pub const STATIC_OVERLAY_CHECK_TICKS: u32 = 20;

/// Host ticks between re-pushes of a static overlay.
pub const STATIC_OVERLAY_REFRESH_TICKS: u32 = 40;

/// Host ticks between two checks of an updating overlay feed.
pub const OVERLAY_FEED_CHECK_TICKS: u32 = 2;

// ============================================================================
// CompletableText
// ============================================================================

#[derive(Debug, Default)]
struct TextBuffer {
    text: Mutex<String>,
    completed: AtomicBool,
}

/// A shared text buffer that can be marked complete.
///
/// Clones share the same buffer. Once complete, feeds reading it stop on
/// their next check; writes after completion are kept but no longer shown.
#[derive(Debug, Clone, Default)]
pub struct CompletableText {
    inner: Arc<TextBuffer>,
}

impl CompletableText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TextBuffer {
                text: Mutex::new(text.into()),
                completed: AtomicBool::new(false),
            }),
        }
    }

    /// Replaces the text.
    pub fn set(&self, text: impl Into<String>) {
        *self.lock() = text.into();
    }

    pub fn push_str(&self, text: &str) {
        self.lock().push_str(text);
    }

    /// Returns a copy of the current text.
    pub fn text(&self) -> String {
        self.lock().clone()
    }

    /// Marks the buffer complete. Idempotent.
    pub fn complete(&self) {
        self.inner.completed.store(true, Ordering::SeqCst);
    }

    pub fn is_completed(&self) -> bool {
        self.inner.completed.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        self.inner.text.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// OverlayFeed
// ============================================================================

enum FeedSource {
    Fixed { text: String, remaining_ticks: u64 },
    Live(CompletableText),
}

impl FeedSource {
    fn current_text(&self) -> String {
        match self {
            FeedSource::Fixed { text, .. } => text.clone(),
            FeedSource::Live(buffer) => buffer.text(),
        }
    }
}

/// Repeating task that keeps one overlay text visible.
pub(crate) struct OverlayFeed {
    id: Uuid,
    sink: OverlayTextSink,
    source: FeedSource,
    check_interval: u32,
    refresh_interval: u32,
    until_refresh: u32,
    shared: Arc<CountdownShared>,
    started: bool,
}

impl OverlayFeed {
    /// Shows `text` for `duration_ticks` host ticks.
    pub(crate) fn fixed(sink: OverlayTextSink, text: String, duration_ticks: u64) -> Self {
        Self::new(
            sink,
            FeedSource::Fixed {
                text,
                remaining_ticks: duration_ticks,
            },
            STATIC_OVERLAY_CHECK_TICKS,
            STATIC_OVERLAY_REFRESH_TICKS,
        )
    }

    /// Shows `buffer` until it is completed, re-pushing every
    /// `refresh_ticks` host ticks.
    pub(crate) fn live(sink: OverlayTextSink, buffer: CompletableText, refresh_ticks: u32) -> Self {
        Self::new(
            sink,
            FeedSource::Live(buffer),
            OVERLAY_FEED_CHECK_TICKS,
            refresh_ticks,
        )
    }

    fn new(
        sink: OverlayTextSink,
        source: FeedSource,
        check_interval: u32,
        refresh_interval: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sink,
            source,
            check_interval,
            refresh_interval,
            until_refresh: refresh_interval,
            shared: CountdownShared::new(),
            started: false,
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn check_interval(&self) -> u32 {
        self.check_interval
    }

    pub(crate) fn shared(&self) -> Arc<CountdownShared> {
        Arc::clone(&self.shared)
    }

    pub(crate) fn run_once(&mut self) -> TaskControl {
        if self.shared.status().is_terminal() {
            return TaskControl::Stop;
        }
        if self.shared.cancel_requested() {
            if self.shared.finish(CountdownStatus::Cancelled) {
                self.sink.clear();
                tracing::debug!(feed = %self.id, "overlay feed cancelled");
            }
            return TaskControl::Stop;
        }

        let fresh = !self.started;
        if fresh {
            self.started = true;
            self.push();
        }

        let check_interval = u64::from(self.check_interval);
        let expired = match &mut self.source {
            FeedSource::Fixed {
                remaining_ticks, ..
            } => {
                if *remaining_ticks <= FADE_OUT_TICKS {
                    true
                } else {
                    *remaining_ticks -= check_interval.min(*remaining_ticks);
                    false
                }
            }
            FeedSource::Live(buffer) => buffer.is_completed(),
        };
        if expired {
            // A fixed overlay gets one last push so the fade ends on time.
            if !fresh && matches!(self.source, FeedSource::Fixed { .. }) {
                self.push();
            }
            self.finish();
            return TaskControl::Stop;
        }

        if self.until_refresh == 0 {
            self.push();
            self.until_refresh = self.refresh_interval;
        }
        self.until_refresh = self.until_refresh.saturating_sub(self.check_interval);
        TaskControl::Continue
    }

    fn push(&mut self) {
        let text = self.source.current_text();
        self.sink.push_text(text);
    }

    fn finish(&mut self) {
        if self.shared.finish(CountdownStatus::Completed) {
            tracing::debug!(feed = %self.id, "overlay feed finished");
        }
    }
}
