//! Per-countdown tick state machine.
//!
//! ```text
//!            tick (remaining > 0)
//!           ┌──────────┐
//!           ▼          │
//!        ┌─────────────┴┐  tick, remaining <= 0   ┌───────────┐
//!  ────▶ │   Running    ├────────────────────────▶│ Completed │
//!        └──────┬───────┘                         └───────────┘
//!               │ cancel observed                 ┌───────────┐
//!               └────────────────────────────────▶│ Cancelled │
//!                                                 └───────────┘
//! ```
//!
//! A cancel request is checked at the start of every invocation, before the
//! countdown is decremented. A countdown that already expired on an earlier
//! tick stays `Completed`; a cancel observed on the tick that would have
//! expired it wins.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use super::handle::{CountdownShared, CountdownStatus};
use super::{gcd, Cadence, TaskControl};
use crate::countdown::CountdownState;
use crate::error::TimerError;
use crate::placeholder::{substitute, CustomPlaceholders, Placeholder, PlaceholderContext};
use crate::render::ProgressRenderer;
use crate::sink::{CompletionStyle, Frame, NotificationSink};

/// Action run once when a countdown expires naturally.
pub type CompletionAction = Box<dyn FnOnce() + Send + 'static>;

// ============================================================================
// CountdownRequest
// ============================================================================

/// Everything a caller specifies for one countdown.
pub struct CountdownRequest {
    /// Duration in time units.
    pub total: f64,
    /// Title template; see [`crate::placeholder`].
    pub title: String,
    pub placeholders: CustomPlaceholders,
    pub on_complete: Option<CompletionAction>,
}

impl CountdownRequest {
    pub fn new(total: f64, title: impl Into<String>) -> Self {
        Self {
            total,
            title: title.into(),
            placeholders: CustomPlaceholders::new(),
            on_complete: None,
        }
    }

    /// Adds a custom placeholder.
    #[must_use]
    pub fn with_placeholder(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.placeholders.insert(token, value);
        self
    }

    #[must_use]
    pub fn with_placeholders(mut self, placeholders: CustomPlaceholders) -> Self {
        self.placeholders = placeholders;
        self
    }

    /// Sets the action to run when the countdown expires.
    #[must_use]
    pub fn on_complete(mut self, action: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(action));
        self
    }
}

impl fmt::Debug for CountdownRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownRequest")
            .field("total", &self.total)
            .field("title", &self.title)
            .field("placeholders", &self.placeholders)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

// ============================================================================
// CountdownDriver
// ============================================================================

/// Drives one countdown: decrement, render, substitute, push.
pub struct CountdownDriver<S> {
    id: Uuid,
    state: CountdownState,
    renderer: ProgressRenderer,
    title: String,
    placeholders: CustomPlaceholders,
    sink: S,
    on_complete: Option<CompletionAction>,
    shared: Arc<CountdownShared>,
    step: Cadence,
    resend: Option<Cadence>,
    invocation_interval: u32,
    started: bool,
}

impl<S: NotificationSink> CountdownDriver<S> {
    /// Creates a driver that steps the countdown every `step_interval` host
    /// ticks.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidDuration`] if the request's duration is
    /// not positive.
    pub fn new(
        request: CountdownRequest,
        renderer: ProgressRenderer,
        sink: S,
        step_interval: u32,
    ) -> Result<Self, TimerError> {
        let state = CountdownState::new(request.total)?;
        let step_interval = step_interval.max(1);
        let resend_interval = sink
            .resend_interval()
            .filter(|interval| *interval < step_interval);
        let invocation_interval = match resend_interval {
            Some(resend) => gcd(step_interval, resend),
            None => step_interval,
        };

        Ok(Self {
            id: Uuid::new_v4(),
            state,
            renderer,
            title: request.title,
            placeholders: request.placeholders,
            sink,
            on_complete: request.on_complete,
            shared: CountdownShared::new(),
            step: Cadence::new(step_interval),
            resend: resend_interval.map(Cadence::new),
            invocation_interval,
            started: false,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Host ticks between two invocations of [`run_once`](Self::run_once).
    pub fn invocation_interval(&self) -> u32 {
        self.invocation_interval
    }

    pub fn status(&self) -> CountdownStatus {
        self.shared.status()
    }

    pub fn state(&self) -> &CountdownState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub(crate) fn shared(&self) -> Arc<CountdownShared> {
        Arc::clone(&self.shared)
    }

    /// Requests cancellation; observed by the next [`run_once`](Self::run_once).
    pub fn request_cancel(&self) {
        self.shared.request_cancel();
    }

    /// One invocation by the host tick facility.
    ///
    /// The first invocation shows the full bar. Later invocations step the
    /// countdown when the step cadence is due and otherwise re-send the last
    /// frame when the sink's re-send cadence is due.
    pub fn run_once(&mut self) -> TaskControl {
        if self.shared.status().is_terminal() {
            return TaskControl::Stop;
        }
        if self.shared.cancel_requested() {
            self.cancel_now();
            return TaskControl::Stop;
        }

        if !self.started {
            self.started = true;
            tracing::debug!(countdown = %self.id, total = self.state.total(), "countdown started");
            self.push_current();
            return TaskControl::Continue;
        }

        if self.step.advance(self.invocation_interval) {
            if let Some(resend) = self.resend.as_mut() {
                resend.reset();
            }
            return self.step_once();
        }

        if let Some(resend) = self.resend.as_mut() {
            if resend.advance(self.invocation_interval) {
                self.sink.resend();
            }
        }
        TaskControl::Continue
    }

    fn step_once(&mut self) -> TaskControl {
        let tick = self.state.tick();
        if tick.crossed {
            self.complete();
            return TaskControl::Stop;
        }
        if tick.completed {
            return TaskControl::Stop;
        }
        self.push_current();
        TaskControl::Continue
    }

    fn complete(&mut self) {
        if !self.shared.finish(CountdownStatus::Completed) {
            return;
        }
        match self.sink.completion_style() {
            CompletionStyle::Clear => self.sink.clear(),
            CompletionStyle::PushFinal => self.push_current(),
        }
        tracing::info!(countdown = %self.id, "countdown completed");
        if let Some(action) = self.on_complete.take() {
            action();
        }
    }

    fn cancel_now(&mut self) {
        self.state.cancel();
        self.on_complete = None;
        if self.shared.finish(CountdownStatus::Cancelled) {
            self.sink.clear();
            tracing::info!(
                countdown = %self.id,
                remaining = self.state.remaining(),
                "countdown cancelled"
            );
        }
    }

    fn push_current(&mut self) {
        match self.build_frame() {
            Ok(frame) => {
                self.sink.push(&frame);
            }
            Err(e) => {
                tracing::warn!(countdown = %self.id, error = %e, "skipping countdown frame");
            }
        }
    }

    /// Renders the current countdown value into a frame.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::MissingContext`] if the title needs a viewer
    /// list the sink does not have.
    pub fn build_frame(&self) -> Result<Frame, TimerError> {
        let progress = self.renderer.render_state(&self.state);

        let mut context = PlaceholderContext::from_state(&self.state);
        if Placeholder::PlayersShown.appears_in(&self.title) {
            if let Some(viewers) = self.sink.viewers() {
                context = context.with_viewers(viewers);
            }
        }
        let title = substitute(&self.title, &context, &self.placeholders)?;
        let text = self.renderer.compose(&progress, &title);

        Ok(Frame {
            fraction: progress.fraction,
            title,
            text,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{Audience, MockDisplay, OverlayTextSink, ProgressBarSink};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let clone = Arc::clone(&count);
        (count, move || {
            clone.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn bar_driver(
        display: &MockDisplay,
        request: CountdownRequest,
    ) -> CountdownDriver<ProgressBarSink> {
        let sink = ProgressBarSink::new(
            Audience::Broadcast,
            display.transport(),
            display.registry(),
        );
        CountdownDriver::new(request, ProgressRenderer::default(), sink, 1).unwrap()
    }

    fn run_until_stopped<S: NotificationSink>(driver: &mut CountdownDriver<S>) -> usize {
        let mut invocations = 0;
        while driver.run_once() == TaskControl::Continue {
            invocations += 1;
            assert!(invocations < 100_000, "driver never stopped");
        }
        invocations + 1
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn test_invalid_duration_rejected() {
            let display = MockDisplay::new();
            let sink = ProgressBarSink::new(
                Audience::Broadcast,
                display.transport(),
                display.registry(),
            );
            let result = CountdownDriver::new(
                CountdownRequest::new(0.0, "x"),
                ProgressRenderer::default(),
                sink,
                2,
            );
            assert!(matches!(result, Err(TimerError::InvalidDuration(_))));
        }

        #[test]
        fn test_first_invocation_shows_full_bar() {
            let display = MockDisplay::new();
            let mut driver = bar_driver(&display, CountdownRequest::new(1.0, "%time_left%"));

            assert_eq!(driver.run_once(), TaskControl::Continue);
            assert_eq!(display.bar_updates(), vec![(1.0, "1.0".to_string())]);
            assert_eq!(driver.state().remaining(), 1.0);
        }

        #[test]
        fn test_completes_once_and_clears_bar() {
            let display = MockDisplay::new();
            let (count, action) = counter();
            let mut driver = bar_driver(
                &display,
                CountdownRequest::new(1.0, "%time_left%").on_complete(action),
            );

            // initial frame + 10 steps
            assert_eq!(run_until_stopped(&mut driver), 11);
            assert_eq!(driver.status(), CountdownStatus::Completed);
            assert_eq!(count.load(Ordering::SeqCst), 1);

            let updates = display.bar_updates();
            assert_eq!(updates.len(), 10);
            assert_eq!(updates.last(), Some(&(0.1, "0.1".to_string())));
            assert_eq!(display.clear_count(), 1);

            assert_eq!(driver.run_once(), TaskControl::Stop);
            assert_eq!(count.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn test_overlay_pushes_final_frame_on_completion() {
            let display = MockDisplay::new();
            let alex = display.add_recipient("Alex");
            let sink = OverlayTextSink::new(alex, display.transport(), display.registry());
            let mut driver = CountdownDriver::new(
                CountdownRequest::new(0.2, "%time_left%"),
                ProgressRenderer::default().with_notches(2),
                sink,
                1,
            )
            .unwrap();

            run_until_stopped(&mut driver);
            assert_eq!(
                display.overlay_texts(&alex),
                vec![
                    "§4§l[§c||§4§l] §7-§r 0.2",
                    "§4§l[§c|§7|§4§l] §7-§r 0.1",
                    "§4§l[§7||§4§l] §7-§r 0.0",
                ]
            );
        }
    }

    mod cancel_tests {
        use super::*;

        #[test]
        fn test_cancel_stops_without_completion_action() {
            let display = MockDisplay::new();
            let (count, action) = counter();
            let mut driver = bar_driver(
                &display,
                CountdownRequest::new(5.0, "x").on_complete(action),
            );

            driver.run_once();
            driver.run_once();
            driver.request_cancel();
            assert_eq!(driver.run_once(), TaskControl::Stop);

            assert_eq!(driver.status(), CountdownStatus::Cancelled);
            assert_eq!(count.load(Ordering::SeqCst), 0);
            assert_eq!(driver.state().remaining(), 4.9);
            assert_eq!(display.clear_count(), 1);
        }

        #[test]
        fn test_cancel_on_expiring_tick_wins() {
            let display = MockDisplay::new();
            let (count, action) = counter();
            let mut driver = bar_driver(
                &display,
                CountdownRequest::new(0.1, "x").on_complete(action),
            );

            driver.run_once();
            driver.request_cancel();
            assert_eq!(driver.run_once(), TaskControl::Stop);

            assert_eq!(driver.status(), CountdownStatus::Cancelled);
            assert_eq!(count.load(Ordering::SeqCst), 0);
        }

        #[test]
        fn test_cancel_after_completion_keeps_completed() {
            let display = MockDisplay::new();
            let (count, action) = counter();
            let mut driver = bar_driver(
                &display,
                CountdownRequest::new(0.1, "x").on_complete(action),
            );

            run_until_stopped(&mut driver);
            driver.request_cancel();
            assert_eq!(driver.run_once(), TaskControl::Stop);

            assert_eq!(driver.status(), CountdownStatus::Completed);
            assert_eq!(count.load(Ordering::SeqCst), 1);
            assert_eq!(display.clear_count(), 1);
        }

        #[test]
        fn test_double_cancel_same_as_single() {
            let display = MockDisplay::new();
            let mut driver = bar_driver(&display, CountdownRequest::new(1.0, "x"));
            driver.run_once();
            driver.request_cancel();
            driver.request_cancel();
            driver.run_once();
            driver.run_once();
            assert_eq!(driver.status(), CountdownStatus::Cancelled);
            assert_eq!(display.clear_count(), 1);
        }
    }

    mod frame_tests {
        use super::*;

        #[test]
        fn test_players_shown_on_bar() {
            let display = MockDisplay::new();
            display.add_recipient("Alex");
            display.add_recipient("Steve");
            let mut driver = bar_driver(
                &display,
                CountdownRequest::new(1.0, "Visible to %players_shown%"),
            );
            driver.run_once();
            assert_eq!(
                display.bar_updates(),
                vec![(1.0, "Visible to Alex, Steve".to_string())]
            );
        }

        #[test]
        fn test_missing_context_skips_frame_but_keeps_ticking() {
            let display = MockDisplay::new();
            let alex = display.add_recipient("Alex");
            let sink = OverlayTextSink::new(alex, display.transport(), display.registry());
            let (count, action) = counter();
            let mut driver = CountdownDriver::new(
                CountdownRequest::new(0.3, "%players_shown%").on_complete(action),
                ProgressRenderer::default(),
                sink,
                1,
            )
            .unwrap();

            assert!(matches!(
                driver.build_frame(),
                Err(TimerError::MissingContext(_))
            ));
            run_until_stopped(&mut driver);
            assert!(display.overlay_texts(&alex).is_empty());
            assert_eq!(driver.status(), CountdownStatus::Completed);
            assert_eq!(count.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn test_custom_placeholders_applied() {
            let display = MockDisplay::new();
            let mut driver = bar_driver(
                &display,
                CountdownRequest::new(2.0, "%phase% in %time_left%s")
                    .with_placeholder("%phase%", "Grace period"),
            );
            driver.run_once();
            driver.run_once();
            assert_eq!(
                display.bar_updates().last(),
                Some(&(0.95, "Grace period in 1.9s".to_string()))
            );
        }
    }

    mod cadence_tests {
        use super::*;

        #[test]
        fn test_overlay_resend_between_steps() {
            let display = MockDisplay::new();
            let alex = display.add_recipient("Alex");
            let sink = OverlayTextSink::new(alex, display.transport(), display.registry())
                .with_resend_interval(1);
            let mut driver = CountdownDriver::new(
                CountdownRequest::new(0.2, "%time_left%"),
                ProgressRenderer::default().with_notches(2),
                sink,
                2,
            )
            .unwrap();
            assert_eq!(driver.invocation_interval(), 1);

            // t0 initial, t1 resend, t2 step, t3 resend, t4 step + final
            let invocations = run_until_stopped(&mut driver);
            assert_eq!(invocations, 5);
            let texts = display.overlay_texts(&alex);
            assert_eq!(texts.len(), 5);
            assert_eq!(texts[0], texts[1]);
            assert_eq!(texts[2], texts[3]);
            assert!(texts[4].ends_with("0.0"));
        }

        #[test]
        fn test_resend_not_needed_when_not_shorter_than_step() {
            let display = MockDisplay::new();
            let alex = display.add_recipient("Alex");
            let sink = OverlayTextSink::new(alex, display.transport(), display.registry())
                .with_resend_interval(4);
            let driver = CountdownDriver::new(
                CountdownRequest::new(1.0, "x"),
                ProgressRenderer::default(),
                sink,
                2,
            )
            .unwrap();
            assert_eq!(driver.invocation_interval(), 2);
        }

        #[test]
        fn test_step_interval_longer_than_invocation() {
            let display = MockDisplay::new();
            let alex = display.add_recipient("Alex");
            let sink = OverlayTextSink::new(alex, display.transport(), display.registry())
                .with_resend_interval(2);
            let mut driver = CountdownDriver::new(
                CountdownRequest::new(0.1, "x"),
                ProgressRenderer::default(),
                sink,
                4,
            )
            .unwrap();
            assert_eq!(driver.invocation_interval(), 2);
            // t0 initial, t2 resend, t4 step -> complete
            assert_eq!(run_until_stopped(&mut driver), 3);
            assert_eq!(driver.status(), CountdownStatus::Completed);
        }
    }
}
