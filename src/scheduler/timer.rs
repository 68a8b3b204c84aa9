//! Scheduler facade: turns requests into scheduled countdowns.

use std::sync::Arc;
use std::time::Duration;

use super::driver::{CountdownDriver, CountdownRequest};
use super::feed::{CompletableText, OverlayFeed};
use super::handle::CountdownHandle;
use super::TickScheduler;
use crate::error::TimerError;
use crate::render::ProgressRenderer;
use crate::sink::{
    Audience, DisplayTransport, NotificationSink, OverlayTextSink, ProgressBarSink, RecipientId,
    RecipientRegistry,
};
use crate::types::TimerConfig;

/// Starts countdowns and overlay feeds on a host tick facility.
pub struct TimerScheduler {
    host: Arc<dyn TickScheduler>,
    transport: Arc<dyn DisplayTransport>,
    registry: Arc<dyn RecipientRegistry>,
    config: TimerConfig,
    renderer: ProgressRenderer,
}

impl TimerScheduler {
    /// Creates a scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidConfig`] if `config` does not validate.
    pub fn new(
        host: Arc<dyn TickScheduler>,
        transport: Arc<dyn DisplayTransport>,
        registry: Arc<dyn RecipientRegistry>,
        config: TimerConfig,
    ) -> Result<Self, TimerError> {
        config.validate()?;
        let renderer = ProgressRenderer::new(config.notches, config.colors.clone());
        Ok(Self {
            host,
            transport,
            registry,
            config,
            renderer,
        })
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn renderer(&self) -> &ProgressRenderer {
        &self.renderer
    }

    /// Starts a countdown that pushes to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidDuration`] if the request's duration is
    /// not positive. Nothing is scheduled in that case.
    pub fn start<S>(
        &self,
        request: CountdownRequest,
        sink: S,
    ) -> Result<CountdownHandle, TimerError>
    where
        S: NotificationSink + 'static,
    {
        let mut driver = CountdownDriver::new(
            request,
            self.renderer.clone(),
            sink,
            self.config.step_interval_ticks,
        )?;
        let id = driver.id();
        let shared = driver.shared();
        let interval = driver.invocation_interval();

        tracing::debug!(countdown = %id, interval, "scheduling countdown");
        let registration = self
            .host
            .schedule_repeating(interval, Box::new(move || driver.run_once()));
        Ok(CountdownHandle::new(id, shared, registration))
    }

    /// Starts a countdown on a new progress bar.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start).
    pub fn start_bar(
        &self,
        request: CountdownRequest,
        audience: Audience,
    ) -> Result<CountdownHandle, TimerError> {
        let sink = ProgressBarSink::new(
            audience,
            Arc::clone(&self.transport),
            Arc::clone(&self.registry),
        );
        let bar = sink.id();
        Ok(self.start(request, sink)?.with_bar(bar))
    }

    /// Starts a countdown shown as overlay text to `recipient`.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start).
    pub fn start_overlay(
        &self,
        recipient: RecipientId,
        request: CountdownRequest,
    ) -> Result<CountdownHandle, TimerError> {
        self.start(request, self.overlay_sink(recipient))
    }

    /// Shows fixed overlay text to `recipient` for `duration`.
    ///
    /// The text is re-pushed every [`STATIC_OVERLAY_REFRESH_TICKS`] and pushed
    /// a last time when [`FADE_OUT_TICKS`] remain, so the client fade ends
    /// with the duration.
    ///
    /// [`STATIC_OVERLAY_REFRESH_TICKS`]: super::STATIC_OVERLAY_REFRESH_TICKS
    /// [`FADE_OUT_TICKS`]: super::FADE_OUT_TICKS
    pub fn show_overlay_for(
        &self,
        recipient: RecipientId,
        text: impl Into<String>,
        duration: Duration,
    ) -> CountdownHandle {
        let duration_ticks = self.duration_to_ticks(duration);
        let feed = OverlayFeed::fixed(self.overlay_sink(recipient), text.into(), duration_ticks);
        self.schedule_feed(feed)
    }

    /// Shows `buffer` to `recipient` until the buffer is completed,
    /// re-pushing every `refresh_ticks` host ticks.
    pub fn overlay_feed(
        &self,
        recipient: RecipientId,
        buffer: CompletableText,
        refresh_ticks: u32,
    ) -> CountdownHandle {
        let feed = OverlayFeed::live(self.overlay_sink(recipient), buffer, refresh_ticks.max(1));
        self.schedule_feed(feed)
    }

    fn schedule_feed(&self, mut feed: OverlayFeed) -> CountdownHandle {
        let id = feed.id();
        let shared = feed.shared();
        let interval = feed.check_interval();

        tracing::debug!(feed = %id, interval, "scheduling overlay feed");
        let registration = self
            .host
            .schedule_repeating(interval, Box::new(move || feed.run_once()));
        CountdownHandle::new(id, shared, registration)
    }

    fn overlay_sink(&self, recipient: RecipientId) -> OverlayTextSink {
        OverlayTextSink::new(
            recipient,
            Arc::clone(&self.transport),
            Arc::clone(&self.registry),
        )
        .with_resend_interval(self.config.overlay_resend_interval())
    }

    fn duration_to_ticks(&self, duration: Duration) -> u64 {
        let tick_millis = u128::from(self.config.host_tick_millis.max(1));
        u64::try_from(duration.as_millis() / tick_millis).unwrap_or(u64::MAX)
    }
}
