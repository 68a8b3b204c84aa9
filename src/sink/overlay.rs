//! Overlay text sink.

use std::sync::Arc;

use super::{
    CompletionStyle, DisplayTransport, Frame, NotificationSink, PushOutcome, RecipientId,
    RecipientRegistry,
};

/// Transient overlay text for one recipient.
///
/// Clients fade overlay text out after a few seconds, so the last frame is
/// kept and re-pushed whenever the driver's re-send cadence is due.
pub struct OverlayTextSink {
    recipient: RecipientId,
    last_text: Option<String>,
    resend_interval: Option<u32>,
    transport: Arc<dyn DisplayTransport>,
    registry: Arc<dyn RecipientRegistry>,
}

impl OverlayTextSink {
    pub fn new(
        recipient: RecipientId,
        transport: Arc<dyn DisplayTransport>,
        registry: Arc<dyn RecipientRegistry>,
    ) -> Self {
        Self {
            recipient,
            last_text: None,
            resend_interval: None,
            transport,
            registry,
        }
    }

    /// Re-sends the last frame every `ticks` host ticks. Zero is ignored.
    #[must_use]
    pub fn with_resend_interval(mut self, ticks: u32) -> Self {
        self.resend_interval = (ticks > 0).then_some(ticks);
        self
    }

    pub fn recipient(&self) -> &RecipientId {
        &self.recipient
    }

    pub fn last_text(&self) -> Option<&str> {
        self.last_text.as_deref()
    }

    /// Pushes `text` to the recipient, dropping it if they are offline.
    pub fn push_text(&mut self, text: impl Into<String>) -> PushOutcome {
        let text = text.into();
        let outcome = self.deliver(&text);
        self.last_text = Some(text);
        outcome
    }

    fn deliver(&self, text: &str) -> PushOutcome {
        if !self.registry.is_online(&self.recipient) {
            tracing::trace!(recipient = %self.recipient, "overlay recipient offline, skipping push");
            return PushOutcome::RecipientOffline;
        }
        self.transport.push_overlay_text(&self.recipient, text);
        PushOutcome::Delivered
    }
}

impl NotificationSink for OverlayTextSink {
    fn viewers(&self) -> Option<Vec<String>> {
        None
    }

    fn push(&mut self, frame: &Frame) -> PushOutcome {
        self.push_text(frame.text.as_str())
    }

    fn clear(&mut self) {
        self.last_text = None;
    }

    fn completion_style(&self) -> CompletionStyle {
        CompletionStyle::PushFinal
    }

    fn resend_interval(&self) -> Option<u32> {
        self.resend_interval
    }

    fn resend(&mut self) -> PushOutcome {
        match self.last_text.as_deref() {
            Some(text) => self.deliver(text),
            None => PushOutcome::Skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MockDisplay;

    fn sink(display: &MockDisplay, recipient: RecipientId) -> OverlayTextSink {
        OverlayTextSink::new(recipient, display.transport(), display.registry())
    }

    #[test]
    fn test_push_delivers_text() {
        let display = MockDisplay::new();
        let alex = display.add_recipient("Alex");
        let mut overlay = sink(&display, alex);

        let frame = Frame {
            fraction: 0.5,
            title: "ignored".to_string(),
            text: "[|||] Go".to_string(),
        };
        assert_eq!(overlay.push(&frame), PushOutcome::Delivered);
        assert_eq!(display.overlay_texts(&alex), vec!["[|||] Go"]);
        assert_eq!(overlay.last_text(), Some("[|||] Go"));
    }

    #[test]
    fn test_offline_push_is_dropped_but_remembered() {
        let display = MockDisplay::new();
        let alex = display.add_recipient("Alex");
        let mut overlay = sink(&display, alex);

        display.set_online(&alex, false);
        assert_eq!(overlay.push_text("hi"), PushOutcome::RecipientOffline);
        assert!(display.overlay_texts(&alex).is_empty());

        display.set_online(&alex, true);
        assert_eq!(overlay.resend(), PushOutcome::Delivered);
        assert_eq!(display.overlay_texts(&alex), vec!["hi"]);
    }

    #[test]
    fn test_resend_without_frame_is_skipped() {
        let display = MockDisplay::new();
        let alex = display.add_recipient("Alex");
        let mut overlay = sink(&display, alex);
        assert_eq!(overlay.resend(), PushOutcome::Skipped);

        overlay.push_text("x");
        overlay.clear();
        assert_eq!(overlay.resend(), PushOutcome::Skipped);
    }

    #[test]
    fn test_resend_interval() {
        let display = MockDisplay::new();
        let alex = display.add_recipient("Alex");
        assert_eq!(sink(&display, alex).resend_interval(), None);
        assert_eq!(
            sink(&display, alex).with_resend_interval(1).resend_interval(),
            Some(1)
        );
        assert_eq!(
            sink(&display, alex).with_resend_interval(0).resend_interval(),
            None
        );
    }
}
