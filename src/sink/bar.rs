//! Progress bar sink.

use std::sync::Arc;

use super::{
    Audience, BarId, BarTarget, CompletionStyle, DisplayTransport, Frame, NotificationSink,
    PushOutcome, RecipientRegistry,
};

/// A stateful progress meter with a fraction and a title.
pub struct ProgressBarSink {
    target: BarTarget,
    fraction: f64,
    title: String,
    transport: Arc<dyn DisplayTransport>,
    registry: Arc<dyn RecipientRegistry>,
}

impl ProgressBarSink {
    /// Creates a full, untitled bar for `audience`. Nothing is shown until
    /// the first update.
    pub fn new(
        audience: Audience,
        transport: Arc<dyn DisplayTransport>,
        registry: Arc<dyn RecipientRegistry>,
    ) -> Self {
        Self {
            target: BarTarget {
                id: BarId::new(),
                audience,
            },
            fraction: 1.0,
            title: String::new(),
            transport,
            registry,
        }
    }

    pub fn id(&self) -> BarId {
        self.target.id
    }

    pub fn target(&self) -> &BarTarget {
        &self.target
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Sets the fill fraction, clamped to `[0, 1]`, and shows the bar.
    pub fn set_fraction(&mut self, fraction: f64) -> PushOutcome {
        self.fraction = clamp_fraction(fraction);
        self.show()
    }

    /// Sets the title and shows the bar.
    pub fn set_title(&mut self, title: impl Into<String>) -> PushOutcome {
        self.title = title.into();
        self.show()
    }

    fn show(&self) -> PushOutcome {
        if let Audience::Single(recipient) = self.target.audience {
            if !self.registry.is_online(&recipient) {
                tracing::trace!(bar = %self.target.id, %recipient, "bar viewer offline, skipping update");
                return PushOutcome::RecipientOffline;
            }
        }
        self.transport
            .push_bar_update(&self.target, self.fraction, &self.title);
        PushOutcome::Delivered
    }
}

fn clamp_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

impl NotificationSink for ProgressBarSink {
    fn viewers(&self) -> Option<Vec<String>> {
        Some(self.registry.list_viewers(&self.target))
    }

    fn push(&mut self, frame: &Frame) -> PushOutcome {
        self.fraction = clamp_fraction(frame.fraction);
        self.title.clone_from(&frame.title);
        self.show()
    }

    fn clear(&mut self) {
        self.transport.clear_bar(&self.target);
    }

    fn completion_style(&self) -> CompletionStyle {
        CompletionStyle::Clear
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{DisplayCommand, MockDisplay};

    fn frame(fraction: f64, title: &str) -> Frame {
        Frame {
            fraction,
            title: title.to_string(),
            text: String::new(),
        }
    }

    #[test]
    fn test_push_updates_bar() {
        let display = MockDisplay::new();
        let mut sink = ProgressBarSink::new(
            Audience::Broadcast,
            display.transport(),
            display.registry(),
        );

        assert_eq!(sink.push(&frame(0.5, "Half")), PushOutcome::Delivered);
        assert_eq!(display.bar_updates(), vec![(0.5, "Half".to_string())]);
        assert_eq!(sink.fraction(), 0.5);
        assert_eq!(sink.title(), "Half");
    }

    #[test]
    fn test_set_fraction_clamps() {
        let display = MockDisplay::new();
        let mut sink = ProgressBarSink::new(
            Audience::Broadcast,
            display.transport(),
            display.registry(),
        );
        sink.set_fraction(1.7);
        assert_eq!(sink.fraction(), 1.0);
        sink.set_fraction(-0.2);
        assert_eq!(sink.fraction(), 0.0);
        sink.set_title("Done");
        assert_eq!(
            display.bar_updates().last(),
            Some(&(0.0, "Done".to_string()))
        );
    }

    #[test]
    fn test_single_offline_viewer_is_noop() {
        let display = MockDisplay::new();
        let alex = display.add_recipient("Alex");
        let mut sink = ProgressBarSink::new(
            Audience::Single(alex),
            display.transport(),
            display.registry(),
        );

        display.set_online(&alex, false);
        assert_eq!(
            sink.push(&frame(0.3, "x")),
            PushOutcome::RecipientOffline
        );
        assert!(display.commands().is_empty());
    }

    #[test]
    fn test_viewers_and_clear() {
        let display = MockDisplay::new();
        display.add_recipient("Alex");
        display.add_recipient("Steve");
        let mut sink = ProgressBarSink::new(
            Audience::Broadcast,
            display.transport(),
            display.registry(),
        );

        assert_eq!(
            sink.viewers(),
            Some(vec!["Alex".to_string(), "Steve".to_string()])
        );
        sink.clear();
        assert_eq!(
            display.commands(),
            vec![DisplayCommand::BarClear { bar: sink.id() }]
        );
        assert_eq!(sink.completion_style(), CompletionStyle::Clear);
    }
}
