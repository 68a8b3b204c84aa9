//! Recording display collaborator for tests.

use std::sync::{Arc, Mutex};

use super::{
    BarTarget, DisplayCommand, DisplayTransport, LocalRegistry, RecipientId, RecipientRegistry,
};

/// Mock transport and registry that records every display command.
///
/// Clones share the same recording and registry.
#[derive(Debug, Clone, Default)]
pub struct MockDisplay {
    registry: Arc<LocalRegistry>,
    commands: Arc<Mutex<Vec<DisplayCommand>>>,
}

impl MockDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an online recipient.
    pub fn add_recipient(&self, name: &str) -> RecipientId {
        self.registry.join(name)
    }

    pub fn set_online(&self, recipient: &RecipientId, online: bool) {
        self.registry.set_online(recipient, online);
    }

    /// Returns this mock as a transport.
    pub fn transport(&self) -> Arc<dyn DisplayTransport> {
        Arc::new(self.clone())
    }

    /// Returns this mock as a registry.
    pub fn registry(&self) -> Arc<dyn RecipientRegistry> {
        Arc::new(self.clone())
    }

    #[must_use]
    pub fn commands(&self) -> Vec<DisplayCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// Overlay texts delivered to `recipient`, in order.
    #[must_use]
    pub fn overlay_texts(&self, recipient: &RecipientId) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                DisplayCommand::OverlayText { recipient: r, text } if r == *recipient => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Bar updates as `(fraction, title)` pairs, in order.
    #[must_use]
    pub fn bar_updates(&self) -> Vec<(f64, String)> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                DisplayCommand::BarUpdate {
                    fraction, title, ..
                } => Some((fraction, title)),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.commands()
            .iter()
            .filter(|command| matches!(command, DisplayCommand::BarClear { .. }))
            .count()
    }
}

impl DisplayTransport for MockDisplay {
    fn push_overlay_text(&self, recipient: &RecipientId, text: &str) {
        self.commands.lock().unwrap().push(DisplayCommand::OverlayText {
            recipient: *recipient,
            text: text.to_string(),
        });
    }

    fn push_bar_update(&self, bar: &BarTarget, fraction: f64, title: &str) {
        self.commands.lock().unwrap().push(DisplayCommand::BarUpdate {
            bar: bar.id,
            fraction,
            title: title.to_string(),
        });
    }

    fn clear_bar(&self, bar: &BarTarget) {
        self.commands
            .lock()
            .unwrap()
            .push(DisplayCommand::BarClear { bar: bar.id });
    }
}

impl RecipientRegistry for MockDisplay {
    fn is_online(&self, recipient: &RecipientId) -> bool {
        self.registry.is_online(recipient)
    }

    fn list_viewers(&self, bar: &BarTarget) -> Vec<String> {
        self.registry.list_viewers(bar)
    }
}
