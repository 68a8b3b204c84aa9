//! Collaborator interfaces provided by the game server.
//!
//! The transport moves rendered frames to clients; the registry answers who
//! is online and who is looking at a bar. Both are owned by the host.

use crossbeam_channel::{Receiver, Sender};

use super::{BarId, BarTarget, RecipientId};

/// Delivers rendered notifications to clients.
pub trait DisplayTransport: Send + Sync {
    /// Shows transient overlay text to one recipient.
    fn push_overlay_text(&self, recipient: &RecipientId, text: &str);

    /// Shows or updates a progress bar.
    fn push_bar_update(&self, bar: &BarTarget, fraction: f64, title: &str);

    /// Removes a progress bar from every viewer.
    fn clear_bar(&self, bar: &BarTarget);
}

/// Read-only view of the host's player registry.
pub trait RecipientRegistry: Send + Sync {
    fn is_online(&self, recipient: &RecipientId) -> bool;

    /// Display names of everyone currently viewing `bar`.
    fn list_viewers(&self, bar: &BarTarget) -> Vec<String>;
}

// ============================================================================
// DisplayCommand
// ============================================================================

/// One transport call, as a value.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCommand {
    OverlayText {
        recipient: RecipientId,
        text: String,
    },
    BarUpdate {
        bar: BarId,
        fraction: f64,
        title: String,
    },
    BarClear {
        bar: BarId,
    },
}

// ============================================================================
// ChannelTransport
// ============================================================================

/// Transport that forwards every call as a [`DisplayCommand`] over a channel.
///
/// Lets a host apply display updates on its own thread (for example the
/// server main thread) while countdowns tick elsewhere.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: Sender<DisplayCommand>,
}

impl ChannelTransport {
    /// Creates a transport and the receiving end of its channel.
    pub fn unbounded() -> (Self, Receiver<DisplayCommand>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }

    /// Wraps an existing sender.
    pub fn new(sender: Sender<DisplayCommand>) -> Self {
        Self { sender }
    }

    fn send(&self, command: DisplayCommand) {
        if self.sender.send(command).is_err() {
            tracing::trace!("display channel disconnected, dropping command");
        }
    }
}

impl DisplayTransport for ChannelTransport {
    fn push_overlay_text(&self, recipient: &RecipientId, text: &str) {
        self.send(DisplayCommand::OverlayText {
            recipient: *recipient,
            text: text.to_string(),
        });
    }

    fn push_bar_update(&self, bar: &BarTarget, fraction: f64, title: &str) {
        self.send(DisplayCommand::BarUpdate {
            bar: bar.id,
            fraction,
            title: title.to_string(),
        });
    }

    fn clear_bar(&self, bar: &BarTarget) {
        self.send(DisplayCommand::BarClear { bar: bar.id });
    }
}
