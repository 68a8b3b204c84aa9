//! Notification sinks: where rendered countdown frames go.
//!
//! A sink accepts rendered frames and a terminal clear signal. Two kinds
//! share the same countdown driver:
//!
//! - [`ProgressBarSink`]: a stateful meter (fraction + title) shown to one
//!   recipient or broadcast to everyone online
//! - [`OverlayTextSink`]: transient overlay text for exactly one recipient,
//!   re-pushed on its own cadence because clients fade it out
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ CountdownDriver  │
//! └────────┬─────────┘
//!          │ Frame
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ NotificationSink │────▶│ RecipientRegistry│ (who is online)
//! │                  │     └──────────────────┘
//! │                  │     ┌──────────────────┐
//! │                  │────▶│ DisplayTransport │ (packets to clients)
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! Pushing to an offline recipient is never an error: the push is dropped
//! and reported as [`PushOutcome::RecipientOffline`].

mod bar;
mod mock;
mod overlay;
mod registry;
mod transport;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use bar::ProgressBarSink;
pub use mock::MockDisplay;
pub use overlay::OverlayTextSink;
pub use registry::LocalRegistry;
pub use transport::{ChannelTransport, DisplayCommand, DisplayTransport, RecipientRegistry};

// ============================================================================
// Identifiers
// ============================================================================

/// Identifies one player that can receive notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientId(Uuid);

impl RecipientId {
    /// Creates a random recipient id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecipientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifies one progress bar instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BarId(Uuid);

impl BarId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BarId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Audience / BarTarget
// ============================================================================

/// Who a progress bar is shown to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// A single recipient.
    Single(RecipientId),
    /// Everyone currently online, as tracked by the registry.
    Broadcast,
}

/// A progress bar as seen by the transport and the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarTarget {
    pub id: BarId,
    pub audience: Audience,
}

// ============================================================================
// Frame / PushOutcome / CompletionStyle
// ============================================================================

/// A rendered frame handed to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Bar fraction in `[0, 1]`.
    pub fraction: f64,
    /// Title with placeholders already substituted.
    pub title: String,
    /// Bar text and title joined for text-only sinks.
    pub text: String,
}

/// What happened to a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Handed to the transport.
    Delivered,
    /// The recipient is offline; the push was dropped.
    RecipientOffline,
    /// There was nothing to push.
    Skipped,
}

/// What a sink does when its countdown expires naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStyle {
    /// Remove the notification from every viewer.
    Clear,
    /// Push the final frame once more and let it fade out client-side.
    PushFinal,
}

// ============================================================================
// NotificationSink
// ============================================================================

/// Destination of rendered countdown frames.
///
/// Implementations must treat offline recipients as a no-op.
pub trait NotificationSink: Send {
    /// Names of everyone the notification is shown to, if the sink has a
    /// viewer list.
    fn viewers(&self) -> Option<Vec<String>>;

    /// Shows a new frame.
    fn push(&mut self, frame: &Frame) -> PushOutcome;

    /// Terminal signal: removes the notification.
    fn clear(&mut self);

    /// How the sink ends a countdown that expired naturally.
    fn completion_style(&self) -> CompletionStyle;

    /// Host ticks between re-sends of the last frame, if the sink needs them.
    fn resend_interval(&self) -> Option<u32> {
        None
    }

    /// Pushes the last frame again.
    fn resend(&mut self) -> PushOutcome {
        PushOutcome::Skipped
    }
}

impl<S: NotificationSink + ?Sized> NotificationSink for Box<S> {
    fn viewers(&self) -> Option<Vec<String>> {
        (**self).viewers()
    }

    fn push(&mut self, frame: &Frame) -> PushOutcome {
        (**self).push(frame)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn completion_style(&self) -> CompletionStyle {
        (**self).completion_style()
    }

    fn resend_interval(&self) -> Option<u32> {
        (**self).resend_interval()
    }

    fn resend(&mut self) -> PushOutcome {
        (**self).resend()
    }
}
