//! GameMaster Library
//!
//! Timed player notifications for multiplayer game servers: progress bars
//! and transient overlay text that count down, re-render every tick and
//! clean up after themselves.
//! It includes:
//! - Fixed-point countdown state that never drifts
//! - Progress bar rendering with chat formatting codes
//! - Placeholder substitution for countdown titles
//! - Notification sinks for progress bars and overlay text
//! - A scheduler that drives countdowns on the host's periodic tick
//! - CLI command parsing and display utilities
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gamemaster::{
//!     Audience, CountdownRequest, ManualTickScheduler, MockDisplay, TimerConfig,
//!     TimerScheduler,
//! };
//!
//! let display = MockDisplay::new();
//! display.add_recipient("Alex");
//! let host = Arc::new(ManualTickScheduler::new());
//! let timers = TimerScheduler::new(
//!     host.clone(),
//!     display.transport(),
//!     display.registry(),
//!     TimerConfig::default(),
//! )?;
//!
//! let handle = timers.start_bar(
//!     CountdownRequest::new(1.0, "Starting in %time_left%s"),
//!     Audience::Broadcast,
//! )?;
//! host.advance(21);
//! assert!(handle.is_finished());
//! # Ok::<(), gamemaster::TimerError>(())
//! ```

pub mod cli;
pub mod countdown;
pub mod error;
pub mod placeholder;
pub mod render;
pub mod scheduler;
pub mod sink;
pub mod types;

// Re-export commonly used types for convenience
pub use countdown::{CountdownState, TickResult, STEP};
pub use error::TimerError;
pub use placeholder::{substitute, CustomPlaceholders, Placeholder, PlaceholderContext};
pub use render::{render, ProgressFrame, ProgressRenderer, DEFAULT_NOTCHES, NOTCH_GLYPH};
pub use types::{ChatColor, ColorScheme, Style, TimerConfig, MAX_NOTCHES, SECTION_SIGN};

// Re-export sink types
pub use sink::{
    Audience, BarId, BarTarget, ChannelTransport, CompletionStyle, DisplayCommand,
    DisplayTransport, Frame, LocalRegistry, MockDisplay, NotificationSink, OverlayTextSink,
    ProgressBarSink, PushOutcome, RecipientId, RecipientRegistry,
};

// Re-export scheduler types
pub use scheduler::{
    CancelHandle, CompletableText, CompletionAction, CountdownDriver, CountdownHandle,
    CountdownRequest, CountdownStatus, ManualTickScheduler, RepeatingTask, TaskControl,
    TickScheduler, TimerScheduler, TokioTickScheduler,
};
