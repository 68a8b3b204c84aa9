//! Core data types for GameMaster notifications.
//!
//! This module defines the data structures used for:
//! - Chat color and style codes understood by game clients
//! - Color schemes for progress bar rendering
//! - Timer configuration with validation

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// Prefix character of every legacy chat formatting code.
pub const SECTION_SIGN: char = '§';

// ============================================================================
// ChatColor
// ============================================================================

/// A single legacy chat formatting code (a color or a text decoration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
    Obfuscated,
    Bold,
    Strikethrough,
    Underline,
    Italic,
    Reset,
}

impl ChatColor {
    /// Returns the code character that follows the section sign.
    pub fn code(&self) -> char {
        match self {
            ChatColor::Black => '0',
            ChatColor::DarkBlue => '1',
            ChatColor::DarkGreen => '2',
            ChatColor::DarkAqua => '3',
            ChatColor::DarkRed => '4',
            ChatColor::DarkPurple => '5',
            ChatColor::Gold => '6',
            ChatColor::Gray => '7',
            ChatColor::DarkGray => '8',
            ChatColor::Blue => '9',
            ChatColor::Green => 'a',
            ChatColor::Aqua => 'b',
            ChatColor::Red => 'c',
            ChatColor::LightPurple => 'd',
            ChatColor::Yellow => 'e',
            ChatColor::White => 'f',
            ChatColor::Obfuscated => 'k',
            ChatColor::Bold => 'l',
            ChatColor::Strikethrough => 'm',
            ChatColor::Underline => 'n',
            ChatColor::Italic => 'o',
            ChatColor::Reset => 'r',
        }
    }

    /// Looks up a formatting code by its code character (case-insensitive).
    pub fn from_code(code: char) -> Option<Self> {
        let color = match code.to_ascii_lowercase() {
            '0' => ChatColor::Black,
            '1' => ChatColor::DarkBlue,
            '2' => ChatColor::DarkGreen,
            '3' => ChatColor::DarkAqua,
            '4' => ChatColor::DarkRed,
            '5' => ChatColor::DarkPurple,
            '6' => ChatColor::Gold,
            '7' => ChatColor::Gray,
            '8' => ChatColor::DarkGray,
            '9' => ChatColor::Blue,
            'a' => ChatColor::Green,
            'b' => ChatColor::Aqua,
            'c' => ChatColor::Red,
            'd' => ChatColor::LightPurple,
            'e' => ChatColor::Yellow,
            'f' => ChatColor::White,
            'k' => ChatColor::Obfuscated,
            'l' => ChatColor::Bold,
            'm' => ChatColor::Strikethrough,
            'n' => ChatColor::Underline,
            'o' => ChatColor::Italic,
            'r' => ChatColor::Reset,
            _ => return None,
        };
        Some(color)
    }

    /// Returns true for text decorations (bold, italic, ...) and reset.
    pub fn is_decoration(&self) -> bool {
        matches!(
            self,
            ChatColor::Obfuscated
                | ChatColor::Bold
                | ChatColor::Strikethrough
                | ChatColor::Underline
                | ChatColor::Italic
                | ChatColor::Reset
        )
    }

    /// Returns the two-character prefix sequence for this code.
    pub fn sequence(&self) -> String {
        format!("{}{}", SECTION_SIGN, self.code())
    }
}

// ============================================================================
// Style
// ============================================================================

/// An ordered run of formatting codes applied as one prefix.
///
/// Colors must come before decorations: clients reset decorations whenever
/// a color code is seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(Vec<ChatColor>);

impl Style {
    /// Creates a style from its codes, in application order.
    pub fn new(codes: impl IntoIterator<Item = ChatColor>) -> Self {
        Self(codes.into_iter().collect())
    }

    /// Creates a single-color style.
    pub fn color(color: ChatColor) -> Self {
        Self(vec![color])
    }

    /// Returns the codes of this style.
    pub fn codes(&self) -> &[ChatColor] {
        &self.0
    }

    /// Returns the prefix sequence to emit before a run of text.
    pub fn prefix(&self) -> String {
        self.0.iter().map(ChatColor::sequence).collect()
    }
}

// ============================================================================
// ColorScheme
// ============================================================================

fn default_border() -> Style {
    Style::new([ChatColor::DarkRed, ChatColor::Bold])
}

fn default_empty() -> Style {
    Style::color(ChatColor::Gray)
}

fn default_filled() -> Style {
    Style::color(ChatColor::Red)
}

fn default_delimiter() -> Style {
    Style::color(ChatColor::Gray)
}

/// Colors used when rendering a progress bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    /// Style of the `[` and `]` border markers.
    #[serde(default = "default_border")]
    pub border: Style,
    /// Style of the notches that are still empty.
    #[serde(default = "default_empty")]
    pub empty: Style,
    /// Style of the filled notches.
    #[serde(default = "default_filled")]
    pub filled: Style,
    /// Style of the separator between the bar and its label.
    #[serde(default = "default_delimiter")]
    pub delimiter: Style,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            border: default_border(),
            empty: default_empty(),
            filled: default_filled(),
            delimiter: default_delimiter(),
        }
    }
}

impl ColorScheme {
    /// Returns a copy with a different filled-notch style.
    #[must_use]
    pub fn with_filled(mut self, filled: Style) -> Self {
        self.filled = filled;
        self
    }

    /// Returns a copy with a different empty-notch style.
    #[must_use]
    pub fn with_empty(mut self, empty: Style) -> Self {
        self.empty = empty;
        self
    }

    /// Returns a copy with a different border style.
    #[must_use]
    pub fn with_border(mut self, border: Style) -> Self {
        self.border = border;
        self
    }
}

// ============================================================================
// TimerConfig
// ============================================================================

/// Host ticks between two countdown steps (0.1 time-unit each).
fn default_step_interval_ticks() -> u32 {
    2
}

fn default_notches() -> u32 {
    10
}

/// One host tick of a 20 TPS game server.
fn default_host_tick_millis() -> u64 {
    50
}

/// Largest notch count a bar may be rendered with.
pub const MAX_NOTCHES: u32 = 100;

/// Longest accepted host tick, one minute.
pub const MAX_HOST_TICK_MILLIS: u64 = 60_000;

/// Configuration shared by every countdown started from one scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Host ticks between countdown steps.
    #[serde(default = "default_step_interval_ticks")]
    pub step_interval_ticks: u32,

    /// Number of notches in rendered progress bars.
    #[serde(default = "default_notches")]
    pub notches: u32,

    /// Colors of rendered progress bars.
    #[serde(default)]
    pub colors: ColorScheme,

    /// Host ticks between overlay re-sends. `None` re-sends on every step.
    #[serde(default)]
    pub overlay_resend_ticks: Option<u32>,

    /// Wall-clock length of one host tick, used by the tokio scheduler.
    #[serde(default = "default_host_tick_millis")]
    pub host_tick_millis: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            step_interval_ticks: default_step_interval_ticks(),
            notches: default_notches(),
            colors: ColorScheme::default(),
            overlay_resend_ticks: None,
            host_tick_millis: default_host_tick_millis(),
        }
    }
}

impl TimerConfig {
    /// Returns a copy with the given notch count.
    #[must_use]
    pub fn with_notches(mut self, notches: u32) -> Self {
        self.notches = notches;
        self
    }

    /// Returns a copy with the given overlay re-send cadence in host ticks.
    #[must_use]
    pub fn with_overlay_resend_ticks(mut self, ticks: u32) -> Self {
        self.overlay_resend_ticks = Some(ticks);
        self
    }

    /// Returns a copy with the given step interval in host ticks.
    #[must_use]
    pub fn with_step_interval_ticks(mut self, ticks: u32) -> Self {
        self.step_interval_ticks = ticks;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidConfig`] when an interval or the notch
    /// count is zero, the notch count exceeds [`MAX_NOTCHES`], or the host
    /// tick exceeds [`MAX_HOST_TICK_MILLIS`].
    pub fn validate(&self) -> Result<(), TimerError> {
        if self.step_interval_ticks == 0 {
            return Err(TimerError::InvalidConfig(
                "step_interval_ticks must be at least 1".to_string(),
            ));
        }
        if self.notches == 0 || self.notches > MAX_NOTCHES {
            return Err(TimerError::InvalidConfig(format!(
                "notches must be in the range 1-{}",
                MAX_NOTCHES
            )));
        }
        if self.overlay_resend_ticks == Some(0) {
            return Err(TimerError::InvalidConfig(
                "overlay_resend_ticks must be at least 1".to_string(),
            ));
        }
        if self.host_tick_millis == 0 || self.host_tick_millis > MAX_HOST_TICK_MILLIS {
            return Err(TimerError::InvalidConfig(format!(
                "host_tick_millis must be in the range 1-{}",
                MAX_HOST_TICK_MILLIS
            )));
        }
        Ok(())
    }

    /// Returns the overlay re-send cadence, falling back to the step interval.
    pub fn overlay_resend_interval(&self) -> u32 {
        self.overlay_resend_ticks.unwrap_or(self.step_interval_ticks)
    }

    /// Returns the wall-clock duration of one host tick.
    pub fn host_tick_duration(&self) -> Duration {
        Duration::from_millis(self.host_tick_millis)
    }
}

// ============================================================================
// Tests
// ============================================================================
