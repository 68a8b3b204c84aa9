//! Display utilities for the GameMaster CLI.
//!
//! This module provides terminal output for:
//! - Rendered progress frames
//! - Display commands produced by running countdowns
//! - Error messages

use crate::sink::DisplayCommand;
use crate::types::{ChatColor, SECTION_SIGN};

const ANSI_RESET: &str = "\x1b[0m";

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Prints one rendered frame.
    pub fn show_frame(text: &str, raw: bool) {
        println!("{}", Self::format_text(text, raw));
    }

    /// Prints the effect of one display command.
    pub fn show_command(command: &DisplayCommand, raw: bool) {
        if let Some(line) = Self::format_command(command, raw) {
            println!("{}", line);
        }
    }

    /// Shows a message when a countdown finishes.
    pub fn show_completed() {
        println!("* countdown complete");
    }

    /// Shows a message when a countdown is cancelled.
    pub fn show_cancelled() {
        println!("[] countdown cancelled");
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("error: {}", message);
    }

    /// Formats a display command as one terminal line.
    pub fn format_command(command: &DisplayCommand, raw: bool) -> Option<String> {
        match command {
            DisplayCommand::OverlayText { text, .. } => Some(Self::format_text(text, raw)),
            DisplayCommand::BarUpdate {
                fraction, title, ..
            } => Some(format!(
                "{:>5.1}% {}",
                fraction * 100.0,
                Self::format_text(title, raw)
            )),
            DisplayCommand::BarClear { .. } => None,
        }
    }

    fn format_text(text: &str, raw: bool) -> String {
        if raw {
            text.to_string()
        } else {
            to_ansi(text)
        }
    }
}

// ============================================================================
// Formatting codes
// ============================================================================

/// Replaces chat formatting codes with ANSI escape sequences.
///
/// Unknown codes are dropped. A reset is appended when any code was seen.
pub fn to_ansi(text: &str) -> String {
    let mut output = String::with_capacity(text.len() + 16);
    let mut styled = false;
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != SECTION_SIGN {
            output.push(ch);
            continue;
        }
        let Some(code) = chars.next() else {
            break;
        };
        if let Some(color) = ChatColor::from_code(code) {
            styled = true;
            // A color code clears earlier decorations, as in game clients.
            if !color.is_decoration() {
                output.push_str(ANSI_RESET);
            }
            output.push_str(ansi_sequence(color));
        }
    }
    if styled {
        output.push_str(ANSI_RESET);
    }
    output
}

fn ansi_sequence(color: ChatColor) -> &'static str {
    match color {
        ChatColor::Black => "\x1b[30m",
        ChatColor::DarkBlue => "\x1b[34m",
        ChatColor::DarkGreen => "\x1b[32m",
        ChatColor::DarkAqua => "\x1b[36m",
        ChatColor::DarkRed => "\x1b[31m",
        ChatColor::DarkPurple => "\x1b[35m",
        ChatColor::Gold => "\x1b[33m",
        ChatColor::Gray => "\x1b[37m",
        ChatColor::DarkGray => "\x1b[90m",
        ChatColor::Blue => "\x1b[94m",
        ChatColor::Green => "\x1b[92m",
        ChatColor::Aqua => "\x1b[96m",
        ChatColor::Red => "\x1b[91m",
        ChatColor::LightPurple => "\x1b[95m",
        ChatColor::Yellow => "\x1b[93m",
        ChatColor::White => "\x1b[97m",
        ChatColor::Obfuscated => "\x1b[5m",
        ChatColor::Bold => "\x1b[1m",
        ChatColor::Strikethrough => "\x1b[9m",
        ChatColor::Underline => "\x1b[4m",
        ChatColor::Italic => "\x1b[3m",
        ChatColor::Reset => ANSI_RESET,
    }
}
