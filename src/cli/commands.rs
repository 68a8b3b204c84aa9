//! Command definitions for the GameMaster CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// GameMaster - timed notifications for game servers, previewed in a terminal
#[derive(Parser, Debug)]
#[command(
    name = "gamemaster",
    version,
    about = "Preview GameMaster progress bars and overlay countdowns",
    long_about = "Renders the progress bars and overlay countdowns a GameMaster server would\n\
                  show to players, using the same countdown engine, in the terminal.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render a single progress bar frame
    Render(RenderArgs),

    /// Run a live countdown in the terminal (Ctrl-C cancels)
    Countdown(CountdownArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Render Command Arguments
// ============================================================================

/// Arguments for the render command
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Time remaining
    #[arg(short, long)]
    pub remaining: f64,

    /// Total duration
    #[arg(short, long, value_parser = parse_duration)]
    pub total: f64,

    /// Number of notches in the bar (1-100)
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(1..=100)
    )]
    pub notches: Option<u32>,

    /// Label shown after the bar
    #[arg(short, long)]
    pub label: Option<String>,

    /// Print formatting codes verbatim instead of terminal colors
    #[arg(long)]
    pub raw: bool,
}

// ============================================================================
// Countdown Command Arguments
// ============================================================================

/// Arguments for the countdown command
#[derive(Args, Debug, Clone)]
pub struct CountdownArgs {
    /// Countdown duration in seconds
    #[arg(short, long, default_value = "5", value_parser = parse_duration)]
    pub seconds: f64,

    /// Title template (%time_left%, %time_elapsed%, %players_shown% and
    /// custom placeholders are replaced)
    #[arg(short, long, default_value = "%time_left%s left")]
    pub title: String,

    /// Show the countdown as overlay text instead of a progress bar
    #[arg(short, long)]
    pub overlay: bool,

    /// Number of notches in the bar (1-100)
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(1..=100)
    )]
    pub notches: Option<u32>,

    /// Timer configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Custom placeholder as TOKEN=VALUE (repeatable)
    #[arg(long = "set", value_name = "TOKEN=VALUE", value_parser = parse_placeholder)]
    pub placeholders: Vec<(String, String)>,

    /// Print formatting codes verbatim instead of terminal colors
    #[arg(long)]
    pub raw: bool,
}

impl Default for CountdownArgs {
    fn default() -> Self {
        Self {
            seconds: 5.0,
            title: "%time_left%s left".to_string(),
            overlay: false,
            notches: None,
            config: None,
            placeholders: Vec::new(),
            raw: false,
        }
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Parses a countdown duration.
///
/// - Must be a finite number
/// - Must be positive
fn parse_duration(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if !value.is_finite() || value <= 0.0 {
        return Err("duration must be a positive number".to_string());
    }
    Ok(value)
}

/// Parses a `TOKEN=VALUE` pair. The token must not be empty.
fn parse_placeholder(s: &str) -> Result<(String, String), String> {
    let (token, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TOKEN=VALUE, got '{}'", s))?;
    if token.is_empty() {
        return Err("placeholder token cannot be empty".to_string());
    }
    Ok((token.to_string(), value.to_string()))
}

// ============================================================================
// Tests
// ============================================================================
