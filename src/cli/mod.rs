//! CLI module for GameMaster.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Terminal output and formatting-code conversion

pub mod commands;
pub mod display;

pub use commands::{Cli, Commands, CountdownArgs, RenderArgs};
pub use display::Display;
