//! GameMaster CLI - previews timed game-server notifications
//!
//! Renders the progress bars and overlay countdowns a server would show to
//! players:
//! - `render`: a single progress bar frame
//! - `countdown`: a live countdown driven by the same scheduler a server uses

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use gamemaster::cli::{Cli, Commands, CountdownArgs, Display, RenderArgs};
use gamemaster::{
    Audience, ChannelTransport, ColorScheme, CountdownRequest, CountdownStatus, LocalRegistry,
    ProgressRenderer, TimerConfig, TimerScheduler, TokioTickScheduler, DEFAULT_NOTCHES,
};

/// Name of the single viewer the terminal stands in for.
const CONSOLE_VIEWER: &str = "Console";

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Render(args)) => {
            render_frame(&args);
        }
        Some(Commands::Countdown(args)) => {
            run_countdown(args).await?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Renders one frame and prints it.
fn render_frame(args: &RenderArgs) {
    let renderer = ProgressRenderer::new(
        args.notches.unwrap_or(DEFAULT_NOTCHES),
        ColorScheme::default(),
    );
    let frame = renderer.render(args.remaining, args.total);
    let text = match &args.label {
        Some(label) => renderer.compose(&frame, label),
        None => frame.rendered_text,
    };
    Display::show_frame(&text, args.raw);
}

/// Runs a countdown to completion or until Ctrl-C.
async fn run_countdown(args: CountdownArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => TimerConfig::default(),
    };
    if let Some(notches) = args.notches {
        config.notches = notches;
    }
    let tick = config.host_tick_duration();

    let host = TokioTickScheduler::try_current(tick).context("No tokio runtime available")?;
    let (transport, receiver) = ChannelTransport::unbounded();
    let registry = Arc::new(LocalRegistry::new());
    let viewer = registry.join(CONSOLE_VIEWER);
    let timers = TimerScheduler::new(Arc::new(host), Arc::new(transport), registry, config)
        .context("Invalid timer configuration")?;

    // Display commands are printed on their own thread, like a server
    // applying them on its main thread.
    let raw = args.raw;
    let printer = std::thread::spawn(move || {
        for command in receiver.iter() {
            Display::show_command(&command, raw);
        }
    });

    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    let request = CountdownRequest::new(args.seconds, args.title)
        .with_placeholders(args.placeholders.into_iter().collect())
        .on_complete(move || {
            let _ = done_tx.send(());
        });
    let handle = if args.overlay {
        timers.start_overlay(viewer, request)?
    } else {
        timers.start_bar(request, Audience::Broadcast)?
    };
    tracing::info!(countdown = %handle.id(), seconds = args.seconds, "countdown started");

    tokio::select! {
        _ = done_rx => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            handle.cancel();
            while !handle.is_finished() {
                tokio::time::sleep(tick).await;
            }
        }
    }

    // The printer exits once every transport clone is gone.
    drop(timers);
    tokio::task::spawn_blocking(move || printer.join())
        .await
        .context("Failed to join display thread")?
        .map_err(|_| anyhow::anyhow!("Display thread panicked"))?;

    match handle.status() {
        CountdownStatus::Completed => Display::show_completed(),
        _ => Display::show_cancelled(),
    }
    Ok(())
}

/// Loads a timer configuration from a JSON file.
fn load_config(path: &Path) -> Result<TimerConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: TimerConfig = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    Ok(config)
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
