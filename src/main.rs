//! CLI entry point for the profile finder.

use std::io::{self, IsTerminal};

use anyhow::Result;
use profile_finder_core::{ScanMode, ShutdownSignal};
use tracing::{debug, info};

mod app;
mod app_config;
mod cli;

use app::App;
use app::config_runtime::{RunSettings, parse_cli_with_sources};
use app::signals::spawn_signal_listener;
use app::terminal::{
    init_tracing, is_dumb_terminal, no_color_env_requested, resolve_log_level,
    should_use_progress_bar,
};
use app_config::load_default_file_config;
use cli::Command;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let (cli, sources) = parse_cli_with_sources();
    let loaded = load_default_file_config()?;
    let file_config = loaded.config.as_ref();

    let dumb_terminal = is_dumb_terminal();
    let (default_level, force_cli_level) = resolve_log_level(
        cli.verbose,
        cli.quiet,
        file_config.and_then(|config| config.verbosity),
    );
    init_tracing(
        default_level,
        force_cli_level,
        no_color_env_requested() || dumb_terminal,
    );

    debug!(?cli, config_path = ?loaded.path, "CLI arguments parsed");
    let settings = RunSettings::resolve(&cli, &sources, file_config)?;
    debug!(?settings, "effective settings");
    info!("Profile finder starting");

    let shutdown = ShutdownSignal::new();
    spawn_signal_listener(shutdown.clone());

    let use_progress_bar =
        should_use_progress_bar(io::stderr().is_terminal(), cli.quiet, dumb_terminal);
    let mut app = App::new(settings, shutdown, cli.quiet, use_progress_bar);

    match cli.command {
        Some(Command::Email { addresses }) => app.run_batch(addresses, ScanMode::Email).await?,
        Some(Command::Username { names }) => app.run_batch(names, ScanMode::Username).await?,
        Some(Command::Instagram {
            session_file,
            target,
        }) => {
            app.run_instagram(&session_file, &target).await?;
        }
        None => app.run_menu().await?,
    }

    Ok(())
}
