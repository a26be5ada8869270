mod board;
mod card;
mod client;
mod commands;
mod config;
mod error;
mod events;
mod form;
mod sync;
mod task;
mod ui;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::board::TaskBoard;
use crate::client::TaskClient;
use crate::commands::{Args, Command};
use crate::config::{Config, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut cfg = Config::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(url) = args.api_url {
        cfg.api.base_url = url;
    }

    let command = args.command.unwrap_or(Command::Tui);
    let interactive = command == Command::Tui;
    let _guard = init_tracing(&cfg.logging, interactive)?;
    tracing::info!(base_url = %cfg.api.base_url, ?command, "starting taskboard");

    let client = TaskClient::new(cfg.api.base_url);
    if interactive {
        run_tui(&client).await
    } else {
        commands::run(command, &client, &mut io::stdout().lock()).await
    }
}

async fn run_tui(client: &TaskClient) -> anyhow::Result<()> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    enter_screen(&mut stdout)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut board = TaskBoard::new();
    let result = ui::run_app(&mut terminal, &mut board, client).await;

    // Restore terminal
    disable_raw_mode()?;
    leave_screen(terminal.backend_mut())?;
    terminal.show_cursor()?;

    result.context("terminal UI failed")
}

/// Mouse reporting stays off so the terminal keeps native text selection.
fn enter_screen(w: &mut impl Write) -> io::Result<()> {
    execute!(w, EnterAlternateScreen)
}

fn leave_screen(w: &mut impl Write) -> io::Result<()> {
    execute!(w, LeaveAlternateScreen)
}

/// The board draws over the whole terminal, so it always logs to a file:
/// the configured directory, or the temp dir when none is set.
fn init_tracing(cfg: &LoggingConfig, interactive: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&cfg.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let directory = cfg
        .directory
        .clone()
        .or_else(|| interactive.then(std::env::temp_dir));

    match directory {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(&dir, &cfg.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(io::stderr))
                .try_init()?;
            Ok(None)
        }
    }
}
