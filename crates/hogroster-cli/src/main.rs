//! hogroster - browse and manage the school roster from the terminal.
//!
//! Fetches the student list and the family reference lists, then runs a
//! line-based command loop over the roster.

mod app;
mod commands;
mod render;
mod utils;

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hogroster_core::{Config, HackedRoster, RosterClient, RosterStore};

use app::{App, Response};
use commands::Command;

// ============================================================================
// Constants
// ============================================================================

/// How often time-based roster effects are checked while waiting for input
const TICK_INTERVAL_MS: u64 = 250;

const LOG_FILE: &str = "hogroster.log";

const PROMPT: &str = "hogroster> ";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to a file so they do not interleave with the prompt. Falls back to
/// stderr when no log directory is available.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = Config::log_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--write-config" {
        return write_config();
    }

    let config = Config::load()?;
    let client = RosterClient::new()?;

    info!(students = %config.students_url, families = %config.families_url, "Loading roster");
    let sources = client
        .fetch_sources(&config)
        .await
        .context("Could not load the student list")?;
    let store = RosterStore::from_sources(sources);

    if args.len() > 1 && args[1] == "--dump" {
        return dump_roster(&store);
    }

    let roster = HackedRoster::new(store, config.hack.clone());
    let mut app = App::new(roster, client, config);

    run_app(&mut app).await?;
    info!("hogroster shutting down");
    Ok(())
}

/// Write the effective configuration to the config file.
fn write_config() -> Result<()> {
    let config = Config::load()?;
    let path = config.save()?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Print the normalized roster as JSON.
fn dump_roster(store: &RosterStore) -> Result<()> {
    let json = serde_json::to_string_pretty(store.students())?;
    println!("{}", json);
    Ok(())
}

/// Read stdin lines on a plain thread; the channel closes on EOF.
fn spawn_input_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "{}", PROMPT)?;
    out.flush()
}

/// Main command loop
async fn run_app(app: &mut App) -> Result<()> {
    let mut out = io::stdout();
    let mut input = spawn_input_reader();
    let mut ticker = tokio::time::interval(Duration::from_millis(TICK_INTERVAL_MS));

    render::render_table(&mut out, app)?;
    prompt(&mut out)?;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = app.tick(Utc::now());
                if removed > 0 {
                    writeln!(out, "\nThe inquisitorial squad has been disbanded ({} removed).", removed)?;
                }
                if app.take_changed() {
                    app.refresh_rows();
                    render::render_table(&mut out, app)?;
                    prompt(&mut out)?;
                }
            }
            line = input.recv() => {
                let Some(line) = line else {
                    writeln!(out)?;
                    break;
                };

                let response = app.handle(Command::parse(&line)).await;
                if matches!(response, Response::Quit) {
                    break;
                }
                // A roster change redraws the table after the response.
                let changed = app.take_changed();
                render_response(&mut out, app, response)?;
                if changed {
                    app.refresh_rows();
                    render::render_table(&mut out, app)?;
                }
                prompt(&mut out)?;
            }
        }
    }

    Ok(())
}

fn render_response(out: &mut impl Write, app: &App, response: Response) -> io::Result<()> {
    match response {
        Response::Table => render::render_table(out, app),
        Response::Detail(id) => match app.roster.get(id) {
            Some(student) => render::render_detail(out, student),
            None => {
                warn!(student = %id, "Detail requested for missing student");
                Ok(())
            }
        },
        Response::Counts => render::render_counts(out, &app.roster.counts()),
        Response::History => render::render_history(out, app),
        Response::Help => writeln!(out, "{}", commands::HELP),
        Response::Message(message) => writeln!(out, "{}", message),
        Response::Toggled {
            student,
            toggle,
            result,
        } => render::render_toggle(out, app, student, toggle, &result),
        Response::Quit | Response::Nothing => Ok(()),
    }
}
