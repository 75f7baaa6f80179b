//! Envelope - 1Password items as .env files
//!
//! Pick a vault, pick an item, name a file. Envelope asks the 1Password CLI
//! for the item and writes its fields as `KEY="VALUE"` lines, grouped by
//! section.

mod app;
mod dispatch;
mod input;
mod ui;

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event as TermEvent, KeyEventKind},
    execute,
    style::Stylize,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use app::{App, Effect, Event, Outcome};
use dispatch::Dispatcher;

/// How long to wait for a key before redrawing (drives the spinner)
const TICK_RATE: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "envelope")]
#[command(about = "Turn a 1Password item into a .env file")]
#[command(version)]
#[command(after_help = r#"REQUIRES:
    The 1Password CLI (`op`) on your PATH, signed in.

EXAMPLES:
    envelope                        # Ask for everything interactively
    envelope --vault Work           # Start with the vault filled in
    envelope --file .env.local      # Start with the file name filled in
    envelope --log-file envelope.log --log-level debug

KEY BINDINGS:
    Enter       Submit / select
    j/k, Up/Dn  Move through the item list
    Ctrl+C      Quit without writing anything

OUTPUT:
    The file is written to the current directory. Fields are grouped by
    section under `# <section>` headings; notes and empty fields are skipped."#)]
struct Args {
    /// Vault name to pre-fill
    #[arg(long)]
    vault: Option<String>,

    /// File name to pre-fill (default: .env)
    #[arg(long)]
    file: Option<String>,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. "info" or "envelope=debug"
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let op = match envelope_core::process::locate_op() {
        Ok(path) => path,
        Err(err) => {
            println!("\n{}", format!("Error: {err}").red().bold());
            println!(
                "{}",
                "Please install it to continue: https://1password.com/downloads/cli/".dark_grey()
            );
            std::process::exit(1);
        }
    };

    let working_dir = std::env::current_dir().context("failed to read current directory")?;
    let mut app = App::new(working_dir);
    if let Some(vault) = &args.vault {
        app = app.with_vault(vault);
    }
    if let Some(file) = &args.file {
        app = app.with_file_name(file);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(run_app(&mut terminal, app, op));
    // Dropping the runtime cancels whatever is still in flight
    drop(rt);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let outcome = result?;
    report(&outcome);
    if matches!(outcome, Outcome::Failed(_)) {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let filter = EnvFilter::try_new(&args.log_level)
        .with_context(|| format!("invalid log filter '{}'", args.log_level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// The event loop. Owns the `App` for the whole session.
async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    op: PathBuf,
) -> Result<Outcome> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    dispatch::forward_signals(tx.clone()).context("failed to install signal handlers")?;
    let dispatcher = Dispatcher::new(op, tx);

    info!("session started");

    while !app.should_quit() {
        terminal.draw(|f| ui::draw(f, &app))?;

        let mut events = Vec::new();
        if event::poll(TICK_RATE)? {
            if let TermEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    events.push(Event::Key(key));
                }
            }
        } else {
            events.push(Event::Tick);
        }

        app = step(app, &mut rx, events, &dispatcher);

        // Let dispatcher tasks make progress between polls
        tokio::task::yield_now().await;
    }

    info!(screen = ?app.screen, "session ended");
    Ok(app.into_outcome())
}

/// Apply queued completions and signals, then terminal input, stopping as
/// soon as the session is over.
fn step(
    mut app: App,
    rx: &mut UnboundedReceiver<Event>,
    input: Vec<Event>,
    dispatcher: &Dispatcher,
) -> App {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events.extend(input);

    for event in events {
        let (next, effects) = app.update(event);
        app = next;
        for effect in effects {
            match effect {
                Effect::Dispatch(request) => dispatcher.dispatch(request),
                Effect::Quit => debug!("quit requested"),
            }
        }
        if app.should_quit() {
            break;
        }
    }
    app
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Finished { vault, item, path } => {
            println!("{}", "✓ Success!".green().bold());
            println!("{}{}", "Vault: ".grey(), vault.as_str().cyan().bold());
            println!("{}{}", "Item: ".grey(), item.as_str().cyan().bold());
            println!();
            println!("Your .env file was created at:");
            println!("{}", path.display().to_string().green());
        }
        Outcome::Failed(err) => {
            println!("{}", "✗ Oh no! An error occurred.".red().bold());
            println!("{}", err.to_string().red());
        }
        Outcome::Cancelled => println!("\nOperation cancelled."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent};

    #[tokio::test]
    async fn test_interrupt_on_channel_cancels_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(PathBuf::from("op"), tx.clone());
        let app = App::new("/work").with_vault("Personal");

        tx.send(Event::Interrupt).unwrap();
        let app = step(app, &mut rx, vec![Event::Key(KeyEvent::from(KeyCode::Enter))], &dispatcher);

        // The interrupt wins before the queued Enter can start a listing
        assert!(app.should_quit());
        assert!(app.selected_vault.is_none());
        assert!(matches!(app.into_outcome(), Outcome::Cancelled));
    }

    #[tokio::test]
    async fn test_step_without_events_keeps_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(PathBuf::from("op"), tx);

        let app = step(App::new("/work"), &mut rx, vec![Event::Tick], &dispatcher);
        assert!(!app.should_quit());
    }
}
