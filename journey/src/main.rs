//! Shared Journey story wall TUI.
//!
//! A terminal story wall where students, alumni and faculty leave short
//! stories about the people who shaped their time at university.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line protocol suitable for automated testing:
//!
//! ```bash
//! cargo run -p journey -- --headless --ephemeral
//! ```

mod app;
mod config;
mod events;
mod headless;
mod submission_form;
mod ui;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use journey_core::{FileStorage, JourneySession, KeyValueStorage, MemoryStorage, SessionConfig};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io::{self, stdout};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use app::App;
use config::AppConfig;
use events::{handle_event, EventResult};
use ui::render::render;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let config = match AppConfig::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Run with --help for usage.");
            std::process::exit(1);
        }
    };

    if config.show_help {
        print_help();
        return Ok(());
    }

    init_tracing(&config)?;

    let storage: Box<dyn KeyValueStorage> = if config.ephemeral {
        Box::new(MemoryStorage::new().with_quota(config.storage_quota))
    } else {
        Box::new(FileStorage::new(&config.data_file).with_quota(config.storage_quota))
    };
    let session = JourneySession::new(SessionConfig::new(), storage);
    tracing::info!(
        stories = session.story_count(),
        data_file = %config.data_file.display(),
        ephemeral = config.ephemeral,
        "story wall opened"
    );

    if config.headless {
        return headless::run_headless(session).await.map_err(|e| e.into());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, App::new(session)).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

/// Route logs to stderr in headless mode and to the log file otherwise,
/// since the TUI owns the terminal.
fn init_tracing(config: &AppConfig) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if config.headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        // Pick up finished submissions before drawing
        app.drain_messages();

        terminal.draw(|f| render(f, &app))?;

        // Poll for events with timeout so the submit delay and toast can advance
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            if handle_event(&mut app, ev) == EventResult::Quit {
                return Ok(());
            }
        } else {
            app.tick();
        }

        if app.should_quit {
            return Ok(());
        }

        // Yield so the submit delay task gets a turn
        tokio::task::yield_now().await;
    }
}

fn print_help() {
    println!("共同的旅程 - Shared Journey story wall");
    println!();
    println!("USAGE:");
    println!("  journey [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help          Show this help message");
    println!("  --headless          Run in headless mode (line protocol, no TUI)");
    println!("  --ephemeral         Keep stories in memory only");
    println!("  --data <PATH>       Story file (default: journey-stories.json)");
    println!();
    println!("ENVIRONMENT:");
    println!("  JOURNEY_DATA_FILE       Story file, overridden by --data");
    println!("  JOURNEY_STORAGE_QUOTA   Maximum story file size in bytes (0 = unlimited)");
    println!("  JOURNEY_LOG_FILE        Log file for the TUI (default: journey.log next to the story file)");
    println!("  RUST_LOG                Log filter (default: info)");
    println!();
    println!("EXAMPLES:");
    println!("  journey                                # Interactive TUI mode");
    println!("  journey --data ~/stories.json          # Use a specific story file");
    println!("  journey --headless --ephemeral         # Scriptable, nothing written to disk");
}
