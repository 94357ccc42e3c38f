mod app;
mod config;
mod history;
mod scores;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env, Target};
use log::info;
use ratatui::{
    crossterm::{
        self,
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
};
use std::{
    fs::File,
    io::{self, Stdout},
    path::Path,
    time::{Duration, Instant},
};

use crate::{
    app::App,
    config::{Args, Config},
};

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    let config = Config::resolve(&args)?;
    info!("Starting with {:?}", config);

    // Load the map before touching the terminal so errors print normally
    let mut app = App::new(config)?;

    // Set up the terminal
    let mut terminal = setup_terminal()?;

    // Run the main application loop
    let result = run_app(&mut terminal, &mut app);

    // Restore the terminal state
    restore_terminal(&mut terminal)?;

    result
}

/// Logs go to `log_file` if given. The terminal belongs to the UI, so
/// without a file logging stays off unless `RUST_LOG` asks for it.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Builder::from_env(Env::default().default_filter_or("info"))
                .target(Target::Pipe(Box::new(file)))
                .init();
        }
        None => {
            Builder::from_env(Env::default().default_filter_or("off")).init();
        }
    }
    Ok(())
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?; // Put terminal in raw mode
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?; // Use alternate screen and enable mouse capture
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into) // Map io::Error to anyhow::Error
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = app.config().tick_rate(); // One zombie step per tick
    let mut last_tick = Instant::now();

    loop {
        // Draw the UI
        terminal.draw(|f| ui::ui(f, app))?;

        // Calculate timeout for event polling
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        // Poll for events (keyboard, mouse, etc.)
        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }

        // Update application state if enough time has passed
        if last_tick.elapsed() >= tick_rate {
            // The clock stops while a popup is up
            if app.overlay == app::Overlay::None {
                app.tick();
            }
            last_tick = Instant::now();
        }

        // Exit loop if requested
        if app.should_quit {
            break;
        }
    }
    Ok(())
}
