use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Mutex;
use studyplanner::app::App;
use studyplanner::progress::Progress;
use studyplanner::storage::SqliteStore;
use studyplanner::{config, event, state};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Install panic handler to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(info);
    }));

    let args = config::CliArgs::parse();
    let cfg = config::load_config(args.config.as_ref());
    let resolved = config::resolve(&args, &cfg);

    fs::create_dir_all(&resolved.data_dir).with_context(|| {
        format!(
            "Failed to create data directory '{}'",
            resolved.data_dir.display()
        )
    })?;

    // Logs go to a file so they never draw over the terminal UI
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(resolved.log_path())
        .context("Failed to open log file")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let store = SqliteStore::open(&resolved.progress_db_path())
        .context("Failed to open progress database")?;
    let progress = Progress::load(store);

    let mut app = App::new(progress, resolved.notify.clone());

    // Restore saved view state (before CLI overrides)
    let view_path = resolved.view_state_path();
    app.restore_view_state(&state::load_state(&view_path));

    // CLI/config overrides take precedence
    if resolved.explicit_theme {
        app.set_theme(resolved.theme);
    }
    if let Some(ref code) = resolved.combo {
        app.apply_combo(code);
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    tracing::info!(catalog = %resolved.catalog, "Starting");
    let result = event::run_loop(&mut terminal, &mut app, resolved.catalog.clone());

    // Terminal teardown
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    state::save_state(&view_path, &app.to_view_state());

    if let Err(err) = result {
        eprintln!("Error: {}", err);
    }

    Ok(())
}
