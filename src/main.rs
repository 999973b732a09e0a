mod app;
mod config;
mod error;
mod event;
mod input;
mod scores;
mod sim;
mod ui;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::filter::EnvFilter;

use app::App;
use config::Tuning;
use event::{Event, EventHandler};
use scores::HighScores;

const TICK_RATE_MS: u64 = 16; // ~60 FPS

#[derive(Parser, Debug)]
#[command(name = "rustthrust")]
#[command(version, about = "Land, refuel and shoot beacons in a terminal gravity lander")]
struct Cli {
    /// Tuning file; missing keys keep their defaults
    #[arg(long, default_value = "rustthrust.toml")]
    config: PathBuf,

    /// High-score file (defaults to one next to the executable)
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Log file; the terminal belongs to the game
    #[arg(long, default_value = "rustthrust.log")]
    log: PathBuf,

    /// Seed the level generator for reproducible games
    #[arg(long)]
    seed: Option<u64>,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

type Term = Terminal<CrosstermBackend<io::Stdout>>;

fn run(terminal: &mut Term, app: &mut App) -> anyhow::Result<()> {
    let event_handler = EventHandler::new(TICK_RATE_MS);
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        match event_handler.next()? {
            Event::Tick => app.on_tick(),
            Event::Key(key) => app.on_key(key),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log)?;

    let tuning = Tuning::load_or_default(&cli.config);
    let high_scores = HighScores::load(cli.scores.unwrap_or_else(HighScores::default_path));
    let mut app = App::new(tuning, high_scores, cli.seed);
    tracing::info!("starting (seed {:?})", cli.seed);

    // Setup terminal
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    // Key release events where the terminal supports them; others fall
    // back to the hold window in `input`.
    let keyboard_enhanced = supports_keyboard_enhancement().unwrap_or(false)
        && execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok();
    app.set_key_releases(keyboard_enhanced);
    tracing::info!("keyboard enhancement: {}", keyboard_enhanced);
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal")?;
    terminal.clear()?;

    let result = run(&mut terminal, &mut app);

    // Restore terminal
    if keyboard_enhanced {
        let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);
    }
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    if let Err(e) = &result {
        tracing::warn!("exiting on error: {:#}", e);
    }
    tracing::info!("bye");
    result
}
