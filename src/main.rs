mod app;
mod ui;

use std::fs::OpenOptions;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use app::{App, Screen};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tui_geoquiz::data::{FileProvider, GeoDataProvider, StaticProvider};
use tui_geoquiz::quiz::QuestionKind;
use tui_geoquiz::stats::{JsonFileStatsStore, StatsStore};
use tui_geoquiz::telemetry::{LogSink, TelemetrySink};
use tui_geoquiz::Config;

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config)?;
    info!(data_dir = %config.data_dir.display(), "tui-geoquiz starting");

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, config);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Logs go to a file: the terminal belongs to the UI
fn init_logging(config: &Config) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("Failed to open log file {}", config.log_file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tui_geoquiz=info".parse()?))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Data directory when it has both files, otherwise the built-in world
fn provider(config: &Config) -> Arc<dyn GeoDataProvider> {
    let files = FileProvider::new(&config.data_dir);
    if files.has_data() {
        Arc::new(files)
    } else {
        info!(dir = %config.data_dir.display(), "no data files, using built-in world");
        Arc::new(StaticProvider::builtin())
    }
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => match app.screen {
            Screen::Game => app.abandon(),
            Screen::Results => app.screen = Screen::Home,
            Screen::Home => app.quit(),
        },

        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0, now),
        KeyCode::Right => app.pan(10, 0, now),
        KeyCode::Char('l') if app.screen != Screen::Home => app.pan(10, 0, now),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6, now),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6, now),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        KeyCode::Char(c @ '1'..='8') => {
            if let Some(n) = c.to_digit(10) {
                app.choose_option(n as usize, now);
            }
        }

        KeyCode::Char('r') if app.screen == Screen::Results => app.restart(now),

        KeyCode::Char(c) if app.screen == Screen::Home => {
            let kind = match c {
                'l' => Some(QuestionKind::Location),
                'c' => Some(QuestionKind::Capital),
                'f' => Some(QuestionKind::Flag),
                'p' => Some(QuestionKind::Population),
                _ => None,
            };
            if let Some(kind) = kind {
                app.start_game(kind, now);
            }
        }

        _ => {}
    }
}

/// Handle mouse events for panning, zooming, hovering and answering
fn handle_mouse(app: &mut App, mouse: MouseEvent, now: Instant) {
    // Always track mouse position for cursor marker and hover
    app.set_mouse_pos(mouse.column, mouse.row, now);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row, now),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row, now),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0, now),
        MouseEventKind::ScrollRight => app.pan(15, 0, now),
        MouseEventKind::Down(MouseButton::Left) => app.press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row, now),
        MouseEventKind::Up(MouseButton::Left) => app.release(mouse.column, mouse.row, now),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, config: Config) -> Result<()> {
    let size = terminal.size()?;
    let provider = provider(&config);
    let telemetry: Arc<dyn TelemetrySink> = Arc::new(LogSink);
    let stats: Arc<dyn StatsStore> = Arc::new(JsonFileStatsStore::new(&config.stats_path));
    let start_kind = config.kind;
    let mut app = App::new(config, provider, telemetry, stats, size.width, size.height);

    if let Some(kind) = start_kind {
        app.start_game(kind, Instant::now());
    }

    // Main loop
    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            let now = Instant::now();
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(&mut app, key, now),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse, now),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        // Quiz timers and deferred pointer work
        app.update(Instant::now());

        if app.should_quit {
            break;
        }
    }

    info!("tui-geoquiz exiting");
    Ok(())
}
