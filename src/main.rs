mod app;
mod config;
mod dialog;
mod form;
mod notice;
mod page;
mod scheduler;
mod storage;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use config::AppConfig;
use page::{snapshot::SnapshotBackend, Backend, BackendError, Location, Page};
use storage::{draft::DraftCache, FileStore, MemoryStore};

#[derive(Parser, Debug)]
#[command(name = "foodbridge")]
#[command(version = "0.1.0")]
#[command(about = "Terminal dashboard for sharing surplus food listings")]
struct Args {
    /// Page snapshot (JSON) to render
    #[arg(short, long)]
    page: Option<PathBuf>,

    /// Append every form post to this file as a JSON line
    #[arg(short, long)]
    outbox: Option<PathBuf>,

    /// Location to open, e.g. "/dashboard?success=created"
    #[arg(short, long, default_value = "/dashboard")]
    location: String,

    /// Config file (default: ~/.config/foodbridge/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective config and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    if args.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let backend: Arc<dyn Backend> = Arc::new(SnapshotBackend::new(args.page, args.outbox));
    let location = Location::parse(&args.location);

    // Fail before touching the terminal if the first page can't be rendered
    let page = load_page(backend.clone(), location.clone())
        .await
        .with_context(|| format!("loading {}", location))?;

    run_tui(backend, config, page, location).await
}

/// The terminal belongs to the UI, so logs go to a file
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("foodbridge=info"));

    let log_file = dirs::data_dir()
        .map(|dir| dir.join("foodbridge"))
        .and_then(|dir| std::fs::create_dir_all(&dir).ok().map(|_| dir.join("foodbridge.log")))
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    match log_file {
        Some(file) => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .with(filter)
            .init(),
        None => tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(io::sink))
            .with(filter)
            .init(),
    }
}

async fn load_page(backend: Arc<dyn Backend>, location: Location) -> Result<Page, BackendError> {
    match tokio::task::spawn_blocking(move || backend.load(&location)).await {
        Ok(result) => result,
        Err(e) => Err(BackendError::Worker(e.to_string())),
    }
}

/// A fresh view of the draft store for every page
fn open_drafts(config: &AppConfig) -> DraftCache {
    let path = match &config.storage_path {
        Some(path) => Ok(path.clone()),
        None => FileStore::default_path(),
    };

    match path.and_then(FileStore::open) {
        Ok(store) => DraftCache::new(Box::new(store), config.draft_prefix.clone()),
        Err(e) => {
            // No local storage: drafts only live as long as the process
            tracing::warn!("Draft storage unavailable: {}", e);
            DraftCache::new(Box::new(MemoryStore::new()), config.draft_prefix.clone())
        }
    }
}

async fn run_tui(
    backend: Arc<dyn Backend>,
    config: AppConfig,
    page: Page,
    location: Location,
) -> Result<()> {
    ui::init_theme(theme::Theme::from_config(&config.theme));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    // Terminals speaking the kitty protocol report Super (Cmd) for shortcuts
    let enhanced_keys = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let columns = terminal.size()?.width;
    let drafts = open_drafts(&config);
    let mut app = App::load(page, location, config.clone(), drafts, columns, Instant::now());

    // Main loop
    let result = run_app(&mut terminal, &mut app, backend, &config).await;

    // Restore terminal
    if enhanced_keys {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    backend: Arc<dyn Backend>,
    config: &AppConfig,
) -> Result<()> {
    let mut in_flight: Option<JoinHandle<Result<Location, BackendError>>> = None;

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Some(message) = app.take_desktop_notice() {
            if let Err(e) = notify("FoodBridge", &message) {
                tracing::warn!("Desktop notification failed: {}", e);
            }
        }

        if event::poll(std::time::Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key, Instant::now());
                }
                Event::Paste(text) => app.handle_paste(&text),
                Event::Resize(columns, _) => app.resize(columns),
                _ => {}
            }
        }

        if app.should_quit {
            app.teardown();
            return Ok(());
        }

        // One form post at a time, the page stays live meanwhile
        if in_flight.is_none() {
            if let Some(navigation) = app.take_navigation() {
                let backend = backend.clone();
                in_flight = Some(tokio::task::spawn_blocking(move || backend.submit(&navigation)));
            }
        }

        if in_flight.as_ref().is_some_and(|handle| handle.is_finished()) {
            if let Some(handle) = in_flight.take() {
                let outcome = match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(BackendError::Worker(e.to_string())),
                };
                let redirect = match outcome {
                    Ok(location) => load_page(backend.clone(), location.clone())
                        .await
                        .map(|page| (page, location)),
                    Err(e) => Err(e),
                };

                match redirect {
                    Ok((page, location)) => {
                        app.teardown();
                        let columns = terminal.size()?.width;
                        *app = App::load(
                            page,
                            location,
                            config.clone(),
                            open_drafts(config),
                            columns,
                            Instant::now(),
                        );
                    }
                    Err(e) => {
                        tracing::error!("Form post failed: {}", e);
                        app.navigation_failed(&e.to_string(), Instant::now());
                    }
                }
            }
        }

        app.tick(Instant::now());
    }
}

fn notify(summary: &str, body: &str) -> Result<()> {
    notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("dialog-information")
        .show()?;
    Ok(())
}
