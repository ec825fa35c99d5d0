mod report;
mod storage;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use siftcore_config::{DisplayMode, Settings};
use siftcore_query::spawn_indexer;
use siftd::{AppEvent, ContainerSize, FilterSession, MemoryStore, StateStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "siftmini")]
#[command(about = "Filter a notes file and print the resulting list layout")]
struct Cli {
    /// JSON file with the notes, either `{"notes": [...]}` or a bare array
    #[arg(long)]
    notes: PathBuf,

    #[arg(long, default_value = "")]
    query: String,

    /// Only show notes carrying this tag
    #[arg(long, conflicts_with = "trash")]
    tag: Option<String>,

    /// Show the trash instead of live notes
    #[arg(long)]
    trash: bool,

    #[arg(long, default_value_t = 480.0)]
    width: f32,

    #[arg(long, default_value_t = 640.0)]
    height: f32,

    /// condensed, comfy or expanded; defaults to the configured mode
    #[arg(long, value_parser = parse_mode)]
    mode: Option<DisplayMode>,

    /// Settings file; missing files fall back to defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_mode(value: &str) -> Result<DisplayMode, String> {
    DisplayMode::parse(value)
        .ok_or_else(|| format!("unknown display mode `{value}` (condensed, comfy, expanded)"))
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("SIFT_LOG")
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn context_events(cli: &Cli) -> Vec<AppEvent> {
    let mut events = Vec::new();
    if cli.trash {
        events.push(AppEvent::TrashSelected);
    }
    if let Some(tag) = &cli.tag {
        events.push(AppEvent::TagOpened(tag.clone()));
    }
    if !cli.query.is_empty() {
        events.push(AppEvent::QueryChanged(cli.query.clone()));
    }
    events
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    let notes = storage::load_notes(&cli.notes)?;
    tracing::info!(notes = notes.len(), path = %cli.notes.display(), "notes loaded");

    let mut indexer = spawn_indexer();
    let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
    let mut session =
        FilterSession::with_settings(indexer.requests.clone(), store.clone(), &settings);

    let now = Instant::now();
    session.handle_event(
        AppEvent::DisplayModeChanged(cli.mode.unwrap_or(settings.display_mode)),
        now,
    );
    session.handle_event(
        AppEvent::ContainerResized(ContainerSize {
            width: cli.width,
            height: cli.height,
        }),
        now,
    );
    for event in context_events(&cli) {
        session.handle_event(event, now);
    }
    // The bulk load restates the whole context, so its single reply settles
    // the list.
    session.handle_event(AppEvent::RecordsLoaded(notes), now);

    let reply = tokio::time::timeout(REPLY_TIMEOUT, indexer.replies.recv())
        .await
        .context("indexer did not reply in time")?
        .context("indexer stopped before replying")?;
    session.handle_reply(reply, Instant::now());
    session.tick(now + settings.debounce.max_wait());

    report::print(&session, &mut std::io::stdout().lock()).context("writing report")?;
    Ok(())
}
