//! ffs-update - FFS proposal feed builder
//!
//! Collects proposals from two places and writes the staged feed the
//! Jekyll site renders:
//! - Ideas: open merge requests on the proposals repository, each adding
//!   exactly one new markdown document
//! - Funding Required / Work in Progress: merged projects from the database
//!
//! One invocation takes one snapshot of both sources, writes `ffs.json`
//! and exits.

mod config;
mod db;
mod error;
mod feed;
mod gitlab;
mod intake;
mod models;
mod projector;
mod storage;

use crate::config::Settings;
use crate::db::PgRecordStore;
use crate::feed::FeedAssembler;
use crate::gitlab::GitLabClient;
use crate::projector::StageProjector;
use crate::storage::{FeedStorage, PutOutcome, FEED_ARTIFACT};
use clap::Parser;
use std::io::Write;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ffs-update")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Update the proposal feed (ffs.json) used by the site", long_about = None)]
struct Cli {
    /// Print the feed to stdout instead of writing it to storage
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing();

    let settings = Settings::load()?;
    info!("Configuration loaded (GitLab project {})", settings.gitlab.project_id);

    let pool = db::connect(&settings.database).await?;
    let store = PgRecordStore::new(pool);
    let source = GitLabClient::new(&settings.gitlab)?;
    let projector = StageProjector::new(settings.app.url.clone());

    let document = FeedAssembler::new(&source, &store, projector)
        .assemble()
        .await?;
    let rendered = feed::render(&document)?;

    if cli.dry_run {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&rendered)?;
        stdout.write_all(b"\n")?;
        return Ok(());
    }

    let storage = FeedStorage::new(settings.storage.dir.clone());
    match storage.put(FEED_ARTIFACT, &rendered)? {
        PutOutcome::Written { path, digest } => info!(
            "Feed updated: {} entries -> {} ({})",
            document.entry_count(),
            path.display(),
            &digest[..12]
        ),
        PutOutcome::Unchanged { path, .. } => {
            info!("Feed unchanged: {}", path.display())
        }
    }

    Ok(())
}

/// Initialize tracing with structured logging on stderr
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ffs_update=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .init();
}
