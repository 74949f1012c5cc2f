use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use speechprep::audio::{FfmpegToolkit, NoopSnrFilter};
use speechprep::catalog::Catalog;
use speechprep::config::Config;
use speechprep::processor::{AudioProcessor, ProcessorConfig};
use speechprep::sanitize::{create_sanitizer, Language};
use speechprep::storage::{HttpObjectStore, LocalObjectStore, ObjectStore};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "speechprep")]
#[command(version, about = "Data preparation utilities for speech dataset pipelines")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Download, convert and chunk a batch of raw audio files
    Process {
        /// Audio ids to process
        #[arg(required = true)]
        audio_ids: Vec<String>,

        /// Origin system the ids belong to
        #[arg(short, long)]
        source: String,

        /// Extension of the raw files
        #[arg(short, long, default_value = "mp3")]
        extension: String,

        /// Disable the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Migrate staged metadata into the permanent catalog tables
    Migrate {
        /// Path to the catalog database (overrides config)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Validate a transcription against a language whitelist
    Sanitize {
        /// Language code: kn, hi
        #[arg(short, long)]
        language: String,

        /// Transcription text
        text: String,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn build_store(config: &Config) -> Result<Arc<dyn ObjectStore>> {
    if let Some(url) = &config.storage_base_url {
        return Ok(Arc::new(HttpObjectStore::new(url.clone())));
    }
    if let Some(root) = &config.local_store_root {
        return Ok(Arc::new(LocalObjectStore::new(root.clone())));
    }
    anyhow::bail!(
        "No object store configured. Set `storage_base_url` or `local_store_root` in the config"
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Command::Process {
            audio_ids,
            source,
            extension,
            no_progress,
        } => {
            config
                .validate_storage()
                .context("Storage configuration invalid")?;
            let store = build_store(&config)?;

            let processor = AudioProcessor::new(
                store,
                Arc::new(FfmpegToolkit::new()),
                Arc::new(NoopSnrFilter),
                ProcessorConfig::from_config(&config),
            )
            .with_progress(!no_progress);

            info!("Source:    {}", source);
            info!("Extension: {}", extension);
            info!("Batch:     {} audio ids", audio_ids.len());

            processor.process(&audio_ids, &source, &extension).await?;
            println!("Processed {} audio ids from {}", audio_ids.len(), source);
        }

        Command::Migrate { db } => {
            let db_path = db
                .or_else(|| config.db_path.clone())
                .context("No database path. Pass --db or set `db_path` in the config")?;
            let catalog = Catalog::open(&db_path)?;

            let watermark = catalog.media_watermark()?;
            info!("Media watermark: {:?}", watermark);

            let copied = catalog.migrate_new_media(watermark)?;
            let speakers = catalog.dedupe_speakers()?;
            println!("Migrated {copied} media rows, inserted {speakers} new speakers");
        }

        Command::Sanitize { language, text } => {
            let language: Language = language.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let sanitizer = create_sanitizer(language);
            let cleaned = sanitizer.sanitize(&text)?;
            println!("{cleaned}");
        }
    }

    Ok(())
}
