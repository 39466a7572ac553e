//! Alumni ID maker.
//!
//! Collects alumni form data, submits it to the PDF-generating webhook,
//! and manages the identity cards stored on this device.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use storage::{FsBlobStore, SqliteRecordIndex, create_pool, run_migrations};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod commands;

/// Alumni ID maker
#[derive(Parser)]
#[command(name = "alumni-id")]
#[command(about = "Generate and manage digital alumni ID cards")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new alumni ID from a form payload
    Generate {
        /// Path to the JSON form payload
        #[arg(short, long, conflicts_with = "edit")]
        form: Option<PathBuf>,

        /// Re-submit the stored form of an existing record (creates a
        /// new record)
        #[arg(short, long)]
        edit: Option<Uuid>,

        /// Also write the generated PDF to this path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List the IDs generated on this device, newest first
    Dashboard,

    /// Export a previously generated ID card PDF
    Export {
        /// Record id shown on the dashboard
        #[arg(short, long)]
        id: Uuid,

        /// Where to write the PDF
        #[arg(short, long, default_value = "alumni-id.pdf")]
        out: PathBuf,
    },

    /// Run database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.data_dir)?;

    let pool = create_pool(&config.db_path()).await?;
    run_migrations(&pool).await?;

    let index = SqliteRecordIndex::new(pool.clone());
    let blobs = FsBlobStore::open(&config.data_dir)?;

    match cli.command {
        Commands::Generate { form, edit, out } => {
            commands::generate::run(&config, index, blobs, form.as_deref(), edit, out.as_deref())
                .await?;
        }
        Commands::Dashboard => {
            commands::dashboard::run(&index).await;
        }
        Commands::Export { id, out } => {
            commands::export::run(&index, &blobs, id, &out).await?;
        }
        Commands::Migrate => {
            run_migrations(&pool).await?;
            info!("Migrations completed successfully");
        }
    }

    Ok(())
}
