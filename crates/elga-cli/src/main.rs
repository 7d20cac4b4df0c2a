//! Elga CLI - Operator tooling for the Elga website

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{generate, i18n, providers};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "elga")]
#[command(about = "Asset generation and message bundle tooling for the Elga website", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the images of a collection, skipping ones already on disk
    Generate {
        /// Built-in collection to run (photo, watercolor)
        #[arg(long, conflicts_with = "jobs")]
        collection: Option<String>,

        /// Path to a custom job list TOML
        #[arg(long)]
        jobs: Option<PathBuf>,

        /// Style guide TOML applied to every prompt
        #[arg(long)]
        style: Option<PathBuf>,

        /// Provider to use (openai, imagen, mock)
        #[arg(long)]
        provider: Option<String>,

        /// Output directory for generated images
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pause between provider calls, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Regenerate images that already exist
        #[arg(long)]
        overwrite: bool,

        /// Only run the named job (repeatable)
        #[arg(long)]
        only: Vec<String>,

        /// Read configuration from this file instead of the layered lookup
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List generation providers and whether they can be used
    Providers,

    /// Message bundle operations
    #[command(subcommand)]
    I18n(i18n::I18nCommands),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Generate {
            collection,
            jobs,
            style,
            provider,
            output,
            delay_ms,
            overwrite,
            only,
            config,
        } => generate::run(generate::GenerateArgs {
            collection,
            jobs,
            style,
            provider,
            output,
            delay_ms,
            overwrite,
            only,
            config,
        }),
        Commands::Providers => providers::run(),
        Commands::I18n(cmd) => i18n::run(cmd),
    }
}
