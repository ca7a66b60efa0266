//! # Folio CLI (`folio`)
//!
//! Reads a directory of Markdown documents with metadata headers and
//! prints or exports the rendered records.
//!
//! ## Usage
//!
//! ```bash
//! folio --config ./config/folio.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `folio ids` | List document identifiers |
//! | `folio list` | List documents, newest first |
//! | `folio get <id>` | Print one rendered document |
//! | `folio export` | Write the listing as JSON |
//! | `folio check` | Report documents that cannot be rendered |
//!
//! When the config file does not exist, `./content` is used as the
//! content root with default settings.

use clap::{Parser, Subcommand};
use folio::{check, config, export, get, list};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Folio: render a directory of Markdown documents into ordered,
/// queryable HTML records.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/folio.toml")]
    config: PathBuf,

    /// Override the content root from the config file.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Log filter, e.g. `info` or `folio=debug`. Defaults to `RUST_LOG`,
    /// then `warn`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every document identifier, one per line.
    Ids,

    /// List documents, newest first.
    List {
        /// Print JSON records instead of a table.
        #[arg(long)]
        json: bool,

        /// Skip body rendering.
        #[arg(long)]
        no_body: bool,
    },

    /// Print one rendered document. Exits with status 1 if absent.
    Get {
        /// Document identifier (file name without extension).
        id: String,

        /// Print the JSON record.
        #[arg(long)]
        json: bool,
    },

    /// Export the listing and skipped diagnostics as JSON.
    Export {
        /// Output file. Defaults to stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Skip body rendering.
        #[arg(long)]
        no_body: bool,
    },

    /// Report documents that are dropped from listings, and why.
    /// Exits with status 1 if any are found.
    Check,
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let mut cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        tracing::debug!(path = %cli.config.display(), "config file not found, using defaults");
        config::Config::minimal()
    };
    if let Some(root) = cli.root {
        cfg.content.root = root;
    }

    match cli.command {
        Commands::Ids => {
            list::run_ids(&cfg)?;
        }
        Commands::List { json, no_body } => {
            let with_bodies = cfg.listing.render_bodies && !no_body;
            list::run_list(&cfg, json, with_bodies).await?;
        }
        Commands::Get { id, json } => {
            get::run_get(&cfg, &id, json).await?;
        }
        Commands::Export { output, no_body } => {
            let with_bodies = cfg.listing.render_bodies && !no_body;
            export::run_export(&cfg, output.as_deref(), with_bodies).await?;
        }
        Commands::Check => {
            check::run_check(&cfg).await?;
        }
    }

    Ok(())
}
