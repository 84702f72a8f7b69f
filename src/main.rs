//! Binary entry point for snippets.
//!
//! This binary provides the CLI interface for the snippet store.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use snippets::observability::{self, LoggingConfig};
use snippets::{SnippetService, SnippetsConfig, open_store};
use std::path::PathBuf;
use std::process::ExitCode;

/// Snippets - store and retrieve snippets of text.
#[derive(Parser, Debug)]
#[command(name = "snippets")]
#[command(author, version, about = "Store and retrieve snippets of text", long_about = None)]
struct Cli {
    /// Force debug-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file (`SNIPPETS_CONFIG_PATH` when absent).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database path or URL (overrides configuration).
    #[arg(short, long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a snippet.
    Put {
        /// Name of the snippet.
        name: String,

        /// Snippet text.
        snippet: String,

        /// Hidden unless specifically requested.
        #[arg(long)]
        hidden: bool,
    },

    /// Retrieve a snippet.
    Get {
        /// Name of the snippet.
        name: String,
    },

    /// Retrieve a catalog of snippets.
    Catalog {
        /// Column to order the catalog by: keyword, message or hidden.
        name: String,
    },

    /// Search through snippets using a pattern.
    Search {
        /// Case-insensitive regular expression matched against snippet text.
        name: String,
    },
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Put { .. } => "put",
            Self::Get { .. } => "get",
            Self::Catalog { .. } => "catalog",
            Self::Search { .. } => "search",
        }
    }
}

/// Main entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let logging = LoggingConfig::from_settings(&config.logging, cli.verbose)
        .and_then(observability::init);
    if let Err(e) = logging {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Loads configuration and applies the `--database` override.
fn load_config(cli: &Cli) -> snippets::Result<SnippetsConfig> {
    let config = SnippetsConfig::load(cli.config.as_deref())?;
    Ok(match &cli.database {
        Some(url) => config.with_database_url(url.clone()),
        None => config,
    })
}

/// Opens the store, runs the selected command, and closes the store.
fn run_command(cli: Cli, config: &SnippetsConfig) -> commands::CommandResult {
    tracing::debug!(command = cli.command.name(), "Parsed command line");

    let service = SnippetService::new(open_store(&config.database)?);
    let mut out = std::io::stdout().lock();

    let result = match &cli.command {
        Commands::Put {
            name,
            snippet,
            hidden,
        } => commands::cmd_put(&service, name, snippet, *hidden, &mut out),
        Commands::Get { name } => commands::cmd_get(&service, name, &mut out),
        Commands::Catalog { name } => commands::cmd_catalog(&service, name, &mut out),
        Commands::Search { name } => commands::cmd_search(&service, name, &mut out),
    };

    // Close even when the command failed; the command's error wins.
    let closed = service.close();
    result?;
    closed?;
    Ok(())
}
