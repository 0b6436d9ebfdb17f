//! repograph CLI - Deterministic repository structure assessments
//!
//! Scans a repository, links files to the projects described by a catalog and
//! prints metrics, dependency summaries and structural, architecture and
//! modernization signals.

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::assess::AssessOptions;
use output::OutputFormat;

/// Deterministic repository structure assessments.
#[derive(Parser)]
#[command(name = "repograph")]
#[command(author, version)]
#[command(about = "Deterministic repository structure assessments")]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  repograph assess . --catalog projects.json
  repograph assess . --format json --assessed-at 2026-01-01T00:00:00Z
  repograph hash .
  repograph assess . --since $(repograph hash . --compact)")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the repository graph and report it
    #[command(visible_alias = "a")]
    Assess {
        /// Repository root (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// JSON project catalog (projects, dependencies, technologies)
        #[arg(short, long)]
        catalog: Option<String>,

        /// Repository name (defaults to the directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Branch recorded on the result
        #[arg(long)]
        branch: Option<String>,

        /// Resolved commit recorded on the result
        #[arg(long)]
        commit: Option<String>,

        /// TOML file with analysis rules (replaces the config's [rules])
        #[arg(long)]
        rules: Option<String>,

        /// Previous repository hash; skip analysis when content is unchanged
        #[arg(long, value_name = "HASH")]
        since: Option<String>,

        /// Timestamp for the graph metadata (RFC 3339)
        #[arg(long, value_name = "TIMESTAMP")]
        assessed_at: Option<String>,

        /// Minified JSON, borderless tables
        #[arg(long)]
        compact: bool,

        /// Fail on .repograph.toml errors instead of silently using defaults
        #[arg(long)]
        strict: bool,
    },

    /// Print the repository content hash
    #[command(visible_alias = "h")]
    Hash {
        /// Repository root (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Repository name (defaults to the directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Print only the hash
        #[arg(long)]
        compact: bool,

        /// Fail on .repograph.toml errors instead of silently using defaults
        #[arg(long)]
        strict: bool,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            let _ = Cli::command().print_help();
            println!();
            return Ok(());
        }
    };

    match command {
        Commands::Assess {
            path,
            catalog,
            name,
            branch,
            commit,
            rules,
            since,
            assessed_at,
            compact,
            strict,
        } => commands::assess::run(
            AssessOptions {
                path,
                catalog,
                name,
                branch,
                commit,
                rules,
                since,
                assessed_at,
                compact,
                strict,
            },
            cli.format,
        ),
        Commands::Hash {
            path,
            name,
            compact,
            strict,
        } => commands::hash::run(&path, name.as_deref(), strict, compact, cli.format),
    }
}
