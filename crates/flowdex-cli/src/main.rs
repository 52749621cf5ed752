//! Flowdex CLI - scans a Python project into a catalog of callable
//! signatures.
//!
//! The wire payload goes to stdout; diagnostics go to stderr and never
//! interleave with the payload. Individual module failures are reported in
//! the ledger, not the exit code: only a missing root or an I/O-unreadable
//! manifest exits non-zero.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::Level;

mod commands;

use commands::scan;

/// Flowdex - catalog the callable signatures of a Python project.
#[derive(Parser, Debug)]
#[command(
    name = "fdx",
    author,
    version,
    about = "Flowdex: catalog the callable signatures of a Python project",
    long_about = None
)]
struct Cli {
    /// Root of the package tree to scan.
    package_root: PathBuf,

    /// Exclude modules whose bare name matches this regular expression.
    #[arg(short, long)]
    exclude: Option<String>,

    /// Already running inside the resolved project environment; suppresses
    /// re-invocation (prevents infinite re-spawning).
    #[arg(long)]
    in_env: bool,

    /// Pretty-print the payload.
    #[arg(long)]
    pretty: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity; diagnostics go to stderr so the
    // stdout payload stays clean.
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    scan::execute(cli.package_root, cli.exclude, cli.in_env, cli.pretty)
}
