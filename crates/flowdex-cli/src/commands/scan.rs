//! Scan command implementation.
//!
//! When the project root carries its own virtual environment and this
//! process is not already running inside one, the scanner re-invokes its own
//! executable configured for that environment and forwards the child's
//! payload — the wire codec's process-boundary crossing. The `--in-env` flag
//! is both the child marker and the user-facing suppression switch.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use flowdex_core::ScanResult;
use flowdex_scan::{find_env_root, scan_project, ScanOptions};

/// Environment variable conventionally marking a virtual environment.
const VIRTUAL_ENV: &str = "VIRTUAL_ENV";

/// Execute the scan command.
pub fn execute(
    package_root: PathBuf,
    exclude: Option<String>,
    in_env: bool,
    pretty: bool,
) -> Result<()> {
    // Canonicalize path to handle relative paths
    let root = package_root.canonicalize().unwrap_or(package_root);

    if !in_env {
        if let Some(env_root) = find_env_root(&root) {
            return reinvoke(&root, exclude.as_deref(), &env_root, pretty);
        }
    }

    let mut options = ScanOptions::new();
    if let Some(pattern) = exclude {
        options = options.exclude(pattern);
    }
    let result = scan_project(&root, &options)?;
    emit(&result, pretty)
}

/// Serialize the catalog to stdout; surface the ledger on the diagnostic
/// channel.
fn emit(result: &ScanResult, pretty: bool) -> Result<()> {
    let encoded = if pretty {
        flowdex_wire::encode_pretty(&result.catalog)
    } else {
        flowdex_wire::encode(&result.catalog)
    };

    for error in result.errors.iter().chain(encoded.errors.iter()) {
        warn!(%error, "recorded during scan");
    }

    println!("{}", encoded.payload);
    Ok(())
}

/// Run the scan as a child process configured for the project environment
/// and forward its payload.
fn reinvoke(root: &Path, exclude: Option<&str>, env_root: &Path, pretty: bool) -> Result<()> {
    let exe = std::env::current_exe().context("cannot locate own executable")?;
    info!(env = %env_root.display(), "re-invoking scanner inside project environment");

    let mut command = Command::new(exe);
    command
        .arg(root)
        .arg("--in-env")
        .env(VIRTUAL_ENV, env_root)
        .stdout(Stdio::piped())
        // Child diagnostics pass straight through to our stderr.
        .stderr(Stdio::inherit());
    if let Some(pattern) = exclude {
        command.arg("--exclude").arg(pattern);
    }
    if pretty {
        command.arg("--pretty");
    }

    let output = command
        .output()
        .context("failed to spawn scanner subprocess")?;
    if !output.status.success() {
        bail!("scanner subprocess failed with {}", output.status);
    }

    let payload =
        String::from_utf8(output.stdout).context("subprocess payload is not valid UTF-8")?;
    // Validate the payload crossed the process boundary intact before
    // forwarding it.
    flowdex_wire::decode(payload.trim())
        .context("subprocess payload failed to decode")?;

    print!("{}", payload);
    Ok(())
}
