//! Scan orchestration.
//!
//! Composes manifest reading, environment resolution, module discovery and
//! signature extraction into one `ScanResult`. Discovery and extraction run
//! on a single logical thread: ordering stays deterministic and the
//! extraction sequence matches the sorted module list. Failures recorded in
//! the ledger never abort the scan; only a missing root or an I/O-unreadable
//! manifest escalates.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info, warn};

use flowdex_core::{ModulePath, ScanResult};

use crate::error::FatalError;
use crate::{discover, environment, extract, manifest};

/// Options for a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Exclusion pattern matched against bare module/package names.
    pub exclude: Option<String>,
}

impl ScanOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the exclusion pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude = Some(pattern.into());
        self
    }
}

/// Scan a project root and return the catalog plus the error ledger.
///
/// The returned catalog is always usable, possibly partial. Zero discovered
/// modules is an empty, non-error result.
pub fn scan_project(root: &Path, options: &ScanOptions) -> Result<ScanResult, FatalError> {
    if !root.is_dir() {
        return Err(FatalError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let exclude = options
        .exclude
        .as_deref()
        .map(Regex::new)
        .transpose()?;

    info!(root = %root.display(), "scanning project");
    let mut result = ScanResult::new();

    // Declared dependencies. Malformed content degrades to first-party only.
    let declared = manifest::read_declared(&root)?;
    if let Some(error) = declared.error {
        warn!(%error, "manifest unreadable, continuing with first-party modules");
        result.record(error);
    }

    // Resolve the project environment; per-identifier failures never block
    // first-party extraction.
    let env = environment::resolve(&root, &declared.identifiers);
    for error in env.errors {
        warn!(%error, "dependency resolution failed");
        result.record(error);
    }

    // Discovery roots: first-party packages, then resolved top-level names.
    let mut roots: Vec<(String, PathBuf)> = discover::first_party_roots(&root);
    for dependency in &env.resolved {
        for top_level in &dependency.top_levels {
            roots.push((top_level.name.clone(), top_level.dir.clone()));
        }
    }

    // Scan-scoped registry: a module reachable via two discovery roots is
    // extracted exactly once.
    let mut visited: BTreeSet<ModulePath> = BTreeSet::new();
    for (name, dir) in roots {
        for module in discover::discover_package(&dir, &name, exclude.as_ref()) {
            if !visited.insert(module.path.clone()) {
                debug!(module = %module.path, "already visited, skipping");
                continue;
            }
            match extract::extract_module(&module.path, &module.file) {
                Ok(functions) => {
                    debug!(module = %module.path, count = functions.len(), "module extracted");
                    for function in functions {
                        if let Some(previous) = result.catalog.insert(function) {
                            warn!(function = %previous, "redefinition across extraction, later wins");
                        }
                    }
                }
                Err(error) => {
                    warn!(%error, "module failed to load");
                    result.record(error);
                }
            }
        }
    }

    info!(
        functions = result.catalog.len(),
        errors = result.errors.len(),
        "scan complete"
    );
    Ok(result)
}
