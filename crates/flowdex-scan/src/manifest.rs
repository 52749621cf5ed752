//! Dependency manifest reading.
//!
//! Two manifest forms are recognized at the scan root: `Pipfile` (structured
//! TOML; the keys of its `[packages]` table are the declared identifiers)
//! and `requirements.txt` (line oriented; the identifier is the leading
//! token up to the first version-constraint operator). `Pipfile` takes
//! priority when both exist. Version specifiers are discarded either way.

use std::path::Path;

use tracing::debug;

use flowdex_core::ScanError;

use crate::error::FatalError;

/// Structured manifest file name.
pub const PIPFILE: &str = "Pipfile";

/// Plain-list manifest file name.
pub const REQUIREMENTS: &str = "requirements.txt";

/// Characters that begin a version constraint in a plain-list line.
const VERSION_OPERATORS: [char; 4] = ['~', '=', '<', '>'];

/// Outcome of reading the manifest.
///
/// No manifest is a valid outcome (empty identifier list). Malformed content
/// yields an empty list plus a `ManifestUnreadable` ledger entry; the scan
/// proceeds with first-party modules only.
#[derive(Debug, Default)]
pub struct DeclaredDependencies {
    /// Declared identifiers, in manifest order.
    pub identifiers: Vec<String>,
    /// Ledger entry describing malformed content, if any.
    pub error: Option<ScanError>,
}

/// Read declared dependency identifiers from the manifest at the scan root.
///
/// A manifest that exists but cannot be read at the file-system level is a
/// fatal error; everything else degrades.
pub fn read_declared(root: &Path) -> Result<DeclaredDependencies, FatalError> {
    let pipfile = root.join(PIPFILE);
    if pipfile.is_file() {
        let content =
            std::fs::read_to_string(&pipfile).map_err(|source| FatalError::ManifestIo {
                path: pipfile.clone(),
                source,
            })?;
        return Ok(parse_pipfile(&content));
    }

    let requirements = root.join(REQUIREMENTS);
    if requirements.is_file() {
        let content =
            std::fs::read_to_string(&requirements).map_err(|source| FatalError::ManifestIo {
                path: requirements.clone(),
                source,
            })?;
        return Ok(parse_requirements(&content));
    }

    debug!(root = %root.display(), "no dependency manifest found");
    Ok(DeclaredDependencies::default())
}

/// Parse Pipfile content: the `[packages]` table keys are the identifiers.
fn parse_pipfile(content: &str) -> DeclaredDependencies {
    match content.parse::<toml::Value>() {
        Ok(value) => {
            let identifiers = value
                .get("packages")
                .and_then(|section| section.as_table())
                .map(|table| table.keys().cloned().collect())
                .unwrap_or_default();
            DeclaredDependencies {
                identifiers,
                error: None,
            }
        }
        Err(err) => DeclaredDependencies {
            identifiers: Vec::new(),
            error: Some(ScanError::manifest_unreadable(PIPFILE, err.to_string())),
        },
    }
}

/// Parse requirements content: one identifier per non-blank, non-comment
/// line, up to the first of `~ = < >`.
fn parse_requirements(content: &str) -> DeclaredDependencies {
    let mut identifiers = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let token = line
            .split(VERSION_OPERATORS)
            .next()
            .unwrap_or("")
            .trim();
        if !token.is_empty() {
            identifiers.push(token.to_string());
        }
    }
    DeclaredDependencies {
        identifiers,
        error: None,
    }
}
