//! Project environment resolution.
//!
//! Declared identifiers are resolved against the project-scoped virtual
//! environment under the scan root — never against the scanning process's
//! own interpreter environment. Resolving the wrong installed version is
//! worse than not resolving at all, so there is no global fallback.
//!
//! An installed distribution's importable top-level names are derived from
//! its `RECORD` file manifest: every `__init__.py` entry (the package-marker
//! file) is collected, the minimum path depth is computed, and every
//! directory at that depth is a top-level name. Ties at equal minimum depth
//! resolve in lexical order.

use std::path::{Path, PathBuf};

use tracing::debug;

use flowdex_core::ScanError;

/// Candidate environment directory names under the scan root, in priority
/// order.
const ENV_DIRS: [&str; 2] = [".venv", "venv"];

/// Marker file identifying a virtual environment directory.
const ENV_MARKER: &str = "pyvenv.cfg";

/// Package-marker file: its presence makes a directory importable.
pub const PACKAGE_MARKER: &str = "__init__.py";

/// One importable top-level name exposed by an installed distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopLevel {
    /// Dotted import name.
    pub name: String,
    /// Directory holding the package.
    pub dir: PathBuf,
}

/// A declared identifier resolved to its installed location.
#[derive(Debug, Clone)]
pub struct ResolvedDependency {
    /// Identifier as declared in the manifest.
    pub identifier: String,
    /// Importable top-level names, lexically ordered.
    pub top_levels: Vec<TopLevel>,
}

/// Everything the locator learned about the project environment.
#[derive(Debug, Default)]
pub struct Environment {
    /// The virtual environment root, when one exists.
    pub env_root: Option<PathBuf>,
    /// The site-packages directory inside it.
    pub site_packages: Option<PathBuf>,
    /// Successfully resolved dependencies.
    pub resolved: Vec<ResolvedDependency>,
    /// One `EnvironmentUnresolved` entry per failed identifier.
    pub errors: Vec<ScanError>,
}

/// Find the project-scoped environment directory under the scan root.
pub fn find_env_root(root: &Path) -> Option<PathBuf> {
    ENV_DIRS
        .iter()
        .map(|name| root.join(name))
        .find(|dir| dir.join(ENV_MARKER).is_file())
}

/// Find the site-packages directory within an environment root.
///
/// Unix layout is `lib/pythonX.Y/site-packages`, Windows `Lib/site-packages`.
/// When several `lib/python*` directories exist, the lexically first with a
/// site-packages directory wins.
pub fn find_site_packages(env_root: &Path) -> Option<PathBuf> {
    let lib = env_root.join("lib");
    if let Ok(entries) = std::fs::read_dir(&lib) {
        let mut versions: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_dir()
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .map(|name| name.starts_with("python"))
                        .unwrap_or(false)
            })
            .collect();
        versions.sort();

        for version_dir in versions {
            let candidate = version_dir.join("site-packages");
            if candidate.is_dir() {
                return Some(candidate);
            }
        }
    }

    let windows = env_root.join("Lib").join("site-packages");
    windows.is_dir().then_some(windows)
}

/// Resolve every declared identifier against the project environment.
///
/// Per-identifier failure is recorded and skipped; it never blocks the rest
/// of the scan.
pub fn resolve(root: &Path, identifiers: &[String]) -> Environment {
    let mut env = Environment::default();
    if identifiers.is_empty() {
        return env;
    }

    let Some(env_root) = find_env_root(root) else {
        for identifier in identifiers {
            env.errors.push(ScanError::environment_unresolved(
                identifier,
                "no project environment found under the scan root",
            ));
        }
        return env;
    };
    debug!(env = %env_root.display(), "resolved project environment");

    let Some(site_packages) = find_site_packages(&env_root) else {
        for identifier in identifiers {
            env.errors.push(ScanError::environment_unresolved(
                identifier,
                format!(
                    "environment at {} has no site-packages directory",
                    env_root.display()
                ),
            ));
        }
        env.env_root = Some(env_root);
        return env;
    };

    for identifier in identifiers {
        match resolve_one(&site_packages, identifier) {
            Ok(dependency) => env.resolved.push(dependency),
            Err(message) => env
                .errors
                .push(ScanError::environment_unresolved(identifier, message)),
        }
    }

    env.env_root = Some(env_root);
    env.site_packages = Some(site_packages);
    env
}

/// Normalize a distribution name: lowercase, runs of `-_.` collapse to `-`.
fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut separated = false;
    for ch in name.chars() {
        if matches!(ch, '-' | '_' | '.') {
            if !separated {
                out.push('-');
                separated = true;
            }
        } else {
            out.push(ch.to_ascii_lowercase());
            separated = false;
        }
    }
    out
}

/// Locate the `<name>-<version>.dist-info` directory for an identifier.
fn find_dist_info(site_packages: &Path, identifier: &str) -> Option<PathBuf> {
    let wanted = normalize(identifier);
    let mut matches: Vec<PathBuf> = std::fs::read_dir(site_packages)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_suffix(".dist-info"))
                .and_then(|stem| stem.rsplit_once('-'))
                .map(|(dist, _version)| normalize(dist) == wanted)
                .unwrap_or(false)
        })
        .collect();
    matches.sort();
    matches.into_iter().next()
}

/// Derive top-level importable names from a distribution's RECORD manifest.
fn resolve_one(site_packages: &Path, identifier: &str) -> Result<ResolvedDependency, String> {
    let dist_info = find_dist_info(site_packages, identifier)
        .ok_or_else(|| format!("no installed distribution matches `{}`", identifier))?;

    let record = dist_info.join("RECORD");
    let content = std::fs::read_to_string(&record)
        .map_err(|err| format!("distribution has no readable RECORD manifest: {}", err))?;

    // RECORD is CSV: path,hash,size. Only the path column matters here.
    let mut marker_paths: Vec<Vec<&str>> = Vec::new();
    for line in content.lines() {
        let path = line.split(',').next().unwrap_or("").trim();
        if path.is_empty() {
            continue;
        }
        let segments: Vec<&str> = path.split('/').collect();
        // Script and data entries live outside site-packages.
        if segments.contains(&"..") {
            continue;
        }
        if segments.len() >= 2 && segments.last() == Some(&PACKAGE_MARKER) {
            marker_paths.push(segments);
        }
    }

    if marker_paths.is_empty() {
        return Err("distribution exposes no importable package markers".to_string());
    }

    let min_depth = marker_paths
        .iter()
        .map(|segments| segments.len())
        .min()
        .unwrap_or(0);
    let mut names: Vec<String> = marker_paths
        .iter()
        .filter(|segments| segments.len() == min_depth)
        .map(|segments| segments[..segments.len() - 1].join("."))
        .collect();
    names.sort();
    names.dedup();

    let top_levels = names
        .into_iter()
        .map(|name| {
            let dir = name
                .split('.')
                .fold(site_packages.to_path_buf(), |acc, segment| {
                    acc.join(segment)
                });
            TopLevel { name, dir }
        })
        .collect();

    Ok(ResolvedDependency {
        identifier: identifier.to_string(),
        top_levels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Lay out a minimal virtual environment and return its site-packages.
    fn fake_env(root: &Path) -> PathBuf {
        let env_root = root.join(".venv");
        fs::create_dir_all(&env_root).unwrap();
        fs::write(env_root.join("pyvenv.cfg"), "home = /usr/bin\n").unwrap();
        let site = env_root.join("lib").join("python3.11").join("site-packages");
        fs::create_dir_all(&site).unwrap();
        site
    }

    /// Install a fake distribution: a dist-info with a RECORD plus package
    /// directories for each listed `__init__.py`.
    fn install(site: &Path, dist: &str, version: &str, record_lines: &[&str]) {
        let dist_info = site.join(format!("{}-{}.dist-info", dist, version));
        fs::create_dir_all(&dist_info).unwrap();
        fs::write(dist_info.join("RECORD"), record_lines.join("\n")).unwrap();
        for line in record_lines {
            let path = line.split(',').next().unwrap();
            if path.contains("..") || path.contains(".dist-info") {
                continue;
            }
            let full = site.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, "").unwrap();
        }
    }

    #[test]
    fn resolves_top_level_from_record_manifest() {
        let dir = TempDir::new().unwrap();
        let site = fake_env(dir.path());
        install(
            &site,
            "mypkg",
            "1.0.0",
            &[
                "mypkg/__init__.py,sha256=abc,120",
                "mypkg/core.py,sha256=def,512",
                "mypkg/sub/__init__.py,sha256=ghi,10",
                "mypkg-1.0.0.dist-info/RECORD,,",
                "../../../bin/mypkg-cli,sha256=zzz,300",
            ],
        );

        let env = resolve(dir.path(), &["mypkg".to_string()]);
        assert!(env.errors.is_empty());
        assert_eq!(env.resolved.len(), 1);

        let dep = &env.resolved[0];
        assert_eq!(dep.identifier, "mypkg");
        assert_eq!(dep.top_levels.len(), 1);
        assert_eq!(dep.top_levels[0].name, "mypkg");
        assert_eq!(dep.top_levels[0].dir, site.join("mypkg"));
    }

    #[test]
    fn equal_depth_markers_resolve_lexically() {
        let dir = TempDir::new().unwrap();
        let site = fake_env(dir.path());
        install(
            &site,
            "multi",
            "2.1",
            &[
                "zeta/__init__.py,,",
                "alpha/__init__.py,,",
                "alpha/deep/__init__.py,,",
            ],
        );

        let env = resolve(dir.path(), &["multi".to_string()]);
        let names: Vec<&str> = env.resolved[0]
            .top_levels
            .iter()
            .map(|top| top.name.as_str())
            .collect();
        // Both sit at minimum depth; deeper markers do not qualify.
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[test]
    fn identifier_normalization_matches_dist_info() {
        let dir = TempDir::new().unwrap();
        let site = fake_env(dir.path());
        install(&site, "my_pkg", "0.3", &["my_pkg/__init__.py,,"]);

        let env = resolve(dir.path(), &["My-Pkg".to_string()]);
        assert!(env.errors.is_empty());
        assert_eq!(env.resolved[0].top_levels[0].name, "my_pkg");
    }

    #[test]
    fn unresolved_identifier_is_recorded_not_fatal() {
        let dir = TempDir::new().unwrap();
        let site = fake_env(dir.path());
        install(&site, "present", "1.0", &["present/__init__.py,,"]);

        let env = resolve(
            dir.path(),
            &["present".to_string(), "libfoo".to_string()],
        );
        assert_eq!(env.resolved.len(), 1);
        assert_eq!(env.errors.len(), 1);
        assert_eq!(env.errors[0].subject, "libfoo");
    }

    #[test]
    fn missing_environment_fails_every_identifier() {
        let dir = TempDir::new().unwrap();
        let env = resolve(dir.path(), &["a".to_string(), "b".to_string()]);
        assert!(env.resolved.is_empty());
        assert_eq!(env.errors.len(), 2);
        assert!(env.env_root.is_none());
    }

    #[test]
    fn windows_layout_is_recognized() {
        let dir = TempDir::new().unwrap();
        let env_root = dir.path().join("venv");
        fs::create_dir_all(&env_root).unwrap();
        fs::write(env_root.join("pyvenv.cfg"), "home = C:\\Python\n").unwrap();
        let site = env_root.join("Lib").join("site-packages");
        fs::create_dir_all(&site).unwrap();

        assert_eq!(find_site_packages(&env_root), Some(site));
    }

    #[test]
    fn distribution_without_markers_is_unresolved() {
        let dir = TempDir::new().unwrap();
        let site = fake_env(dir.path());
        install(&site, "onlyscripts", "1.0", &["../../../bin/tool,,"]);

        let env = resolve(dir.path(), &["onlyscripts".to_string()]);
        assert!(env.resolved.is_empty());
        assert_eq!(env.errors.len(), 1);
    }
}
