//! Recursive module discovery under a package root.
//!
//! A directory is a package when it carries the package-marker file; `.py`
//! files inside a package are leaf modules. The exclusion pattern matches
//! bare short names: a matched package is pruned together with its entire
//! subtree, a matched leaf module is skipped individually. Output is sorted
//! and deduplicated so repeated scans of an unchanged tree are identical.

use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use flowdex_core::ModulePath;

use crate::environment::PACKAGE_MARKER;

/// A module located on disk, addressed by its dotted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredModule {
    /// Fully qualified dotted path.
    pub path: ModulePath,
    /// Source file backing the module: the `.py` file itself, or the
    /// package's marker file.
    pub file: PathBuf,
    /// True for packages, false for leaf modules.
    pub is_package: bool,
}

/// Enumerate every module reachable under one package root.
///
/// The root itself is included when it is a package, and is itself subject
/// to the exclusion pattern.
pub fn discover_package(
    root_dir: &Path,
    root_name: &str,
    exclude: Option<&Regex>,
) -> Vec<DiscoveredModule> {
    let mut modules = Vec::new();

    if matches(exclude, root_name) || !root_dir.join(PACKAGE_MARKER).is_file() {
        return modules;
    }

    for entry in WalkDir::new(root_dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| is_traversable(entry, exclude))
        .filter_map(|entry| entry.ok())
    {
        let entry_path = entry.path();
        if entry.file_type().is_dir() {
            // Every directory the walker yields is a package: the root was
            // checked above, deeper ones pass through `is_traversable`.
            if let Some(path) = dotted(root_dir, root_name, entry_path) {
                modules.push(DiscoveredModule {
                    path,
                    file: entry_path.join(PACKAGE_MARKER),
                    is_package: true,
                });
            }
        } else if let Some(stem) = module_stem(entry_path) {
            if matches(exclude, stem) {
                continue;
            }
            let Some(parent) = entry_path.parent() else {
                continue;
            };
            if let Some(parent_path) = dotted(root_dir, root_name, parent) {
                modules.push(DiscoveredModule {
                    path: parent_path.child(stem),
                    file: entry_path.to_path_buf(),
                    is_package: false,
                });
            }
        }
    }

    modules.sort_by(|a, b| a.path.cmp(&b.path));
    modules.dedup_by(|a, b| a.path == b.path);
    modules
}

/// First-party discovery roots: every top-level package directory under the
/// scan root, sorted by name.
pub fn first_party_roots(scan_root: &Path) -> Vec<(String, PathBuf)> {
    let mut roots = Vec::new();
    if let Ok(entries) = std::fs::read_dir(scan_root) {
        for entry in entries.filter_map(|entry| entry.ok()) {
            let dir = entry.path();
            if !dir.is_dir() || !dir.join(PACKAGE_MARKER).is_file() {
                continue;
            }
            let Some(name) = dir.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            roots.push((name.to_string(), dir));
        }
    }
    roots.sort();
    roots
}

/// Decide whether the walker may descend into an entry.
fn is_traversable(entry: &walkdir::DirEntry, exclude: Option<&Regex>) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    if !entry.file_type().is_dir() {
        return true;
    }
    let Some(name) = entry.file_name().to_str() else {
        return false;
    };
    // A non-package directory is not importable; a matched package prunes
    // its whole subtree.
    entry.path().join(PACKAGE_MARKER).is_file() && !matches(exclude, name)
}

/// The module stem of a `.py` file, excluding the package marker itself.
fn module_stem(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(".py")?;
    (stem != "__init__").then_some(stem)
}

/// Dotted path of a package directory relative to the discovery root.
fn dotted(root_dir: &Path, root_name: &str, dir: &Path) -> Option<ModulePath> {
    let relative = dir.strip_prefix(root_dir).ok()?;
    let mut path = ModulePath::new(root_name);
    for component in relative.components() {
        path = path.child(component.as_os_str().to_str()?);
    }
    Some(path)
}

fn matches(exclude: Option<&Regex>, name: &str) -> bool {
    exclude.map(|pattern| pattern.is_match(name)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Build a package tree from `(relative_path, is_dir)` entries.
    fn build_tree(root: &Path, files: &[&str]) {
        for file in files {
            let full = root.join(file);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, "").unwrap();
        }
    }

    fn paths(modules: &[DiscoveredModule]) -> Vec<&str> {
        modules.iter().map(|m| m.path.as_str()).collect()
    }

    #[test]
    fn discovers_packages_and_modules_sorted() {
        let dir = TempDir::new().unwrap();
        build_tree(
            dir.path(),
            &[
                "pkg/__init__.py",
                "pkg/zeta.py",
                "pkg/alpha.py",
                "pkg/sub/__init__.py",
                "pkg/sub/thing.py",
            ],
        );

        let modules = discover_package(&dir.path().join("pkg"), "pkg", None);
        assert_eq!(
            paths(&modules),
            ["pkg", "pkg.alpha", "pkg.sub", "pkg.sub.thing", "pkg.zeta"]
        );
        assert!(modules[0].is_package);
        assert!(!modules[1].is_package);
    }

    #[test]
    fn exclusion_prunes_packages_and_skips_leaves() {
        let dir = TempDir::new().unwrap();
        build_tree(
            dir.path(),
            &[
                "pkg/__init__.py",
                "pkg/util.py",
                "pkg/util_test.py",
                "pkg/sub/__init__.py",
                "pkg/sub/thing_test.py",
            ],
        );

        let pattern = Regex::new("_test$").unwrap();
        let modules = discover_package(&dir.path().join("pkg"), "pkg", Some(&pattern));
        assert_eq!(paths(&modules), ["pkg", "pkg.sub", "pkg.util"]);
    }

    #[test]
    fn excluded_package_drops_entire_subtree() {
        let dir = TempDir::new().unwrap();
        build_tree(
            dir.path(),
            &[
                "pkg/__init__.py",
                "pkg/keep.py",
                "pkg/tests/__init__.py",
                "pkg/tests/helpers.py",
            ],
        );

        let pattern = Regex::new("^tests$").unwrap();
        let modules = discover_package(&dir.path().join("pkg"), "pkg", Some(&pattern));
        assert_eq!(paths(&modules), ["pkg", "pkg.keep"]);
    }

    #[test]
    fn excluded_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        build_tree(dir.path(), &["pkg_test/__init__.py", "pkg_test/mod.py"]);

        let pattern = Regex::new("_test$").unwrap();
        let modules = discover_package(&dir.path().join("pkg_test"), "pkg_test", Some(&pattern));
        assert!(modules.is_empty());
    }

    #[test]
    fn non_package_directories_are_not_traversed() {
        let dir = TempDir::new().unwrap();
        build_tree(
            dir.path(),
            &[
                "pkg/__init__.py",
                "pkg/data/readme.txt",
                "pkg/data/orphan.py",
            ],
        );

        let modules = discover_package(&dir.path().join("pkg"), "pkg", None);
        assert_eq!(paths(&modules), ["pkg"]);
    }

    #[test]
    fn non_package_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        build_tree(dir.path(), &["plain/loose.py"]);

        let modules = discover_package(&dir.path().join("plain"), "plain", None);
        assert!(modules.is_empty());
    }

    #[test]
    fn first_party_roots_are_top_level_packages_only() {
        let dir = TempDir::new().unwrap();
        build_tree(
            dir.path(),
            &[
                "beta/__init__.py",
                "alpha/__init__.py",
                "notpkg/file.txt",
                ".hidden/__init__.py",
                "loose.py",
            ],
        );

        let roots = first_party_roots(dir.path());
        let names: Vec<&str> = roots.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta"]);
    }
}
