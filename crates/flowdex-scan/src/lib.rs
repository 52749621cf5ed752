//! Flowdex Scan Layer
//!
//! This crate turns a project root into a catalog of callable signatures:
//!
//! - **manifest** reads declared dependency identifiers (Pipfile or
//!   requirements.txt);
//! - **environment** resolves identifiers against the project-scoped virtual
//!   environment and derives importable top-level names;
//! - **discover** enumerates module paths under each discovery root;
//! - **extract** parses one module and extracts locally-owned signatures;
//! - the orchestrator composes the above into a [`flowdex_core::ScanResult`].
//!
//! Modules are parsed, never executed — scanning untrusted trees cannot run
//! their code. Per-module and per-dependency failures land in the result's
//! ledger; only a missing scan root or an I/O-unreadable manifest is fatal.

mod discover;
mod environment;
mod error;
mod extract;
mod manifest;
mod orchestrator;

// Re-export public API
pub use discover::{discover_package, first_party_roots, DiscoveredModule};
pub use environment::{
    find_env_root, find_site_packages, resolve, Environment, ResolvedDependency, TopLevel,
    PACKAGE_MARKER,
};
pub use error::FatalError;
pub use extract::extract_module;
pub use manifest::{read_declared, DeclaredDependencies, PIPFILE, REQUIREMENTS};
pub use orchestrator::{scan_project, ScanOptions};
