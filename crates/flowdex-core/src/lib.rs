//! Core domain types shared across the entire Flowdex workspace.
//!
//! A scan produces a [`Catalog`] of [`Function`] values (module path, name,
//! signature) plus an ordered ledger of [`ScanError`] entries. Everything in
//! this crate is plain data: no I/O, no parsing, no process state.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Module Paths
// =============================================================================

/// Dotted canonical path of a module, unique within one scan.
///
/// Every non-root path's parent prefix is itself either the scan root or a
/// previously discovered path (`pkg.sub.mod` implies `pkg.sub` and `pkg`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModulePath(String);

impl ModulePath {
    /// Create a module path from a dotted string.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The full dotted path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bare short name (last dotted segment).
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// The parent path, if this is not a top-level module.
    pub fn parent(&self) -> Option<ModulePath> {
        self.0.rsplit_once('.').map(|(head, _)| Self(head.to_string()))
    }

    /// Append a child segment, producing `self.name`.
    pub fn child(&self, name: &str) -> ModulePath {
        Self(format!("{}.{}", self.0, name))
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModulePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// =============================================================================
// Parameters & Signatures
// =============================================================================

/// Calling-convention category of a parameter.
///
/// The declaration order of the variants is the canonical signature order:
/// positional-only parameters come first, var-keyword last.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ParamKind {
    /// Before a `/` separator; may only be passed positionally.
    PositionalOnly,
    /// Ordinary parameter; positional or keyword.
    PositionalOrKeyword,
    /// `*args` catch-all.
    VarPositional,
    /// After a bare `*` or `*args`; keyword only.
    KeywordOnly,
    /// `**kwargs` catch-all.
    VarKeyword,
}

impl ParamKind {
    /// Rank within the canonical signature order.
    pub fn canonical_rank(&self) -> u8 {
        match self {
            ParamKind::PositionalOnly => 0,
            ParamKind::PositionalOrKeyword => 1,
            ParamKind::VarPositional => 2,
            ParamKind::KeywordOnly => 3,
            ParamKind::VarKeyword => 4,
        }
    }

    /// Display label for the kind.
    pub fn label(&self) -> &'static str {
        match self {
            ParamKind::PositionalOnly => "positional-only",
            ParamKind::PositionalOrKeyword => "positional-or-keyword",
            ParamKind::VarPositional => "var-positional",
            ParamKind::KeywordOnly => "keyword-only",
            ParamKind::VarKeyword => "var-keyword",
        }
    }
}

/// Explicit presence marker for optional signature data.
///
/// An absent annotation and an annotation whose descriptor happens to be an
/// empty string are different values; the same holds for absent defaults vs
/// falsy defaults. This is a sum type rather than a sentinel so the two can
/// never collide, in memory or on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Provided<T> {
    /// No value was declared.
    Absent,
    /// A value was declared; its descriptor is carried verbatim.
    Present(T),
}

impl<T> Default for Provided<T> {
    fn default() -> Self {
        Provided::Absent
    }
}

impl<T> Provided<T> {
    /// True if a value was declared.
    pub fn is_present(&self) -> bool {
        matches!(self, Provided::Present(_))
    }

    /// True if no value was declared.
    pub fn is_absent(&self) -> bool {
        matches!(self, Provided::Absent)
    }

    /// Borrow the declared value, if any.
    pub fn as_present(&self) -> Option<&T> {
        match self {
            Provided::Present(value) => Some(value),
            Provided::Absent => None,
        }
    }
}

/// Structural descriptor for an annotation or default value.
///
/// Values are captured structurally where possible and reduced to a
/// descriptive form where not; nothing is silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueRepr {
    /// The `None` literal.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// String literal or textual descriptor.
    Str(String),
    /// List, tuple or set literal.
    List(Vec<ValueRepr>),
    /// Ordered key → value mapping (dict literals, attribute dumps).
    Map(Vec<(String, ValueRepr)>),
    /// Enumerated type: ordered member name → member value pairs.
    Enum(Vec<(String, ValueRepr)>),
    /// Date/time-like value, reduced to a fixed descriptive label
    /// ("datetime.date", "datetime.datetime", ...) rather than an instant.
    Temporal(String),
    /// Fallback: source text or class name of a value with no structural
    /// encoding.
    Opaque(String),
}

impl ValueRepr {
    /// True if every float reachable from this value is finite.
    ///
    /// Non-finite floats have no exact JSON representation and must be
    /// rejected before encoding instead of being corrupted in transit.
    pub fn is_wire_exact(&self) -> bool {
        match self {
            ValueRepr::Float(f) => f.is_finite(),
            ValueRepr::List(items) => items.iter().all(ValueRepr::is_wire_exact),
            ValueRepr::Map(entries) | ValueRepr::Enum(entries) => {
                entries.iter().all(|(_, v)| v.is_wire_exact())
            }
            _ => true,
        }
    }
}

impl fmt::Display for ValueRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRepr::Null => write!(f, "None"),
            ValueRepr::Bool(true) => write!(f, "True"),
            ValueRepr::Bool(false) => write!(f, "False"),
            ValueRepr::Int(i) => write!(f, "{}", i),
            ValueRepr::Float(x) => write!(f, "{}", x),
            ValueRepr::Str(s) => write!(f, "{:?}", s),
            ValueRepr::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            ValueRepr::Map(entries) | ValueRepr::Enum(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            ValueRepr::Temporal(label) => f.write_str(label),
            ValueRepr::Opaque(text) => f.write_str(text),
        }
    }
}

/// A single parameter of a callable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name as declared.
    pub name: String,
    /// Calling-convention category.
    pub kind: ParamKind,
    /// Declared type annotation, if any.
    pub annotation: Provided<ValueRepr>,
    /// Declared default value, if any.
    pub default: Provided<ValueRepr>,
}

impl Parameter {
    /// Create a parameter with no annotation and no default.
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            annotation: Provided::Absent,
            default: Provided::Absent,
        }
    }

    /// Attach an annotation descriptor.
    pub fn with_annotation(mut self, annotation: ValueRepr) -> Self {
        self.annotation = Provided::Present(annotation);
        self
    }

    /// Attach a default value descriptor.
    pub fn with_default(mut self, default: ValueRepr) -> Self {
        self.default = Provided::Present(default);
        self
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParamKind::VarPositional => write!(f, "*{}", self.name)?,
            ParamKind::VarKeyword => write!(f, "**{}", self.name)?,
            _ => f.write_str(&self.name)?,
        }
        if let Provided::Present(annotation) = &self.annotation {
            write!(f, ": {}", annotation)?;
        }
        if let Provided::Present(default) = &self.default {
            write!(f, "={}", default)?;
        }
        Ok(())
    }
}

/// An ordered parameter list plus an optional return annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    /// Parameters in canonical kind order.
    pub parameters: Vec<Parameter>,
    /// Declared return annotation, if any.
    pub return_annotation: Provided<ValueRepr>,
}

impl Signature {
    /// Build a signature, normalizing the parameters into canonical order.
    pub fn new(parameters: Vec<Parameter>, return_annotation: Provided<ValueRepr>) -> Self {
        let mut signature = Self {
            parameters,
            return_annotation,
        };
        signature.canonicalize();
        signature
    }

    /// Sort parameters into canonical kind order.
    ///
    /// The sort is stable: parameters of the same kind keep their relative
    /// declaration order.
    pub fn canonicalize(&mut self) {
        self.parameters
            .sort_by_key(|param| param.kind.canonical_rank());
    }

    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")?;
        if let Provided::Present(annotation) = &self.return_annotation {
            write!(f, " -> {}", annotation)?;
        }
        Ok(())
    }
}

// =============================================================================
// Functions & the Catalog
// =============================================================================

/// A callable definition discovered during a scan.
///
/// Identity is `(module, name)`; the signature carries no identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Module that declares the function.
    pub module: ModulePath,
    /// Function name within the module.
    pub name: String,
    /// Extracted signature.
    pub signature: Signature,
}

impl Function {
    /// Create a function value.
    pub fn new(module: ModulePath, name: impl Into<String>, signature: Signature) -> Self {
        Self {
            module,
            name: name.into(),
            signature,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.module, self.name, self.signature)
    }
}

/// The set of all extracted functions for one scan.
///
/// Kept sorted by `(module, name)` so two scans of an unchanged project
/// produce byte-identical catalogs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    functions: Vec<Function>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a function, replacing any existing entry with the same
    /// `(module, name)` identity.
    ///
    /// Returns the displaced function when a redefinition occurred so the
    /// caller can flag the anomaly.
    pub fn insert(&mut self, function: Function) -> Option<Function> {
        match self.functions.binary_search_by(|f| {
            f.module
                .cmp(&function.module)
                .then_with(|| f.name.cmp(&function.name))
        }) {
            Ok(index) => Some(std::mem::replace(&mut self.functions[index], function)),
            Err(index) => {
                self.functions.insert(index, function);
                None
            }
        }
    }

    /// Look up a function by identity.
    pub fn get(&self, module: &ModulePath, name: &str) -> Option<&Function> {
        self.functions
            .iter()
            .find(|f| f.module == *module && f.name == name)
    }

    /// All functions, ordered by `(module, name)`.
    pub fn iter(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter()
    }

    /// Functions declared by one module.
    pub fn functions_in<'a>(
        &'a self,
        module: &'a ModulePath,
    ) -> impl Iterator<Item = &'a Function> + 'a {
        self.functions.iter().filter(move |f| f.module == *module)
    }

    /// Distinct module paths present in the catalog, in order.
    pub fn modules(&self) -> Vec<&ModulePath> {
        let mut modules: Vec<&ModulePath> = Vec::new();
        for function in &self.functions {
            if modules.last() != Some(&&function.module) {
                modules.push(&function.module);
            }
        }
        modules
    }

    /// Number of functions in the catalog.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// True if no functions were extracted.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl FromIterator<Function> for Catalog {
    fn from_iter<I: IntoIterator<Item = Function>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for function in iter {
            catalog.insert(function);
        }
        catalog
    }
}

// =============================================================================
// Scan Errors & Results
// =============================================================================

/// Failure category for a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanErrorKind {
    /// Manifest content could not be parsed; the scan degraded to
    /// first-party modules only.
    ManifestUnreadable,
    /// A declared dependency could not be resolved to an installed location.
    EnvironmentUnresolved,
    /// A module could not be read or parsed.
    ModuleLoadFailure,
    /// A function could not be encoded for the wire; only that function was
    /// dropped.
    EncodingFailure,
    /// An external deadline killed the scan before this work completed.
    DeadlineExceeded,
}

impl fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManifestUnreadable => write!(f, "manifest unreadable"),
            Self::EnvironmentUnresolved => write!(f, "environment unresolved"),
            Self::ModuleLoadFailure => write!(f, "module load failure"),
            Self::EncodingFailure => write!(f, "encoding failure"),
            Self::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// One non-fatal failure recorded during a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanError {
    /// Module path or declared identifier the failure is about.
    pub subject: String,
    /// Failure category.
    pub kind: ScanErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl ScanError {
    /// Create a ledger entry.
    pub fn new(
        subject: impl Into<String>,
        kind: ScanErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            kind,
            message: message.into(),
        }
    }

    /// Manifest parse failure.
    pub fn manifest_unreadable(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(subject, ScanErrorKind::ManifestUnreadable, message)
    }

    /// Dependency resolution failure.
    pub fn environment_unresolved(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(subject, ScanErrorKind::EnvironmentUnresolved, message)
    }

    /// Module read or parse failure.
    pub fn module_load_failure(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(subject, ScanErrorKind::ModuleLoadFailure, message)
    }

    /// Per-function wire encoding failure.
    pub fn encoding_failure(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(subject, ScanErrorKind::EncodingFailure, message)
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.subject, self.kind, self.message)
    }
}

/// The complete outcome of one scan: the catalog plus the error ledger.
///
/// The catalog is always usable, possibly partial; the ledger is surfaced to
/// the consuming layer for diagnostics and is never silently discarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Extracted functions.
    pub catalog: Catalog,
    /// Ordered ledger of non-fatal failures.
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a ledger entry.
    pub fn record(&mut self, error: ScanError) {
        self.errors.push(error);
    }

    /// True if the scan finished without any recorded failure.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
