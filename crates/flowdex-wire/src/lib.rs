//! Wire codec for catalogs crossing a process or network boundary.
//!
//! The scanner may run as a subprocess (inside a project-specific
//! environment), so extracted functions travel as a versioned JSON envelope
//! on the child's stdout. The encoding is round-trip exact: an absent
//! annotation, an empty-string descriptor, a falsy default and an absent
//! default all survive the trip unchanged, because presence is carried by the
//! [`Provided`] tag rather than inferred from the value.
//!
//! A function that cannot be encoded exactly (a non-finite float has no JSON
//! representation; serde_json would corrupt it to `null`) is dropped from the
//! payload and reported as an `EncodingFailure` for that one function. The
//! rest of the payload is unaffected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use flowdex_core::{Catalog, Function, Provided, ScanError, ValueRepr};

/// Current wire format version. Bump on any incompatible envelope change.
pub const WIRE_VERSION: u32 = 1;

/// Result type for decode operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors produced while decoding a payload.
#[derive(Debug, Error)]
pub enum WireError {
    /// The payload is not valid JSON or does not match the envelope shape.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload was produced by an incompatible codec version.
    #[error("wire version mismatch: payload is v{found}, codec is v{expected}")]
    VersionMismatch { found: u32, expected: u32 },
}

/// Versioned envelope carried on the payload channel.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    functions: Vec<Function>,
}

/// Outcome of encoding a catalog: the payload plus per-function failures.
#[derive(Debug)]
pub struct EncodedCatalog {
    /// Serialized envelope, ready for the payload channel.
    pub payload: String,
    /// One `EncodingFailure` entry per function dropped from the payload.
    pub errors: Vec<ScanError>,
}

/// Encode a catalog into a compact wire payload.
pub fn encode(catalog: &Catalog) -> EncodedCatalog {
    encode_inner(catalog, false)
}

/// Encode a catalog into a human-readable (pretty-printed) wire payload.
pub fn encode_pretty(catalog: &Catalog) -> EncodedCatalog {
    encode_inner(catalog, true)
}

fn encode_inner(catalog: &Catalog, pretty: bool) -> EncodedCatalog {
    let mut functions = Vec::with_capacity(catalog.len());
    let mut errors = Vec::new();

    for function in catalog.iter() {
        match check_wire_exact(function) {
            Ok(()) => functions.push(function.clone()),
            Err(message) => errors.push(ScanError::encoding_failure(
                format!("{}.{}", function.module, function.name),
                message,
            )),
        }
    }

    let envelope = Envelope {
        version: WIRE_VERSION,
        functions,
    };

    // The envelope is plain data with every float verified finite; JSON
    // serialization cannot fail past this point.
    let payload = if pretty {
        serde_json::to_string_pretty(&envelope)
    } else {
        serde_json::to_string(&envelope)
    }
    .unwrap_or_else(|_| String::from("{\"version\":1,\"functions\":[]}"));

    EncodedCatalog { payload, errors }
}

/// Decode a wire payload back into a catalog.
pub fn decode(payload: &str) -> WireResult<Catalog> {
    let envelope: Envelope = serde_json::from_str(payload)?;
    if envelope.version != WIRE_VERSION {
        return Err(WireError::VersionMismatch {
            found: envelope.version,
            expected: WIRE_VERSION,
        });
    }
    Ok(envelope.functions.into_iter().collect())
}

/// Verify every value reachable from the function survives JSON exactly.
fn check_wire_exact(function: &Function) -> Result<(), String> {
    for parameter in &function.signature.parameters {
        check_field(&parameter.annotation, &parameter.name, "annotation")?;
        check_field(&parameter.default, &parameter.name, "default")?;
    }
    check_field(
        &function.signature.return_annotation,
        "return",
        "annotation",
    )?;
    Ok(())
}

fn check_field(field: &Provided<ValueRepr>, name: &str, role: &str) -> Result<(), String> {
    if let Provided::Present(value) = field {
        if !value.is_wire_exact() {
            return Err(format!(
                "{} of `{}` contains a non-finite float and has no exact wire form",
                role, name
            ));
        }
    }
    Ok(())
}
