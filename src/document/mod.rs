//! Document materialization: pull a base64 payload out of a response
//! envelope and persist it.
//!
//! Different endpoints nest the payload at different depths
//! (`Document.DocumentBase64`, `LateNotice.Document.DocumentBase64`, a
//! top-level `File`), so the location is a dotted field path supplied by the
//! caller, not logic here.
//!
//! The write goes through a temporary file in the destination directory
//! followed by a rename, so a crash mid-write never leaves a truncated
//! report behind. The destination is overwritten on each successful run.

use std::io::Write;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;
use tracing::debug;

use crate::error::{GatewayError, Result};

/// Locate the base64 string at `field_path` ("." separated keys) inside the
/// envelope.
///
/// An absent key, a non-string leaf, or an empty string all report
/// `MissingDocument`; an empty field path is a caller error.
pub fn extract_field<'a>(envelope: &'a Value, field_path: &str) -> Result<&'a str> {
    if field_path.is_empty() {
        return Err(GatewayError::Configuration(
            "document field path must not be empty".to_string(),
        ));
    }

    let missing = || GatewayError::MissingDocument {
        field_path: field_path.to_string(),
    };

    let mut current = envelope;
    for key in field_path.split('.') {
        current = current.get(key).ok_or_else(missing)?;
    }

    match current.as_str() {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(missing()),
    }
}

/// Decode the payload at `field_path` and write it to `destination`,
/// creating missing parent directories. Returns the number of bytes written.
///
/// Nothing touches the filesystem until the payload has been located and
/// decoded, so a missing or malformed document leaves no trace.
pub fn materialize(envelope: &Value, field_path: &str, destination: &Path) -> Result<u64> {
    let encoded = extract_field(envelope, field_path)?;
    let bytes = STANDARD.decode(encoded)?;
    write_bytes(destination, &bytes)?;

    debug!(
        path = %destination.display(),
        bytes = bytes.len(),
        "Materialized document"
    );
    Ok(bytes.len() as u64)
}

/// Atomically replace `destination` with `bytes`.
fn write_bytes(destination: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| GatewayError::filesystem(parent, e))?;

    // Temp file lives in the destination directory so the final rename
    // cannot cross a filesystem boundary.
    let mut tmp =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| GatewayError::filesystem(parent, e))?;
    tmp.write_all(bytes)
        .map_err(|e| GatewayError::filesystem(destination, e))?;
    tmp.persist(destination)
        .map_err(|e| GatewayError::filesystem(destination, e.error))?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
