//! The result contract handed back to the task runner.
//!
//! One rule for `changed`, applied uniformly: true iff the invocation
//! persisted a new artifact (a file written locally, or a vendor-side export
//! the gateway confirmed). Semantic success with no artifact reports
//! `changed = false`; a soft failure reports `failed = true` without
//! aborting the run. The attached envelope is always redacted.

use serde::Serialize;
use serde_json::Value;

use crate::audit::redact;

#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    pub changed: bool,
    pub failed: bool,
    pub message: String,
    /// Redacted response envelope, kept for diagnosis downstream.
    pub response: Value,
}

impl TaskOutcome {
    /// An artifact was persisted.
    pub fn written(message: impl Into<String>, response: Value) -> Self {
        Self {
            changed: true,
            failed: false,
            message: message.into(),
            response: redact(&response),
        }
    }

    /// Semantic success, no artifact.
    pub fn unchanged(message: impl Into<String>, response: Value) -> Self {
        Self {
            changed: false,
            failed: false,
            message: message.into(),
            response: redact(&response),
        }
    }

    /// Non-fatal failure the caller decides how to treat.
    pub fn soft_failure(message: impl Into<String>, response: Value) -> Self {
        Self {
            changed: false,
            failed: true,
            message: message.into(),
            response: redact(&response),
        }
    }
}
