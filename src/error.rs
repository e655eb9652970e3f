use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Caller-side mistake: unsupported verb, missing required parameter.
    /// Raised before any network or filesystem side effect.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The gateway answered with a non-200 status.
    #[error("Error response code ({status}) from api call: {body}")]
    Status { status: u16, body: String },

    /// HTTP 200 but the envelope did not carry `ApiCallSuccessful: true`.
    /// The envelope is kept for diagnosis.
    #[error("API call unsuccessful")]
    Unsuccessful { envelope: serde_json::Value },

    /// The expected document payload is absent or empty.
    /// Several tasks treat this as a soft, reportable outcome.
    #[error("no document found at '{field_path}' in api response")]
    MissingDocument { field_path: String },

    #[error("Invalid base64 document payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    /// Truncate a response body to avoid carrying excessive data in errors
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            // The cut must land on a char boundary; gateway error pages
            // carry multibyte text.
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..end],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        GatewayError::Status {
            status: status.as_u16(),
            body: Self::truncate_body(body),
        }
    }

    pub fn filesystem(path: &Path, source: std::io::Error) -> Self {
        GatewayError::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }
}
