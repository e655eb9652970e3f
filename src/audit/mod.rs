//! Call auditing module.
//!
//! Every gateway call is wrapped by [`run_audited`], which appends
//! before/after records to `api_calls.log` in the chosen log directory. The
//! sink is a scoped resource: it is opened for one invocation and dropped on
//! every exit path, so repeated calls against the same directory never
//! accumulate handles. The file itself is append-only and shared across
//! invocations and processes; there is no rotation.
//!
//! Arguments and results are passed through [`redact`] before they reach
//! disk, so the bearer token and account identifiers never land in the log.

pub mod redact;

pub use redact::redact;

use std::fs::OpenOptions;
use std::future::Future;
use std::io::Write;
use std::path::Path;

use chrono::Local;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{GatewayError, Result};

/// Log file name, one per log directory, shared by all operations.
pub const AUDIT_LOG_FILE: &str = "api_calls.log";

/// A per-invocation handle on the audit log file.
///
/// Opening creates the log directory on demand and opens the file in append
/// mode; dropping releases the handle. OS-level appends of these short
/// records are atomic enough that concurrent processes can share the file
/// without locking.
pub struct AuditLog {
    file: std::fs::File,
    operation: String,
}

impl AuditLog {
    pub fn open(log_dir: &Path, operation: &str) -> Result<Self> {
        std::fs::create_dir_all(log_dir).map_err(|e| GatewayError::filesystem(log_dir, e))?;

        let path = log_dir.join(AUDIT_LOG_FILE);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| GatewayError::filesystem(&path, e))?;
        debug!(path = %path.display(), operation = operation, "Opened audit log");

        Ok(Self {
            file,
            operation: operation.to_string(),
        })
    }

    pub fn info(&mut self, message: &str) {
        self.write_record("INFO", message);
    }

    pub fn error(&mut self, message: &str) {
        self.write_record("ERROR", message);
    }

    /// Append one `timestamp - operation - LEVEL - message` line.
    /// A failed append must not mask the outcome of the call being audited,
    /// so it is reported through tracing instead of returned.
    fn write_record(&mut self, level: &str, message: &str) {
        let line = format!(
            "{} - {} - {} - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            self.operation,
            level,
            message
        );
        if let Err(e) = self.file.write_all(line.as_bytes()) {
            warn!(error = %e, operation = %self.operation, "Failed to append audit record");
        }
    }
}

/// Run one gateway call with before/after audit records.
///
/// With no log directory the call runs unaudited. Errors from the wrapped
/// call are recorded and then returned unchanged; the sink is released on
/// both paths.
pub async fn run_audited<F, Fut>(
    log_dir: Option<&Path>,
    operation: &str,
    arguments: &Value,
    call: F,
) -> Result<Value>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    let mut log = match log_dir {
        Some(dir) => Some(AuditLog::open(dir, operation)?),
        None => None,
    };

    if let Some(log) = log.as_mut() {
        log.info(&format!("Calling {operation}"));
        log.info(&format!("Arguments: {}", redact(arguments)));
    }

    match call().await {
        Ok(envelope) => {
            if let Some(log) = log.as_mut() {
                log.info(&format!("Result: {}", redact(&envelope)));
            }
            Ok(envelope)
        }
        Err(e) => {
            if let Some(log) = log.as_mut() {
                log.error(&format!("Exception occurred: {e}"));
            }
            Err(e)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn read_log(dir: &Path) -> String {
        std::fs::read_to_string(dir.join(AUDIT_LOG_FILE)).unwrap()
    }

    #[tokio::test]
    async fn test_each_invocation_appends_one_record_pair() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;

        for i in 0..3 {
            let result = run_audited(
                Some(dir.path()),
                "GetTrialBalanceReport",
                &json!({"Message": {"Token": "secret"}}),
                || async move { Ok(json!({"ApiCallSuccessful": true, "run": i})) },
            )
            .await?;
            assert_eq!(result["run"], i);
        }

        let log = read_log(dir.path());
        assert_eq!(log.matches("Calling GetTrialBalanceReport").count(), 3);
        assert_eq!(log.matches("Result:").count(), 3);
        assert_eq!(log.matches("ERROR").count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_arguments_are_redacted_in_log() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;

        run_audited(
            Some(dir.path()),
            "RunLateNoticesReport",
            &json!({"Message": {"Token": "super-secret", "UseLogo": true}}),
            || async { Ok(json!({"ApiCallSuccessful": true})) },
        )
        .await?;

        let log = read_log(dir.path());
        assert!(!log.contains("super-secret"));
        assert!(log.contains("[REDACTED]"));
        assert!(log.contains("UseLogo"));
        Ok(())
    }

    #[tokio::test]
    async fn test_error_is_recorded_and_returned_unchanged() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;

        let err = run_audited(Some(dir.path()), "GetMsCompanyInformation", &json!({}), || async {
            Err(crate::error::GatewayError::Configuration(
                "missing token".to_string(),
            ))
        })
        .await
        .unwrap_err();

        match err {
            crate::error::GatewayError::Configuration(msg) => {
                assert_eq!(msg, "missing token")
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let log = read_log(dir.path());
        assert!(log.contains("ERROR - Exception occurred: Configuration error: missing token"));
        Ok(())
    }

    #[tokio::test]
    async fn test_no_log_dir_skips_auditing() -> anyhow::Result<()> {
        let result = run_audited(None, "GetAdvancedSelectorRequest", &json!({}), || async {
            Ok(json!({"ApiCallSuccessful": true}))
        })
        .await?;
        assert_eq!(result["ApiCallSuccessful"], true);
        Ok(())
    }

    #[tokio::test]
    async fn test_log_directory_created_on_demand() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let nested = dir.path().join("api_logs").join("2026");

        run_audited(Some(&nested), "GetTrialBalanceReport", &json!({}), || async {
            Ok(json!({"ApiCallSuccessful": true}))
        })
        .await?;

        assert!(nested.join(AUDIT_LOG_FILE).is_file());
        Ok(())
    }
}
