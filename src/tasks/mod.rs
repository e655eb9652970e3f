//! Per-endpoint servicing tasks.
//!
//! Each task owns the literal request fields its endpoint expects (the
//! vendor's PascalCase wire names), sends them through the audited
//! dispatcher, gates on `ApiCallSuccessful`, and applies its own
//! missing-document policy:
//! - trial balance / late notices: missing document is a soft failure
//! - allied insurance: missing payload is a soft success ("no file retrieved")
//! - payoff statement: the document is required
//!
//! Tasks never swallow errors; hard failures propagate as
//! [`crate::error::GatewayError`] after the audit trail has recorded them.

pub mod advanced_selector;
pub mod allied_insurance;
pub mod late_notices;
pub mod metro2;
pub mod payoff;
pub mod trial_balance;

pub use advanced_selector::get_advanced_selector_request;
pub use allied_insurance::create_allied_insurance_interface_file;
pub use late_notices::run_late_notices_report;
pub use metro2::create_metro2_file_and_report;
pub use payoff::{process_payoff_statement, PayoffRequest};
pub use trial_balance::get_trial_balance_report;

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::api::{require_successful, GatewayClient, HttpMethod};
use crate::audit::run_audited;
use crate::config::GatewayConfig;
use crate::error::Result;

/// Everything a task needs besides its own parameters.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub client: GatewayClient,
    pub token: String,
    pub log_dir: Option<PathBuf>,
}

impl TaskContext {
    pub fn new(client: GatewayClient, token: impl Into<String>) -> Self {
        Self {
            client,
            token: token.into(),
            log_dir: None,
        }
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Ok(Self {
            client: GatewayClient::with_timeout(&config.base_url, config.timeout())?,
            token: config.token.clone(),
            log_dir: config.log_directory.clone(),
        })
    }

    fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }

    /// POST one endpoint with audit records around the call and the
    /// `ApiCallSuccessful` gate applied inside it, so an unsuccessful
    /// envelope is recorded before it propagates.
    pub async fn call(&self, endpoint: &str, body: &Value) -> Result<Value> {
        // The operation name in the log is the endpoint itself, not the
        // service path prefix some endpoints carry.
        let operation = endpoint.rsplit('/').next().unwrap_or(endpoint);

        run_audited(self.log_dir(), operation, body, || async {
            let envelope = self.client.send(HttpMethod::Post, endpoint, body).await?;
            require_successful(envelope)
        })
        .await
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::audit::AUDIT_LOG_FILE;
    use crate::error::GatewayError;

    #[tokio::test]
    async fn test_call_audits_and_gates_envelope() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let log_dir = tempfile::tempdir()?;

        let _ok = server
            .mock("POST", "/BatchService.svc/REST/GetTrialBalanceReport")
            .with_status(200)
            .with_body(r#"{"ApiCallSuccessful": true}"#)
            .create_async()
            .await;

        let ctx = test_support::context(&server, log_dir.path());
        let envelope = ctx
            .call(
                "BatchService.svc/REST/GetTrialBalanceReport",
                &json!({"Message": {"Token": "test-token"}}),
            )
            .await?;
        assert_eq!(envelope["ApiCallSuccessful"], true);

        let log = std::fs::read_to_string(log_dir.path().join(AUDIT_LOG_FILE))?;
        assert!(log.contains("Calling GetTrialBalanceReport"));
        assert!(log.contains("Result:"));
        assert!(!log.contains("test-token"));
        Ok(())
    }

    #[tokio::test]
    async fn test_call_records_unsuccessful_envelope_as_error() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let log_dir = tempfile::tempdir()?;

        let _nope = server
            .mock("POST", "/GetTrialBalanceReport")
            .with_status(200)
            .with_body(r#"{"ApiCallSuccessful": false}"#)
            .create_async()
            .await;

        let ctx = test_support::context(&server, log_dir.path());
        let err = ctx
            .call("GetTrialBalanceReport", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Unsuccessful { .. }));

        let log = std::fs::read_to_string(log_dir.path().join(AUDIT_LOG_FILE))?;
        assert!(log.contains("ERROR - Exception occurred: API call unsuccessful"));
        Ok(())
    }
}
