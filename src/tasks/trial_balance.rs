//! Trial balance report: renders the servicer-wide trial balance PDF and
//! stores it at the destination path.

use std::path::Path;

use serde::Serialize;

use crate::document;
use crate::error::{GatewayError, Result};
use crate::outcome::TaskOutcome;

use super::TaskContext;

const ENDPOINT: &str = "GetTrialBalanceReport";
const DOCUMENT_PATH: &str = "Document.DocumentBase64";

/// Report options the operations team runs with: every loan, grouped by
/// bank/investor, history recorded.
#[derive(Debug, Serialize)]
struct TrialBalanceMessage<'a> {
    #[serde(rename = "AllLoans")]
    all_loans: bool,
    #[serde(rename = "CreateHistory")]
    create_history: bool,
    #[serde(rename = "NegativeTiBalanceLoans")]
    negative_ti_balance_loans: bool,
    #[serde(rename = "IncludePif")]
    include_pif: bool,
    #[serde(rename = "LoanSort")]
    loan_sort: bool,
    #[serde(rename = "LoanNameSort")]
    loan_name_sort: bool,
    #[serde(rename = "InvestorLoanSort")]
    investor_loan_sort: bool,
    #[serde(rename = "BankInvestorGroupSort")]
    bank_investor_group_sort: bool,
    #[serde(rename = "PageBreakInvestor")]
    page_break_investor: bool,
    #[serde(rename = "ReportNotes")]
    report_notes: &'a str,
    #[serde(rename = "Token")]
    token: &'a str,
}

#[derive(Debug, Serialize)]
struct TrialBalanceRequest<'a> {
    #[serde(rename = "Message")]
    message: TrialBalanceMessage<'a>,
}

/// Fetch the trial balance report and write it to `dest`.
///
/// A successful envelope without a document is a soft failure: the outcome
/// reports it and no file is touched.
pub async fn get_trial_balance_report(ctx: &TaskContext, dest: &Path) -> Result<TaskOutcome> {
    let body = serde_json::to_value(TrialBalanceRequest {
        message: TrialBalanceMessage {
            all_loans: true,
            create_history: true,
            negative_ti_balance_loans: false,
            include_pif: false,
            loan_sort: false,
            loan_name_sort: false,
            investor_loan_sort: false,
            bank_investor_group_sort: true,
            page_break_investor: false,
            report_notes: "",
            token: &ctx.token,
        },
    })?;

    let envelope = ctx.call(ENDPOINT, &body).await?;

    match document::materialize(&envelope, DOCUMENT_PATH, dest) {
        Ok(_) => Ok(TaskOutcome::written(
            format!("Wrote file at {}", dest.display()),
            envelope,
        )),
        Err(GatewayError::MissingDocument { .. }) => Ok(TaskOutcome::soft_failure(
            "no report file found in api response",
            envelope,
        )),
        Err(e) => Err(e),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde_json::json;

    use super::super::test_support;
    use super::*;
    use crate::error::GatewayError;

    #[tokio::test]
    async fn test_report_is_written_and_outcome_changed() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let log_dir = tempfile::tempdir()?;
        let out_dir = tempfile::tempdir()?;

        let mock = server
            .mock("POST", "/GetTrialBalanceReport")
            .match_body(mockito::Matcher::PartialJson(json!({
                "Message": {"AllLoans": true, "BankInvestorGroupSort": true, "Token": "test-token"}
            })))
            .with_status(200)
            .with_body(test_support::success_body(
                json!({"Document": {"DocumentBase64": STANDARD.encode(b"hello")}}),
            ))
            .create_async()
            .await;

        let ctx = test_support::context(&server, log_dir.path());
        let dest = out_dir.path().join("reports").join("trial_balance.pdf");
        let outcome = get_trial_balance_report(&ctx, &dest).await?;

        mock.assert_async().await;
        assert!(outcome.changed);
        assert!(!outcome.failed);
        assert_eq!(std::fs::read(&dest)?, b"hello");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_document_is_soft_failure() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let log_dir = tempfile::tempdir()?;
        let out_dir = tempfile::tempdir()?;

        let _mock = server
            .mock("POST", "/GetTrialBalanceReport")
            .with_status(200)
            .with_body(test_support::success_body(json!({})))
            .create_async()
            .await;

        let ctx = test_support::context(&server, log_dir.path());
        let dest = out_dir.path().join("trial_balance.pdf");
        let outcome = get_trial_balance_report(&ctx, &dest).await?;

        assert!(!outcome.changed);
        assert!(outcome.failed);
        assert!(outcome.message.contains("no report file"));
        assert!(!dest.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope_fails_without_writing() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let log_dir = tempfile::tempdir()?;
        let out_dir = tempfile::tempdir()?;

        let _mock = server
            .mock("POST", "/GetTrialBalanceReport")
            .with_status(200)
            .with_body(r#"{"ApiCallSuccessful": false}"#)
            .create_async()
            .await;

        let ctx = test_support::context(&server, log_dir.path());
        let dest = out_dir.path().join("trial_balance.pdf");
        let err = get_trial_balance_report(&ctx, &dest).await.unwrap_err();

        assert!(matches!(err, GatewayError::Unsuccessful { .. }));
        assert!(!dest.exists());
        Ok(())
    }
}
