//! Advanced selector query: runs a caller-supplied loan query against the
//! core API and returns the structured result. No file is produced.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::outcome::TaskOutcome;

use super::TaskContext;

const ENDPOINT: &str = "GetAdvancedSelectorRequest";

#[derive(Debug, Serialize)]
struct SelectorContent {
    #[serde(rename = "QueryList")]
    query_list: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct SelectorMessage<'a> {
    #[serde(rename = "Content")]
    content: SelectorContent,
    #[serde(rename = "Token")]
    token: &'a str,
}

#[derive(Debug, Serialize)]
struct SelectorRequest<'a> {
    #[serde(rename = "Message")]
    message: SelectorMessage<'a>,
}

/// Run the selector query and hand back the (redacted) envelope.
///
/// The query list is vendor query syntax passed through verbatim; its shape
/// is the caller's business.
pub async fn get_advanced_selector_request(
    ctx: &TaskContext,
    query_list: Vec<Value>,
) -> Result<TaskOutcome> {
    let body = serde_json::to_value(SelectorRequest {
        message: SelectorMessage {
            content: SelectorContent { query_list },
            token: &ctx.token,
        },
    })?;

    let envelope = ctx.call(ENDPOINT, &body).await?;
    Ok(TaskOutcome::unchanged("API call successful", envelope))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::test_support;
    use super::*;

    #[tokio::test]
    async fn test_query_passes_through_and_outcome_is_unchanged() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let log_dir = tempfile::tempdir()?;

        let mock = server
            .mock("POST", "/GetAdvancedSelectorRequest")
            .match_body(mockito::Matcher::PartialJson(json!({
                "Message": {
                    "Content": {"QueryList": [{"Field": "PaidToDate", "Operator": "<"}]},
                    "Token": "test-token",
                }
            })))
            .with_status(200)
            .with_body(test_support::success_body(
                json!({"Data": {"Loans": [101, 102]}}),
            ))
            .create_async()
            .await;

        let ctx = test_support::context(&server, log_dir.path());
        let outcome = get_advanced_selector_request(
            &ctx,
            vec![json!({"Field": "PaidToDate", "Operator": "<"})],
        )
        .await?;

        mock.assert_async().await;
        assert!(!outcome.changed);
        assert!(!outcome.failed);
        assert_eq!(outcome.response["Data"]["Loans"], json!([101, 102]));
        Ok(())
    }
}
