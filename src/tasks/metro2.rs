//! Metro 2 credit bureau export: asks the servicer for its configured
//! credit-bureau file path, then has it generate the Metro 2 files and recap
//! report at that path.
//!
//! The files land on the vendor side (a share the servicer host exports), so
//! nothing is materialized locally; the returned envelope is trimmed of its
//! bulk loan data before it is handed back.

use chrono::Local;
use serde::Serialize;
use serde_json::Value;

use crate::audit::redact::REDACTED;
use crate::document;
use crate::error::{GatewayError, Result};
use crate::outcome::TaskOutcome;

use super::TaskContext;

const COMPANY_INFO_ENDPOINT: &str = "MortgageServicerService.svc/REST/GetMsCompanyInformation";
const METRO2_ENDPOINT: &str = "BatchService.svc/REST/CreateMetro2FileAndReport";

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Envelope fields replaced before the response leaves the task: the report
/// payload plus the per-loan listings, which carry customer account numbers.
const BULK_DATA_FIELDS: [&str; 3] = ["RecapReportItems", "CreditBureauLoans", "FileTotals"];

#[derive(Debug, Serialize)]
struct CompanyInfoRequest<'a> {
    #[serde(rename = "Message")]
    message: TokenOnlyMessage<'a>,
}

#[derive(Debug, Serialize)]
struct TokenOnlyMessage<'a> {
    #[serde(rename = "Token")]
    token: &'a str,
}

#[derive(Debug, Serialize)]
struct Metro2Message<'a> {
    #[serde(rename = "IsEquifax")]
    is_equifax: bool,
    #[serde(rename = "IsExperian")]
    is_experian: bool,
    #[serde(rename = "IsInnovis")]
    is_innovis: bool,
    #[serde(rename = "IsTransUnion")]
    is_trans_union: bool,
    #[serde(rename = "IsCreateFileForConnect")]
    is_create_file_for_connect: bool,
    #[serde(rename = "IsUpdate")]
    is_update: bool,
    #[serde(rename = "FilePath")]
    file_path: &'a str,
    /// The service ignores this field; the value is what its own sample
    /// payload ships and what the deployed integration has always sent.
    #[serde(rename = "ApiParameters")]
    api_parameters: &'a str,
    #[serde(rename = "SystemDate")]
    system_date: String,
    #[serde(rename = "Token")]
    token: &'a str,
}

#[derive(Debug, Serialize)]
struct Metro2Request<'a> {
    #[serde(rename = "Message")]
    message: Metro2Message<'a>,
    #[serde(rename = "SaveToRadstar")]
    save_to_radstar: bool,
}

/// Generate the Metro 2 files for Equifax, Experian and TransUnion.
///
/// The export is written by the vendor at its configured `FilePath`; the
/// outcome reports `changed = true` because the call persists new artifacts,
/// just not through this process's filesystem writes.
pub async fn create_metro2_file_and_report(ctx: &TaskContext) -> Result<TaskOutcome> {
    let info_body = serde_json::to_value(CompanyInfoRequest {
        message: TokenOnlyMessage { token: &ctx.token },
    })?;
    let company_info = ctx.call(COMPANY_INFO_ENDPOINT, &info_body).await?;
    // FilePath is required configuration for the export, not a document
    // payload; report its absence as such.
    let file_path = match document::extract_field(&company_info, "FilePath") {
        Ok(path) => path.to_string(),
        Err(GatewayError::MissingDocument { .. }) => {
            return Err(GatewayError::Configuration(
                "company information response has no FilePath".to_string(),
            ))
        }
        Err(e) => return Err(e),
    };

    let body = serde_json::to_value(Metro2Request {
        message: Metro2Message {
            is_equifax: true,
            is_experian: true,
            is_innovis: false,
            is_trans_union: true,
            is_create_file_for_connect: true,
            is_update: true,
            file_path: &file_path,
            api_parameters: "sample string",
            system_date: Local::now().format(DATE_FORMAT).to_string(),
            token: &ctx.token,
        },
        save_to_radstar: true,
    })?;

    let mut envelope = ctx.call(METRO2_ENDPOINT, &body).await?;
    trim_bulk_fields(&mut envelope, &file_path);

    Ok(TaskOutcome::written("Credit Bureau Files Created", envelope))
}

/// Drop the report payload and per-loan listings from the envelope and note
/// where the vendor wrote the files instead.
fn trim_bulk_fields(envelope: &mut Value, file_path: &str) {
    if let Some(doc) = envelope.get_mut("Document").and_then(Value::as_object_mut) {
        if doc.contains_key("DocumentBase64") {
            doc.insert("DocumentBase64".to_string(), Value::String(REDACTED.to_string()));
        }
    }
    if let Some(data) = envelope.get_mut("Data").and_then(Value::as_object_mut) {
        for field in BULK_DATA_FIELDS {
            if data.contains_key(field) {
                data.insert(field.to_string(), Value::String(REDACTED.to_string()));
            }
        }
    }
    if let Some(envelope) = envelope.as_object_mut() {
        envelope.insert("file_path".to_string(), Value::String(file_path.to_string()));
    }
}

// ============================================================================
// Tests
// ============================================================================
