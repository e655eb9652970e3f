//! Allied insurance interface file: has the servicer build the nightly
//! insurance interface export and stores the returned file at the
//! destination path.

use std::path::Path;

use chrono::Local;
use serde::Serialize;

use crate::document;
use crate::error::{GatewayError, Result};
use crate::outcome::TaskOutcome;

use super::TaskContext;

const ENDPOINT: &str = "CreateAlliedInsuranceInterfaceFile";
const DOCUMENT_PATH: &str = "File";

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// Most of the request is placeholder content from the vendor's sample
// payload; the service selects loans itself and only SystemDate and Token
// matter. The deployed integration has always sent it this way.

#[derive(Debug, Serialize)]
struct InvestorFilter<'a> {
    #[serde(rename = "Bank")]
    bank: &'a str,
    #[serde(rename = "Investor")]
    investor: &'a str,
    #[serde(rename = "Group")]
    group: &'a str,
    #[serde(rename = "CompositeInvestorCode")]
    composite_investor_code: &'a str,
}

#[derive(Debug, Serialize)]
struct AlliedCreateRequest<'a> {
    #[serde(rename = "FilePath")]
    file_path: &'a str,
    #[serde(rename = "Loans")]
    loans: Vec<i64>,
    #[serde(rename = "Investors")]
    investors: Vec<InvestorFilter<'a>>,
    #[serde(rename = "Payees")]
    payees: Vec<i64>,
    #[serde(rename = "ErrorMessage")]
    error_message: &'a str,
    #[serde(rename = "SystemDate")]
    system_date: String,
    #[serde(rename = "Token")]
    token: &'a str,
    #[serde(rename = "ApiParameters")]
    api_parameters: &'a str,
}

#[derive(Debug, Serialize)]
struct AlliedRequest<'a> {
    #[serde(rename = "CreateRequest")]
    create_request: AlliedCreateRequest<'a>,
}

fn sample_investor() -> InvestorFilter<'static> {
    InvestorFilter {
        bank: "sample string",
        investor: "sample string",
        group: "sample string",
        composite_investor_code: "sample string",
    }
}

/// Build the insurance interface file and write it to `dest`.
///
/// Nights with no qualifying activity return a successful envelope without
/// a payload; that is a soft success ("no file retrieved"), not a failure.
pub async fn create_allied_insurance_interface_file(
    ctx: &TaskContext,
    dest: &Path,
) -> Result<TaskOutcome> {
    // The destination directory is expected to exist even on no-file nights.
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GatewayError::filesystem(parent, e))?;
    }

    let body = serde_json::to_value(AlliedRequest {
        create_request: AlliedCreateRequest {
            file_path: "sample string",
            loans: vec![500, 500],
            investors: vec![sample_investor(), sample_investor()],
            payees: vec![1, 1],
            error_message: "sample string",
            system_date: Local::now().format(DATE_FORMAT).to_string(),
            token: &ctx.token,
            api_parameters: "sample string",
        },
    })?;

    let envelope = ctx.call(ENDPOINT, &body).await?;

    match document::materialize(&envelope, DOCUMENT_PATH, dest) {
        Ok(_) => Ok(TaskOutcome::written(
            format!("Wrote file at {}", dest.display()),
            envelope,
        )),
        Err(GatewayError::MissingDocument { .. }) => {
            Ok(TaskOutcome::unchanged("no file retrieved", envelope))
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// Tests
// ============================================================================
