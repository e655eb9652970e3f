//! Late notices run: month-to-date late notice letters plus the summary
//! report, each stored to its own destination.

use std::path::Path;

use chrono::{Datelike, Local, NaiveDateTime};
use serde::Serialize;

use crate::document;
use crate::error::Result;
use crate::outcome::TaskOutcome;

use super::TaskContext;

const ENDPOINT: &str = "RunLateNoticesReport";
const NOTICES_PATH: &str = "LateNotice.Document.DocumentBase64";
const SUMMARY_PATH: &str = "LateNoticeSummaryReport.Document.DocumentBase64";

/// Wire format for dates across the gateway.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Serialize)]
struct LateNoticesMessage<'a> {
    #[serde(rename = "BeginningDate")]
    beginning_date: String,
    #[serde(rename = "EndingDate")]
    ending_date: String,
    #[serde(rename = "PrintLateNoticesLetter")]
    print_late_notices_letter: bool,
    #[serde(rename = "UseLogo")]
    use_logo: bool,
    #[serde(rename = "IncludeReturnedCheckChargeFees")]
    include_returned_check_charge_fees: bool,
    #[serde(rename = "IncludeUnappliedBalance")]
    include_unapplied_balance: bool,
    #[serde(rename = "IncludeUnpaidLateCharges")]
    include_unpaid_late_charges: bool,
    #[serde(rename = "SelectedSortByType")]
    selected_sort_by_type: i32,
    #[serde(rename = "IncludeFACTAct")]
    include_fact_act: bool,
    #[serde(rename = "Token")]
    token: &'a str,
}

#[derive(Debug, Serialize)]
struct LateNoticesRequest<'a> {
    #[serde(rename = "Message")]
    message: LateNoticesMessage<'a>,
}

/// First moment of the current month through now, in local servicer time.
fn month_to_date() -> (NaiveDateTime, NaiveDateTime) {
    let ending = Local::now().naive_local();
    let beginning = ending
        .date()
        .with_day(1)
        .unwrap_or_else(|| ending.date())
        .and_hms_opt(0, 0, 0)
        .unwrap_or(ending);
    (beginning, ending)
}

/// Run the late notices report, writing the notices to `dest` and the
/// summary to `summary_dest`.
///
/// Both documents must be present; if either is missing nothing is written
/// and the outcome is a soft failure.
pub async fn run_late_notices_report(
    ctx: &TaskContext,
    dest: &Path,
    summary_dest: &Path,
) -> Result<TaskOutcome> {
    let (beginning, ending) = month_to_date();
    let body = serde_json::to_value(LateNoticesRequest {
        message: LateNoticesMessage {
            beginning_date: beginning.format(DATE_FORMAT).to_string(),
            ending_date: ending.format(DATE_FORMAT).to_string(),
            print_late_notices_letter: true,
            use_logo: true,
            include_returned_check_charge_fees: true,
            include_unapplied_balance: true,
            include_unpaid_late_charges: true,
            selected_sort_by_type: 1,
            include_fact_act: true,
            token: &ctx.token,
        },
    })?;

    let envelope = ctx.call(ENDPOINT, &body).await?;

    // Check both payloads before writing either, so a half-present response
    // leaves no partial pair behind.
    let both_present = document::extract_field(&envelope, NOTICES_PATH).is_ok()
        && document::extract_field(&envelope, SUMMARY_PATH).is_ok();
    if !both_present {
        return Ok(TaskOutcome::soft_failure(
            "One or more files missing from api response",
            envelope,
        ));
    }

    document::materialize(&envelope, NOTICES_PATH, dest)?;
    document::materialize(&envelope, SUMMARY_PATH, summary_dest)?;

    Ok(TaskOutcome::written(
        format!("Wrote file at {}", dest.display()),
        envelope,
    ))
}

// ============================================================================
// Tests
// ============================================================================
