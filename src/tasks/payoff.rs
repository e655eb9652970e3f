//! Payoff statement: renders a payoff quote PDF for one loan and stores it
//! under the destination directory, named after the borrower's mailing name.

use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::Value;

use crate::document;
use crate::error::Result;
use crate::outcome::TaskOutcome;

use super::TaskContext;

const ENDPOINT: &str = "ProcessWindowObjectData";
const DOCUMENT_PATH: &str = "Document.DocumentBase64";

/// Payoff dates go over the wire as a midnight timestamp.
const DATE_FORMAT: &str = "%Y-%m-%dT00:00:00";

/// Boilerplate printed on every statement; wording owned by the servicing
/// department.
const STATEMENT_COMMENT: &str = "When remitting funds, please use our loan number to insure proper posting and provide us with the borrower\u{2019}s forwarding address.  Funds received in this office after 12:00 noon will be processed on the next business day, with interest charged to that date.\n \nAll payoff figures are subject to clearance of funds in transit.  The payoff is subject to final audit when presented.  Any overpayment or refunds will be mailed directly to the borrower.";

/// Caller-facing parameters for one payoff statement.
#[derive(Debug, Clone)]
pub struct PayoffRequest {
    pub loan_id: i64,
    pub loan_name: String,
    pub property_address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub payoff_date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct WindowObject<'a> {
    #[serde(rename = "LoanId")]
    loan_id: i64,
    #[serde(rename = "UseLogo")]
    use_logo: bool,
    #[serde(rename = "PayoffDate")]
    payoff_date: String,
    #[serde(rename = "SuppressPrinting")]
    suppress_printing: bool,
    #[serde(rename = "CalcOption")]
    calc_option: &'a str,
    #[serde(rename = "MailingOption")]
    mailing_option: &'a str,
    #[serde(rename = "MailingName")]
    mailing_name: &'a str,
    #[serde(rename = "MailingAddress1")]
    mailing_address1: &'a str,
    #[serde(rename = "MailingCityStateZip")]
    mailing_city_state_zip: String,
    #[serde(rename = "ItemLine1")]
    item_line1: &'a str,
    #[serde(rename = "ItemLine1Amount")]
    item_line1_amount: i64,
    #[serde(rename = "Comment")]
    comment: &'a str,
    #[serde(rename = "InterestCalculationMethodEnum")]
    interest_calculation_method: &'a str,
    #[serde(rename = "UseNetDeferredBalance")]
    use_net_deferred_balance: bool,
    #[serde(rename = "Update")]
    update: bool,
    #[serde(rename = "DeferredInterestYn")]
    deferred_interest_yn: bool,
    #[serde(rename = "UnappliedYn")]
    unapplied_yn: bool,
    #[serde(rename = "DelLateChargesYn")]
    del_late_charges_yn: bool,
    #[serde(rename = "TaxAndInsuranceYn")]
    tax_and_insurance_yn: bool,
    #[serde(rename = "NegTaxAndInsuranceYn")]
    neg_tax_and_insurance_yn: bool,
    #[serde(rename = "ExpectedTaxAndInsuranceYn")]
    expected_tax_and_insurance_yn: bool,
    #[serde(rename = "CalcLateChargesYn")]
    calc_late_charges_yn: bool,
    #[serde(rename = "SubsidyYn")]
    subsidy_yn: bool,
    #[serde(rename = "ForeclosureBankruptcyYn")]
    foreclosure_bankruptcy_yn: bool,
    #[serde(rename = "ReturnCheckChargesYn")]
    return_check_charges_yn: bool,
    #[serde(rename = "FinalMIPPMIYn")]
    final_mip_pmi_yn: bool,
    #[serde(rename = "MiscFeesYn")]
    misc_fees_yn: bool,
    #[serde(rename = "LossDraftYn")]
    loss_draft_yn: bool,
    #[serde(rename = "EscrowAdvanceYn")]
    escrow_advance_yn: bool,
    #[serde(rename = "Token")]
    token: &'a str,
}

#[derive(Debug, Serialize)]
struct PayoffBody<'a> {
    #[serde(rename = "WindowObject")]
    window_object: WindowObject<'a>,
}

/// `{MailingCorrName}_{loan_id}_{YYYY-MM-DD}_payoff_statement.pdf`, falling
/// back to the supplied loan name when the envelope has no mailing name.
fn statement_file_name(envelope: &Value, fallback_name: &str, loan_id: i64) -> String {
    let mail_name = envelope
        .pointer("/Data/MailingCorrName")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| s.replace(' ', "_"))
        .unwrap_or_else(|| fallback_name.to_string());
    format!(
        "{}_{}_{}_payoff_statement.pdf",
        mail_name,
        loan_id,
        Local::now().format("%Y-%m-%d")
    )
}

/// Generate and store the payoff statement for one loan under `dest_dir`.
///
/// A successful envelope without the document is a hard `MissingDocument`
/// failure here: the statement is the whole point of the call.
pub async fn process_payoff_statement(
    ctx: &TaskContext,
    request: &PayoffRequest,
    dest_dir: &Path,
) -> Result<TaskOutcome> {
    let body = serde_json::to_value(PayoffBody {
        window_object: WindowObject {
            loan_id: request.loan_id,
            use_logo: true,
            payoff_date: request.payoff_date.format(DATE_FORMAT).to_string(),
            suppress_printing: true,
            calc_option: "ThreeSixtyFive",
            mailing_option: "Borrower",
            mailing_name: &request.loan_name,
            mailing_address1: &request.property_address,
            mailing_city_state_zip: format!(
                "{}, {} {}",
                request.city, request.state, request.zip
            ),
            item_line1: "Release Fee",
            item_line1_amount: 25,
            comment: STATEMENT_COMMENT,
            interest_calculation_method: "DailyInterest365",
            use_net_deferred_balance: true,
            update: true,
            deferred_interest_yn: true,
            unapplied_yn: true,
            del_late_charges_yn: true,
            tax_and_insurance_yn: false,
            neg_tax_and_insurance_yn: false,
            expected_tax_and_insurance_yn: false,
            calc_late_charges_yn: true,
            subsidy_yn: false,
            foreclosure_bankruptcy_yn: false,
            return_check_charges_yn: false,
            final_mip_pmi_yn: false,
            misc_fees_yn: true,
            loss_draft_yn: false,
            escrow_advance_yn: true,
            token: &ctx.token,
        },
    })?;

    let envelope = ctx.call(ENDPOINT, &body).await?;

    let dest = dest_dir.join(statement_file_name(&envelope, &request.loan_name, request.loan_id));
    document::materialize(&envelope, DOCUMENT_PATH, &dest)?;

    Ok(TaskOutcome::written(
        format!("Wrote file at {}", dest.display()),
        envelope,
    ))
}

// ============================================================================
// Tests
// ============================================================================
