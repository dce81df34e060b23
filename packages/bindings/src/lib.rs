use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use loan_engine_core::affordability::{self, AffordabilityInput, MaxPrincipalInput};
use loan_engine_core::amortization::{self, LoanTerms};
use loan_engine_core::comparison::{self, OfferComparisonInput, ScenarioDeltaInput};
use loan_engine_core::PaymentFrequency;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn amortize_loan(input_json: String) -> NapiResult<String> {
    let input: LoanTerms = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::amortize(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Payment-only request; no start date needed.
#[derive(Deserialize)]
struct PaymentRequest {
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_periods: u32,
    #[serde(default)]
    frequency: PaymentFrequency,
}

#[derive(Serialize)]
struct PaymentResponse {
    periodic_payment: Decimal,
    periodic_rate: Decimal,
}

#[napi]
pub fn compute_payment(input_json: String) -> NapiResult<String> {
    let input: PaymentRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let periodic_payment = amortization::compute_periodic_payment(
        input.principal,
        input.annual_rate_percent,
        input.frequency,
        input.term_periods,
    )
    .map_err(to_napi_error)?;
    let output = PaymentResponse {
        periodic_payment,
        periodic_rate: amortization::periodic_rate(input.annual_rate_percent, input.frequency),
    };
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_loan_offers(input_json: String) -> NapiResult<String> {
    let input: OfferComparisonInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = comparison::compare_offers(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn scenario_delta(input_json: String) -> NapiResult<String> {
    let input: ScenarioDeltaInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = comparison::compare_scenarios(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Affordability
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_affordability(input_json: String) -> NapiResult<String> {
    let input: AffordabilityInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = affordability::assess_affordability(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn max_affordable_principal(input_json: String) -> NapiResult<String> {
    let input: MaxPrincipalInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = affordability::calculate_max_principal(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
