//! Side-by-side comparison of competing loan offers.
//!
//! Every offer is amortized on its own terms, then flagged for the lowest
//! nominal rate, the lowest periodic payment and the lowest total repayment.
//! Ties go to the offer that appears first in the input, and the output keeps
//! the input order.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::terms::{validate_principal, validate_term_periods};
use crate::amortization::{build_amortization, periodic_rate, AmortizationResult};
use crate::error::LoanEngineError;
use crate::frequency::PaymentFrequency;
use crate::time_value;
use crate::types::{round_ratio, with_metadata, ComputationOutput, Money, Rate};
use crate::LoanEngineResult;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// A loan offer from one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanOffer {
    pub id: String,
    pub provider_name: String,
    pub loan_name: String,
    /// Nominal annual rate as a percentage.
    pub interest_rate: Decimal,
    /// Falls back to the shared term when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_periods: Option<u32>,
    /// Falls back to the shared principal when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    /// Upfront fees deducted from the amount disbursed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<String>>,
}

/// Input for comparing a set of offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferComparisonInput {
    pub offers: Vec<LoanOffer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_principal: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_term_periods: Option<u32>,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    pub start_date: NaiveDate,
}

/// One offer's amortization and ranking flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub offer_id: String,
    pub provider_name: String,
    pub loan_name: String,
    pub interest_rate: Decimal,
    pub amortization: AmortizationResult,
    pub fees: Money,
    /// Total repayment plus upfront fees.
    pub total_cost_with_fees: Money,
    /// Fee-inclusive nominal annual rate, as a percentage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_annual_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    pub is_best_rate: bool,
    pub is_lowest_payment: bool,
    pub is_lowest_total_cost: bool,
}

/// Output of an offer comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferComparisonOutput {
    /// Same order as the input offers.
    pub results: Vec<ComparisonResult>,
    pub best_rate_offer_id: String,
    pub lowest_payment_offer_id: String,
    pub lowest_total_cost_offer_id: String,
}

/// Offer terms after falling back to the shared parameters.
struct ResolvedOffer<'a> {
    offer: &'a LoanOffer,
    principal: Money,
    term_periods: u32,
    fees: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare loan offers and flag the best rate, lowest payment and lowest
/// total cost.
pub fn compare_offers(
    input: &OfferComparisonInput,
) -> LoanEngineResult<ComputationOutput<OfferComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let results = compare(
        &input.offers,
        input.shared_principal,
        input.shared_term_periods,
        input.frequency,
        input.start_date,
    )?;

    for r in &results {
        if r.effective_annual_rate.is_none() {
            warnings.push(format!(
                "Effective annual rate for offer '{}' could not be determined",
                r.offer_id
            ));
        }
    }
    let principals: Vec<Money> = results.iter().map(|r| r.amortization.principal).collect();
    if principals.windows(2).any(|w| w[0] != w[1]) {
        warnings.push(
            "Offers have different loan amounts; total cost is not like-for-like".into(),
        );
    }

    let flagged_id = |flag: fn(&ComparisonResult) -> bool| {
        results
            .iter()
            .find(|r| flag(r))
            .map(|r| r.offer_id.clone())
            .unwrap_or_default()
    };
    let output = OfferComparisonOutput {
        best_rate_offer_id: flagged_id(|r| r.is_best_rate),
        lowest_payment_offer_id: flagged_id(|r| r.is_lowest_payment),
        lowest_total_cost_offer_id: flagged_id(|r| r.is_lowest_total_cost),
        results,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan offer comparison — per-offer amortization, first-in-order tie-break",
        &serde_json::json!({
            "num_offers": input.offers.len(),
            "shared_principal": input.shared_principal.map(|p| p.to_string()),
            "shared_term_periods": input.shared_term_periods,
            "frequency": input.frequency,
            "start_date": input.start_date,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Amortize every offer and set the ranking flags.
///
/// All offers are validated before any of them is amortized.
pub fn compare(
    offers: &[LoanOffer],
    shared_principal: Option<Money>,
    shared_term_periods: Option<u32>,
    frequency: PaymentFrequency,
    start_date: NaiveDate,
) -> LoanEngineResult<Vec<ComparisonResult>> {
    if offers.is_empty() {
        return Err(LoanEngineError::EmptyOfferSet);
    }

    let resolved = offers
        .iter()
        .map(|offer| resolve_offer(offer, shared_principal, shared_term_periods))
        .collect::<LoanEngineResult<Vec<_>>>()?;

    let mut results: Vec<ComparisonResult> = Vec::with_capacity(resolved.len());
    for r in resolved {
        let amortization = build_amortization(
            r.principal,
            r.offer.interest_rate,
            frequency,
            r.term_periods,
            start_date,
        )?;
        let effective_annual_rate =
            effective_annual_rate(&amortization, r.fees, r.offer.interest_rate, frequency);
        let total_cost_with_fees = amortization
            .total_payment
            .checked_add(r.fees)
            .ok_or_else(|| {
                LoanEngineError::computation(format!(
                    "total cost with fees for offer '{}'",
                    r.offer.id
                ))
            })?;

        results.push(ComparisonResult {
            offer_id: r.offer.id.clone(),
            provider_name: r.offer.provider_name.clone(),
            loan_name: r.offer.loan_name.clone(),
            interest_rate: r.offer.interest_rate,
            total_cost_with_fees,
            fees: r.fees,
            effective_annual_rate,
            requirements: r.offer.requirements.clone().unwrap_or_default(),
            amortization,
            is_best_rate: false,
            is_lowest_payment: false,
            is_lowest_total_cost: false,
        });
    }

    if let Some(i) = first_min_index(&results, |r| r.interest_rate) {
        results[i].is_best_rate = true;
    }
    if let Some(i) = first_min_index(&results, |r| r.amortization.periodic_payment) {
        results[i].is_lowest_payment = true;
    }
    if let Some(i) = first_min_index(&results, |r| r.amortization.total_payment) {
        results[i].is_lowest_total_cost = true;
    }

    tracing::debug!(num_offers = results.len(), "compared loan offers");

    Ok(results)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn resolve_offer<'a>(
    offer: &'a LoanOffer,
    shared_principal: Option<Money>,
    shared_term_periods: Option<u32>,
) -> LoanEngineResult<ResolvedOffer<'a>> {
    let principal = offer
        .amount
        .or(shared_principal)
        .ok_or_else(|| LoanEngineError::InvalidAmount {
            field: format!("offers[{}].amount", offer.id),
            reason: "Offer has no amount and no shared principal was given".into(),
        })?;
    validate_principal(principal).map_err(|e| for_offer(e, offer, "amount"))?;

    let term_periods = offer
        .term_periods
        .or(shared_term_periods)
        .ok_or_else(|| LoanEngineError::InvalidTerm {
            field: format!("offers[{}].term_periods", offer.id),
            reason: "Offer has no term and no shared term was given".into(),
        })?;
    validate_term_periods(term_periods).map_err(|e| for_offer(e, offer, "term_periods"))?;

    if offer.interest_rate < Decimal::ZERO {
        return Err(LoanEngineError::InvalidRate {
            field: format!("offers[{}].interest_rate", offer.id),
            reason: "Interest rate cannot be negative".into(),
        });
    }

    let fees = offer.fees.unwrap_or(Decimal::ZERO);
    if fees < Decimal::ZERO || fees >= principal {
        return Err(LoanEngineError::InvalidAmount {
            field: format!("offers[{}].fees", offer.id),
            reason: "Fees must be non-negative and less than the loan amount".into(),
        });
    }

    Ok(ResolvedOffer {
        offer,
        principal,
        term_periods,
        fees,
    })
}

/// Re-point a loan validation error at the offer field that caused it.
fn for_offer(error: LoanEngineError, offer: &LoanOffer, field: &str) -> LoanEngineError {
    let field = format!("offers[{}].{}", offer.id, field);
    match error {
        LoanEngineError::InvalidAmount { reason, .. } => {
            LoanEngineError::InvalidAmount { field, reason }
        }
        LoanEngineError::InvalidTerm { reason, .. } => {
            LoanEngineError::InvalidTerm { field, reason }
        }
        other => other,
    }
}

/// Index of the first result holding the minimum key.
fn first_min_index<F>(results: &[ComparisonResult], key: F) -> Option<usize>
where
    F: Fn(&ComparisonResult) -> Decimal,
{
    let mut best: Option<(usize, Decimal)> = None;
    for (i, r) in results.iter().enumerate() {
        let value = key(r);
        match best {
            Some((_, current)) if value >= current => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}

/// Nominal annual rate (percent) at which the net amount received after fees
/// equals the discounted scheduled payments.
fn effective_annual_rate(
    amortization: &AmortizationResult,
    fees: Money,
    nominal_rate_percent: Decimal,
    frequency: PaymentFrequency,
) -> Option<Rate> {
    let mut cash_flows: Vec<Money> = Vec::with_capacity(amortization.schedule.len() + 1);
    cash_flows.push(-(amortization.principal - fees));
    cash_flows.extend(amortization.schedule.iter().map(|p| p.payment_amount));

    let guess = periodic_rate(nominal_rate_percent, frequency);
    match time_value::irr(&cash_flows, guess) {
        Ok(rate) => Some(round_ratio(
            rate * Decimal::from(frequency.periods_per_year()) * Decimal::ONE_HUNDRED,
        )),
        Err(e) => {
            tracing::debug!(error = %e, "effective annual rate did not converge");
            None
        }
    }
}
