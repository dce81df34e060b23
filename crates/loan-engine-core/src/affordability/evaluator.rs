//! Debt-to-income affordability checks.
//!
//! A payment is sustainable when it consumes no more than a threshold share
//! of the applicant's monthly income (40% by default). When income is not
//! known the verdict is left open rather than reported as unaffordable.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::terms::validate_term_periods;
use crate::amortization::{compute_periodic_payment, periodic_rate, LoanTerms};
use crate::error::LoanEngineError;
use crate::frequency::PaymentFrequency;
use crate::time_value;
use crate::types::{round_money, round_ratio, with_metadata, ComputationOutput, Money, Rate, CURRENCY_DP};
use crate::LoanEngineResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Share of monthly income a loan payment may consume.
pub const DEFAULT_DTI_THRESHOLD: Rate = dec!(0.4);

const MONTHS_PER_YEAR: Decimal = dec!(12);

fn default_threshold() -> Rate {
    DEFAULT_DTI_THRESHOLD
}

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Outcome of an affordability check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityAssessment {
    /// Monthly payment the check was run against.
    pub monthly_payment: Money,
    pub threshold: Rate,
    pub required_monthly_income: Money,
    pub applicant_monthly_income: Option<Money>,
    /// `None` when income is unknown.
    pub is_affordable: Option<bool>,
    /// Payment divided by income; `None` when income is unknown or zero.
    pub debt_to_income_ratio: Option<Rate>,
    /// Income multiplied by the threshold.
    pub max_affordable_payment: Option<Money>,
    /// Max affordable payment minus the payment; negative when over budget.
    pub payment_headroom: Option<Money>,
}

/// Input for an affordability check. Either `loan` or `payment` must be set;
/// a loan takes precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan: Option<LoanTerms>,
    /// Periodic payment, used when no loan is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Money>,
    /// Frequency of `payment`.
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<Money>,
    #[serde(default = "default_threshold")]
    pub debt_to_income_threshold: Rate,
}

/// Input for sizing the largest loan an income supports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxPrincipalInput {
    pub monthly_income: Money,
    #[serde(default = "default_threshold")]
    pub debt_to_income_threshold: Rate,
    pub annual_rate_percent: Decimal,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    pub term_periods: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxPrincipalOutput {
    pub max_principal: Money,
    pub max_periodic_payment: Money,
    pub max_monthly_payment: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evaluate a monthly payment against an applicant's monthly income.
pub fn evaluate(
    payment: Money,
    monthly_income: Option<Money>,
    debt_to_income_threshold: Rate,
) -> LoanEngineResult<AffordabilityAssessment> {
    if payment <= Decimal::ZERO {
        return Err(LoanEngineError::InvalidAmount {
            field: "payment".into(),
            reason: "Payment must be positive".into(),
        });
    }
    validate_threshold(debt_to_income_threshold)?;
    if let Some(income) = monthly_income {
        if income < Decimal::ZERO {
            return Err(LoanEngineError::InvalidAmount {
                field: "monthly_income".into(),
                reason: "Monthly income cannot be negative".into(),
            });
        }
    }

    // Unrounded; the verdict must not round in the applicant's favour
    let required_exact = payment
        .checked_div(debt_to_income_threshold)
        .ok_or_else(|| LoanEngineError::computation("required monthly income"))?;
    let required_monthly_income = round_money(required_exact);

    let (is_affordable, debt_to_income_ratio, max_affordable_payment, payment_headroom) =
        match monthly_income {
            None => (None, None, None, None),
            Some(income) => {
                let ratio = if income.is_zero() {
                    None
                } else {
                    let ratio = payment
                        .checked_div(income)
                        .ok_or_else(|| LoanEngineError::computation("debt-to-income ratio"))?;
                    Some(round_ratio(ratio))
                };
                let max_payment = income
                    .checked_mul(debt_to_income_threshold)
                    .map(round_money)
                    .ok_or_else(|| LoanEngineError::computation("max affordable payment"))?;
                let headroom = max_payment
                    .checked_sub(payment)
                    .ok_or_else(|| LoanEngineError::computation("payment headroom"))?;
                (
                    Some(income >= required_exact),
                    ratio,
                    Some(max_payment),
                    Some(headroom),
                )
            }
        };

    Ok(AffordabilityAssessment {
        monthly_payment: payment,
        threshold: debt_to_income_threshold,
        required_monthly_income,
        applicant_monthly_income: monthly_income,
        is_affordable,
        debt_to_income_ratio,
        max_affordable_payment,
        payment_headroom,
    })
}

/// Monthly equivalent of a payment made at another frequency.
pub fn monthly_equivalent(
    payment: Money,
    frequency: PaymentFrequency,
) -> LoanEngineResult<Money> {
    payment
        .checked_mul(Decimal::from(frequency.periods_per_year()))
        .map(|annual| round_money(annual / MONTHS_PER_YEAR))
        .ok_or_else(|| LoanEngineError::computation("monthly equivalent payment"))
}

/// Assess affordability of a loan (or a raw periodic payment).
pub fn assess_affordability(
    input: &AffordabilityInput,
) -> LoanEngineResult<ComputationOutput<AffordabilityAssessment>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (periodic_payment, frequency) = match (&input.loan, input.payment) {
        (Some(loan), _) => {
            let periods = loan.resolve_term_periods()?;
            let payment = compute_periodic_payment(
                loan.principal,
                loan.annual_rate_percent,
                loan.frequency,
                periods,
            )?;
            (payment, loan.frequency)
        }
        (None, Some(payment)) => (payment, input.payment_frequency),
        (None, None) => {
            return Err(LoanEngineError::InvalidAmount {
                field: "payment".into(),
                reason: "Either a loan or a payment must be provided".into(),
            })
        }
    };

    let monthly_payment = monthly_equivalent(periodic_payment, frequency)?;
    let assessment = evaluate(
        monthly_payment,
        input.monthly_income,
        input.debt_to_income_threshold,
    )?;

    match assessment.is_affordable {
        None => warnings.push("Monthly income unknown; affordability not determined".into()),
        Some(false) => warnings.push(format!(
            "Payment of {} exceeds {}% of monthly income",
            monthly_payment,
            (input.debt_to_income_threshold * dec!(100)).normalize()
        )),
        Some(true) => {}
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt-to-income affordability (required income = monthly payment / threshold)",
        &serde_json::json!({
            "periodic_payment": periodic_payment.to_string(),
            "frequency": frequency,
            "debt_to_income_threshold": input.debt_to_income_threshold.to_string(),
            "income_known": input.monthly_income.is_some(),
        }),
        warnings,
        elapsed,
        assessment,
    ))
}

/// Largest principal whose level payment stays within the threshold share of
/// monthly income. Rounded down to the cent.
pub fn max_affordable_principal(
    monthly_income: Money,
    debt_to_income_threshold: Rate,
    annual_rate_percent: Decimal,
    frequency: PaymentFrequency,
    term_periods: u32,
) -> LoanEngineResult<MaxPrincipalOutput> {
    if monthly_income <= Decimal::ZERO {
        return Err(LoanEngineError::InvalidAmount {
            field: "monthly_income".into(),
            reason: "Monthly income must be positive".into(),
        });
    }
    validate_threshold(debt_to_income_threshold)?;
    validate_term_periods(term_periods)?;
    if annual_rate_percent < Decimal::ZERO {
        return Err(LoanEngineError::InvalidRate {
            field: "annual_rate_percent".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }

    let max_monthly_payment = monthly_income
        .checked_mul(debt_to_income_threshold)
        .map(round_down)
        .ok_or_else(|| LoanEngineError::computation("max monthly payment"))?;
    let max_periodic_payment = max_monthly_payment
        .checked_mul(MONTHS_PER_YEAR)
        .map(|annual| round_down(annual / Decimal::from(frequency.periods_per_year())))
        .ok_or_else(|| LoanEngineError::computation("max periodic payment"))?;
    let rate = periodic_rate(annual_rate_percent, frequency);
    let max_principal = round_down(time_value::pv(rate, term_periods, max_periodic_payment)?);

    tracing::debug!(
        %monthly_income,
        %max_periodic_payment,
        %max_principal,
        "sized maximum affordable principal"
    );

    Ok(MaxPrincipalOutput {
        max_principal,
        max_periodic_payment,
        max_monthly_payment,
    })
}

/// Envelope wrapper around [`max_affordable_principal`].
pub fn calculate_max_principal(
    input: &MaxPrincipalInput,
) -> LoanEngineResult<ComputationOutput<MaxPrincipalOutput>> {
    let start = Instant::now();
    let output = max_affordable_principal(
        input.monthly_income,
        input.debt_to_income_threshold,
        input.annual_rate_percent,
        input.frequency,
        input.term_periods,
    )?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Maximum affordable principal (present value of the largest sustainable payment)",
        &serde_json::json!({
            "monthly_income": input.monthly_income.to_string(),
            "debt_to_income_threshold": input.debt_to_income_threshold.to_string(),
            "annual_rate_percent": input.annual_rate_percent.to_string(),
            "frequency": input.frequency,
            "term_periods": input.term_periods,
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_threshold(threshold: Rate) -> LoanEngineResult<()> {
    if threshold <= Decimal::ZERO || threshold > Decimal::ONE {
        return Err(LoanEngineError::InvalidAmount {
            field: "debt_to_income_threshold".into(),
            reason: "Threshold must be in (0, 1]".into(),
        });
    }
    Ok(())
}

fn round_down(value: Money) -> Money {
    value.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::ToZero)
}
