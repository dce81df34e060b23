use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::payment::{compute_periodic_payment, periodic_rate};
use super::terms::{validate_loan_parameters, LoanTerms};
use crate::error::LoanEngineError;
use crate::frequency::{advance_by, PaymentFrequency};
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::LoanEngineResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One row of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPeriod {
    /// 1-based period number.
    pub index: u32,
    pub due_date: NaiveDate,
    pub beginning_balance: Money,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    /// Balance after this payment. Never negative; zero after the last row.
    pub remaining_balance: Money,
    pub cumulative_interest: Money,
}

/// Payment, totals and the complete schedule for one loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub principal: Money,
    pub periodic_payment: Money,
    pub periodic_rate: Rate,
    pub term_periods: u32,
    pub frequency: PaymentFrequency,
    /// Sum of every payment, including the reconciled final payment.
    pub total_payment: Money,
    /// `total_payment - principal`.
    pub total_interest: Money,
    pub schedule: Vec<PaymentPeriod>,
}

impl AmortizationResult {
    /// Payment actually due in the final period after reconciliation.
    pub fn final_payment(&self) -> Money {
        self.schedule
            .last()
            .map(|p| p.payment_amount)
            .unwrap_or(self.periodic_payment)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Amortize a loan described by raw terms, wrapped in the standard output
/// envelope.
pub fn amortize(terms: &LoanTerms) -> LoanEngineResult<ComputationOutput<AmortizationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let term_periods = terms.resolve_term_periods()?;
    let result = build_amortization(
        terms.principal,
        terms.annual_rate_percent,
        terms.frequency,
        term_periods,
        terms.start_date,
    )?;

    if terms.annual_rate_percent.is_zero() {
        warnings.push("Zero interest rate: payments repay principal only".into());
    }
    if result.total_interest > terms.principal {
        warnings.push(format!(
            "Total interest {} exceeds the principal borrowed",
            result.total_interest
        ));
    }
    let final_payment = result.final_payment();
    if final_payment != result.periodic_payment {
        warnings.push(format!(
            "Final payment reconciled to {} (scheduled {}) to clear rounding residue",
            final_payment, result.periodic_payment
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization (annuity formula, half-up rounding to cents, final-period reconciliation)",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "annual_rate_percent": terms.annual_rate_percent.to_string(),
            "frequency": terms.frequency,
            "term_periods": term_periods,
            "start_date": terms.start_date,
            "periodic_rate": result.periodic_rate.to_string(),
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Compute the payment for the given terms and expand it into a full
/// schedule.
pub fn build_amortization(
    principal: Money,
    annual_rate_percent: Decimal,
    frequency: PaymentFrequency,
    term_periods: u32,
    start_date: NaiveDate,
) -> LoanEngineResult<AmortizationResult> {
    let payment = compute_periodic_payment(principal, annual_rate_percent, frequency, term_periods)?;
    let rate = periodic_rate(annual_rate_percent, frequency);
    generate_schedule(principal, rate, payment, term_periods, start_date, frequency)
}

/// Expand a fixed payment into a period-by-period schedule.
///
/// Interest is rounded to cents each period and the principal portion is
/// whatever is left of the payment. The final period is then overridden so
/// its principal portion equals the outstanding balance, which absorbs all
/// accumulated rounding drift and leaves the balance at exactly zero. The
/// final `payment_amount` changes accordingly and is included in the totals.
pub fn generate_schedule(
    principal: Money,
    periodic_rate: Rate,
    payment: Money,
    term_periods: u32,
    start_date: NaiveDate,
    frequency: PaymentFrequency,
) -> LoanEngineResult<AmortizationResult> {
    validate_loan_parameters(principal, periodic_rate, term_periods)?;
    if payment <= Decimal::ZERO {
        return Err(LoanEngineError::InvalidAmount {
            field: "payment".into(),
            reason: "Periodic payment must be positive".into(),
        });
    }

    let mut schedule: Vec<PaymentPeriod> = Vec::with_capacity(term_periods as usize);
    let mut balance = principal;
    let mut cumulative_interest = Decimal::ZERO;
    let mut total_payment = Decimal::ZERO;

    for index in 1..=term_periods {
        let beginning_balance = balance;
        let interest_portion = round_money(balance.checked_mul(periodic_rate).ok_or_else(|| {
            LoanEngineError::computation(format!("interest for period {index}"))
        })?);

        let overflow = || LoanEngineError::computation(format!("balance in period {index}"));
        let scheduled_principal = payment.checked_sub(interest_portion).ok_or_else(overflow)?;
        let (principal_portion, payment_amount) = if index == term_periods {
            // Final-period reconciliation
            (balance, balance.checked_add(interest_portion).ok_or_else(overflow)?)
        } else if scheduled_principal >= balance {
            // Rounding paid the loan off early; cap so the balance stays >= 0
            (balance, balance.checked_add(interest_portion).ok_or_else(overflow)?)
        } else {
            (scheduled_principal, payment)
        };

        balance = balance.checked_sub(principal_portion).ok_or_else(overflow)?;
        cumulative_interest = cumulative_interest
            .checked_add(interest_portion)
            .ok_or_else(overflow)?;
        total_payment = total_payment
            .checked_add(payment_amount)
            .ok_or_else(|| LoanEngineError::computation("total payment"))?;

        schedule.push(PaymentPeriod {
            index,
            due_date: advance_by(start_date, frequency, index)?,
            beginning_balance,
            payment_amount,
            principal_portion,
            interest_portion,
            remaining_balance: balance,
            cumulative_interest,
        });
    }

    let total_interest = total_payment
        .checked_sub(principal)
        .ok_or_else(|| LoanEngineError::computation("total interest"))?;

    tracing::debug!(
        %principal,
        %payment,
        term_periods,
        %total_payment,
        %total_interest,
        "generated amortization schedule"
    );

    Ok(AmortizationResult {
        principal,
        periodic_payment: payment,
        periodic_rate,
        term_periods,
        frequency,
        total_payment,
        total_interest,
        schedule,
    })
}
