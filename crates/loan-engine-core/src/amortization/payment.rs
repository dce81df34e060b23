use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::terms::validate_loan_parameters;
use crate::error::LoanEngineError;
use crate::frequency::PaymentFrequency;
use crate::time_value;
use crate::types::{round_money, Money, Rate};
use crate::LoanEngineResult;

/// Interest rate applied once per payment period.
pub fn periodic_rate(annual_rate_percent: Decimal, frequency: PaymentFrequency) -> Rate {
    annual_rate_percent / dec!(100) / Decimal::from(frequency.periods_per_year())
}

/// Fixed periodic payment for a fully amortizing loan, rounded half-up to
/// cents.
///
/// A zero rate is special-cased to `principal / term_periods`; otherwise the
/// annuity formula `P·r·(1+r)^n / ((1+r)^n − 1)` is evaluated at full
/// precision and rounded once at the end.
pub fn compute_periodic_payment(
    principal: Money,
    annual_rate_percent: Decimal,
    frequency: PaymentFrequency,
    term_periods: u32,
) -> LoanEngineResult<Money> {
    validate_loan_parameters(principal, annual_rate_percent, term_periods)?;

    let rate = periodic_rate(annual_rate_percent, frequency);
    let payment = round_money(time_value::pmt(rate, term_periods, principal)?);

    if payment <= Decimal::ZERO {
        return Err(LoanEngineError::InvalidAmount {
            field: "principal".into(),
            reason: format!(
                "Principal {principal} over {term_periods} periods gives a payment below one minor unit"
            ),
        });
    }

    tracing::debug!(
        %principal,
        %annual_rate_percent,
        %frequency,
        term_periods,
        %payment,
        "computed periodic payment"
    );

    Ok(payment)
}
