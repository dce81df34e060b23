use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LoanEngineError;
use crate::types::{Money, Rate};
use crate::LoanEngineResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;

/// (1 + rate)^nper with overflow reported instead of panicking.
pub fn compound_factor(rate: Rate, nper: u32) -> LoanEngineResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powu(u64::from(nper))
        .ok_or_else(|| LoanEngineError::computation(format!("compound factor (1 + {rate})^{nper}")))
}

/// Level payment that repays `present_value` over `nper` periods at `rate`.
///
/// Positive in, positive out. Unrounded; callers round at their boundary.
pub fn pmt(rate: Rate, nper: u32, present_value: Money) -> LoanEngineResult<Money> {
    if nper == 0 {
        return Err(LoanEngineError::InvalidTerm {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(present_value / Decimal::from(nper));
    }

    let factor = compound_factor(rate, nper)?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(LoanEngineError::computation("PMT annuity denominator"));
    }

    present_value
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| LoanEngineError::computation("PMT annuity formula"))
}

/// Present value of `nper` level payments of `payment` at `rate`.
pub fn pv(rate: Rate, nper: u32, payment: Money) -> LoanEngineResult<Money> {
    if rate.is_zero() {
        return payment
            .checked_mul(Decimal::from(nper))
            .ok_or_else(|| LoanEngineError::computation("PV of zero-rate payments"));
    }

    let factor = compound_factor(rate, nper)?;
    Decimal::ONE
        .checked_div(factor)
        .map(|discount| Decimal::ONE - discount)
        .and_then(|v| v.checked_div(rate))
        .and_then(|annuity_factor| payment.checked_mul(annuity_factor))
        .ok_or_else(|| LoanEngineError::computation("PV annuity factor"))
}

/// Per-period Internal Rate of Return using Newton-Raphson
pub fn irr(cash_flows: &[Money], guess: Rate) -> LoanEngineResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(LoanEngineError::computation(
            "IRR requires at least 2 cash flows",
        ));
    }

    let mut rate = guess;
    let overflow = || LoanEngineError::computation("IRR discounting");

    for _ in 0..MAX_IRR_ITERATIONS {
        let one_plus_r = Decimal::ONE + rate;
        let mut npv_val = Decimal::ZERO;
        let mut dnpv = Decimal::ZERO;
        let mut discount = Decimal::ONE;

        for (t, cf) in cash_flows.iter().enumerate() {
            if t > 0 {
                discount = discount.checked_mul(one_plus_r).ok_or_else(overflow)?;
                let slope = Decimal::from(t as u64)
                    .checked_mul(*cf)
                    .and_then(|v| v.checked_div(discount.checked_mul(one_plus_r)?))
                    .ok_or_else(overflow)?;
                dnpv = dnpv.checked_sub(slope).ok_or_else(overflow)?;
            }
            // checked_div also catches a discount that underflowed to zero
            let present = cf.checked_div(discount).ok_or_else(overflow)?;
            npv_val = npv_val.checked_add(present).ok_or_else(overflow)?;
        }

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        if dnpv.is_zero() {
            break;
        }

        rate = npv_val
            .checked_div(dnpv)
            .and_then(|step| rate.checked_sub(step))
            .ok_or_else(overflow)?;

        // Guard against divergence
        if rate < dec!(-0.99) {
            rate = dec!(-0.99);
        } else if rate > dec!(10.0) {
            rate = dec!(10.0);
        }
    }

    Err(LoanEngineError::computation(format!(
        "IRR did not converge after {MAX_IRR_ITERATIONS} iterations"
    )))
}
