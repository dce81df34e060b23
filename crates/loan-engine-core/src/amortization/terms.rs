use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanEngineError;
use crate::frequency::PaymentFrequency;
use crate::types::{round_money, Money};
use crate::LoanEngineResult;

/// Upper bound on the number of payment periods in one schedule.
pub const MAX_TERM_PERIODS: u32 = 600;

/// Raw loan terms as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed, in whole minor units.
    pub principal: Money,
    /// Nominal annual rate as a percentage (12 = 12%).
    pub annual_rate_percent: Decimal,
    /// Number of payments. Takes precedence over `term_years`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_periods: Option<u32>,
    /// Term in years, converted to periods using the frequency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_years: Option<Decimal>,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    /// Date the loan starts; the first payment falls one period later.
    pub start_date: NaiveDate,
}

impl LoanTerms {
    /// Resolve the number of payment periods from `term_periods` or
    /// `term_years`.
    pub fn resolve_term_periods(&self) -> LoanEngineResult<u32> {
        if let Some(periods) = self.term_periods {
            validate_term_periods(periods)?;
            return Ok(periods);
        }

        let years = self.term_years.ok_or_else(|| LoanEngineError::InvalidTerm {
            field: "term_periods".into(),
            reason: "Either term_periods or term_years must be provided".into(),
        })?;
        if years <= Decimal::ZERO {
            return Err(LoanEngineError::InvalidTerm {
                field: "term_years".into(),
                reason: "Term in years must be positive".into(),
            });
        }

        let periods = years * Decimal::from(self.frequency.periods_per_year());
        if !periods.fract().is_zero() {
            return Err(LoanEngineError::InvalidTerm {
                field: "term_years".into(),
                reason: format!(
                    "{years} years is not a whole number of {} periods ({periods})",
                    self.frequency
                ),
            });
        }

        let periods = periods.to_u32().ok_or_else(|| LoanEngineError::InvalidTerm {
            field: "term_years".into(),
            reason: format!("Term must not exceed {MAX_TERM_PERIODS} periods"),
        })?;
        validate_term_periods(periods)?;
        Ok(periods)
    }
}

/// Validate principal, annual rate and term before any arithmetic runs.
pub fn validate_loan_parameters(
    principal: Money,
    annual_rate_percent: Decimal,
    term_periods: u32,
) -> LoanEngineResult<()> {
    validate_principal(principal)?;
    validate_term_periods(term_periods)?;
    if annual_rate_percent < Decimal::ZERO {
        return Err(LoanEngineError::InvalidRate {
            field: "annual_rate_percent".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }
    Ok(())
}

pub(crate) fn validate_principal(principal: Money) -> LoanEngineResult<()> {
    if principal <= Decimal::ZERO {
        return Err(LoanEngineError::InvalidAmount {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if round_money(principal) != principal {
        return Err(LoanEngineError::InvalidAmount {
            field: "principal".into(),
            reason: "Principal must be expressed in whole minor currency units".into(),
        });
    }
    Ok(())
}

pub(crate) fn validate_term_periods(term_periods: u32) -> LoanEngineResult<()> {
    if term_periods == 0 {
        return Err(LoanEngineError::InvalidTerm {
            field: "term_periods".into(),
            reason: "Term must be at least 1 period".into(),
        });
    }
    if term_periods > MAX_TERM_PERIODS {
        return Err(LoanEngineError::InvalidTerm {
            field: "term_periods".into(),
            reason: format!("Term of {term_periods} periods exceeds the {MAX_TERM_PERIODS} period limit"),
        });
    }
    Ok(())
}
