//! Payment frequencies and due-date stepping.
//!
//! Maps a frequency selector to its number of periods per year and advances
//! calendar dates by whole payment periods. Weekly and biweekly steps are
//! fixed day counts; monthly and quarterly steps are calendar months, keeping
//! the day-of-month where the target month has it and clamping to the last
//! day of the month otherwise.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LoanEngineError;
use crate::LoanEngineResult;

/// How often a loan payment falls due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PaymentFrequency {
    Weekly,
    Biweekly,
    #[default]
    Monthly,
    Quarterly,
}

impl PaymentFrequency {
    /// Number of payment periods in one year.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Weekly => 52,
            PaymentFrequency::Biweekly => 26,
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Quarterly => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentFrequency::Weekly => "weekly",
            PaymentFrequency::Biweekly => "biweekly",
            PaymentFrequency::Monthly => "monthly",
            PaymentFrequency::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentFrequency {
    type Err = LoanEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(PaymentFrequency::Weekly),
            "biweekly" => Ok(PaymentFrequency::Biweekly),
            "monthly" => Ok(PaymentFrequency::Monthly),
            "quarterly" => Ok(PaymentFrequency::Quarterly),
            _ => Err(LoanEngineError::UnsupportedFrequency(s.to_string())),
        }
    }
}

impl TryFrom<String> for PaymentFrequency {
    type Error = LoanEngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Periods per year for a raw frequency selector such as `"monthly"`.
pub fn periods_per_year(selector: &str) -> LoanEngineResult<u32> {
    Ok(selector.parse::<PaymentFrequency>()?.periods_per_year())
}

/// Next due date one period after `date`.
pub fn advance(date: NaiveDate, frequency: PaymentFrequency) -> LoanEngineResult<NaiveDate> {
    advance_by(date, frequency, 1)
}

/// Due date `periods` whole periods after `date`.
///
/// Always measured from the anchor date, so a month-end clamp in February
/// does not pull every later due date back to the 28th.
pub fn advance_by(
    date: NaiveDate,
    frequency: PaymentFrequency,
    periods: u32,
) -> LoanEngineResult<NaiveDate> {
    let stepped = match frequency {
        PaymentFrequency::Weekly => date.checked_add_days(Days::new(7 * u64::from(periods))),
        PaymentFrequency::Biweekly => date.checked_add_days(Days::new(14 * u64::from(periods))),
        PaymentFrequency::Monthly => date.checked_add_months(Months::new(periods)),
        PaymentFrequency::Quarterly => periods
            .checked_mul(3)
            .and_then(|months| date.checked_add_months(Months::new(months))),
    };

    stepped.ok_or_else(|| {
        LoanEngineError::DateError(format!(
            "{date} advanced by {periods} {frequency} period(s) is out of range"
        ))
    })
}
