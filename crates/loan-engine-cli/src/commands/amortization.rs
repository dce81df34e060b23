use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loan_engine_core::amortization::{self, compute_periodic_payment, periodic_rate, LoanTerms};
use loan_engine_core::PaymentFrequency;

use crate::input;

/// Loan terms given as flags, a JSON file or piped stdin
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON LoanTerms file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual interest rate in percent (12 = 12%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Number of payments
    #[arg(long, conflicts_with = "term_years")]
    pub term_periods: Option<u32>,

    /// Term in years, converted using the payment frequency
    #[arg(long)]
    pub term_years: Option<Decimal>,

    /// Payment frequency: weekly, biweekly, monthly or quarterly
    #[arg(long, default_value = "monthly")]
    pub frequency: PaymentFrequency,

    /// First due date is one period after this date (defaults to today)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

/// Arguments for the periodic payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

/// Arguments for the full amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = loan_terms(&args.loan)?;
    let term_periods = terms.resolve_term_periods()?;
    let payment = compute_periodic_payment(
        terms.principal,
        terms.annual_rate_percent,
        terms.frequency,
        term_periods,
    )?;

    Ok(json!({
        "periodic_payment": payment.to_string(),
        "periodic_rate": periodic_rate(terms.annual_rate_percent, terms.frequency).to_string(),
        "principal": terms.principal.to_string(),
        "term_periods": term_periods,
        "frequency": terms.frequency,
    }))
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = loan_terms(&args.loan)?;
    let result = amortization::amortize(&terms)?;
    Ok(serde_json::to_value(result)?)
}

/// Load `LoanTerms` from `--input`/stdin, falling back to individual flags.
fn loan_terms(args: &LoanArgs) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    if let Some(terms) = input::read_request::<LoanTerms>(args.input.as_deref())? {
        return Ok(terms);
    }

    if args.term_periods.is_none() && args.term_years.is_none() {
        return Err("--term-periods or --term-years is required (or provide --input)".into());
    }

    Ok(LoanTerms {
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
        term_periods: args.term_periods,
        term_years: args.term_years,
        frequency: args.frequency,
        start_date: args
            .start_date
            .unwrap_or_else(|| Local::now().date_naive()),
    })
}
