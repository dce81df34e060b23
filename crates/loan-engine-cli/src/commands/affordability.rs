use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_engine_core::affordability::{
    assess_affordability, calculate_max_principal, AffordabilityInput, MaxPrincipalInput,
    DEFAULT_DTI_THRESHOLD,
};
use loan_engine_core::PaymentFrequency;

use crate::input;

/// Arguments for an affordability check
#[derive(Args)]
pub struct AffordabilityArgs {
    /// Path to JSON AffordabilityInput file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Periodic loan payment
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Frequency of --payment
    #[arg(long, default_value = "monthly")]
    pub frequency: PaymentFrequency,

    /// Applicant's gross monthly income; leave out when unknown
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Maximum share of income the payment may take (0.4 = 40%)
    #[arg(long, default_value_t = DEFAULT_DTI_THRESHOLD)]
    pub threshold: Decimal,
}

/// Arguments for sizing the largest affordable loan
#[derive(Args)]
pub struct MaxPrincipalArgs {
    /// Path to JSON MaxPrincipalInput file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Applicant's gross monthly income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Maximum share of income the payment may take (0.4 = 40%)
    #[arg(long, default_value_t = DEFAULT_DTI_THRESHOLD)]
    pub threshold: Decimal,

    /// Nominal annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Payment frequency
    #[arg(long, default_value = "monthly")]
    pub frequency: PaymentFrequency,

    /// Number of payments
    #[arg(long)]
    pub term_periods: Option<u32>,
}

pub fn run_affordability(args: AffordabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = match input::read_request::<AffordabilityInput>(args.input.as_deref())? {
        Some(mut request) => {
            // --income fills in an income the request file left out
            if request.monthly_income.is_none() {
                request.monthly_income = args.income;
            }
            request
        }
        None => AffordabilityInput {
            loan: None,
            payment: Some(
                args.payment
                    .ok_or("--payment is required (or provide --input)")?,
            ),
            payment_frequency: args.frequency,
            monthly_income: args.income,
            debt_to_income_threshold: args.threshold,
        },
    };

    let result = assess_affordability(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_max_principal(args: MaxPrincipalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = match input::read_request::<MaxPrincipalInput>(args.input.as_deref())? {
        Some(request) => request,
        None => MaxPrincipalInput {
            monthly_income: args
                .income
                .ok_or("--income is required (or provide --input)")?,
            debt_to_income_threshold: args.threshold,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            frequency: args.frequency,
            term_periods: args
                .term_periods
                .ok_or("--term-periods is required (or provide --input)")?,
        },
    };

    let result = calculate_max_principal(&request)?;
    Ok(serde_json::to_value(result)?)
}
