use clap::Args;
use serde_json::Value;

use loan_engine_core::comparison::{
    compare_offers, compare_scenarios, OfferComparisonInput, ScenarioDeltaInput,
};

use crate::input;

/// Arguments for comparing loan offers
#[derive(Args)]
pub struct CompareOffersArgs {
    /// Path to JSON file with `offers` and optional shared principal/term
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the two-scenario delta
#[derive(Args)]
pub struct ScenarioDeltaArgs {
    /// Path to JSON file with `scenario_a` and `scenario_b` loan terms
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_compare_offers(args: CompareOffersArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: OfferComparisonInput = input::read_request(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for offer comparison")?;
    let result = compare_offers(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_scenario_delta(args: ScenarioDeltaArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: ScenarioDeltaInput = input::read_request(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for scenario delta")?;
    let result = compare_scenarios(&request)?;
    Ok(serde_json::to_value(result)?)
}
