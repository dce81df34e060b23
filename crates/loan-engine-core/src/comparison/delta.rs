use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;

use crate::amortization::{build_amortization, AmortizationResult, LoanTerms};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::LoanEngineResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which of two scenarios costs less in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheaperScenario {
    A,
    B,
    Equal,
}

/// Cost of switching from scenario A to scenario B.
///
/// Every field is `A - B`: positive means B is cheaper by that amount,
/// negative means B costs more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonDelta {
    pub savings: Money,
    pub periodic_payment_difference: Money,
    pub interest_difference: Money,
    pub cheaper_scenario: CheaperScenario,
}

/// Two loan scenarios to amortize and compare.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDeltaInput {
    pub scenario_a: LoanTerms,
    pub scenario_b: LoanTerms,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDeltaOutput {
    pub scenario_a: AmortizationResult,
    pub scenario_b: AmortizationResult,
    pub delta: ComparisonDelta,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Savings from switching from `a` to `b`.
pub fn delta(a: &AmortizationResult, b: &AmortizationResult) -> ComparisonDelta {
    let savings = a.total_payment - b.total_payment;
    let cheaper_scenario = match savings.cmp(&Decimal::ZERO) {
        Ordering::Greater => CheaperScenario::B,
        Ordering::Less => CheaperScenario::A,
        Ordering::Equal => CheaperScenario::Equal,
    };

    ComparisonDelta {
        savings,
        periodic_payment_difference: a.periodic_payment - b.periodic_payment,
        interest_difference: a.total_interest - b.total_interest,
        cheaper_scenario,
    }
}

/// Amortize two scenarios and report the delta between them.
pub fn compare_scenarios(
    input: &ScenarioDeltaInput,
) -> LoanEngineResult<ComputationOutput<ScenarioDeltaOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let scenario_a = amortize_terms(&input.scenario_a)?;
    let scenario_b = amortize_terms(&input.scenario_b)?;
    let scenario_delta = delta(&scenario_a, &scenario_b);

    if scenario_a.principal != scenario_b.principal {
        warnings.push(format!(
            "Scenarios borrow different principals ({} vs {})",
            scenario_a.principal, scenario_b.principal
        ));
    }
    if scenario_delta.cheaper_scenario == CheaperScenario::B
        && scenario_delta.periodic_payment_difference < Decimal::ZERO
    {
        warnings.push("Scenario B is cheaper overall but has a higher periodic payment".into());
    }

    tracing::debug!(savings = %scenario_delta.savings, "computed scenario delta");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Scenario delta — savings = total(A) - total(B)",
        &serde_json::json!({
            "scenario_a_principal": input.scenario_a.principal.to_string(),
            "scenario_b_principal": input.scenario_b.principal.to_string(),
        }),
        warnings,
        elapsed,
        ScenarioDeltaOutput {
            scenario_a,
            scenario_b,
            delta: scenario_delta,
        },
    ))
}

fn amortize_terms(terms: &LoanTerms) -> LoanEngineResult<AmortizationResult> {
    build_amortization(
        terms.principal,
        terms.annual_rate_percent,
        terms.frequency,
        terms.resolve_term_periods()?,
        terms.start_date,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::PaymentFrequency;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn result_with(total_payment: Money, periodic_payment: Money) -> AmortizationResult {
        AmortizationResult {
            principal: dec!(100000),
            periodic_payment,
            periodic_rate: dec!(0.01),
            term_periods: 36,
            frequency: PaymentFrequency::Monthly,
            total_payment,
            total_interest: total_payment - dec!(100000),
            schedule: Vec::new(),
        }
    }

    fn terms(rate: Decimal, periods: u32) -> LoanTerms {
        LoanTerms {
            principal: dec!(50000),
            annual_rate_percent: rate,
            term_periods: Some(periods),
            term_years: None,
            frequency: PaymentFrequency::Monthly,
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        }
    }

    #[test]
    fn test_positive_savings_means_b_cheaper() {
        let a = result_with(dec!(120000), dec!(3333.33));
        let b = result_with(dec!(110000), dec!(3055.56));
        let d = delta(&a, &b);
        assert_eq!(d.savings, dec!(10000));
        assert_eq!(d.periodic_payment_difference, dec!(277.77));
        assert_eq!(d.interest_difference, dec!(10000));
        assert_eq!(d.cheaper_scenario, CheaperScenario::B);
    }

    #[test]
    fn test_negative_savings_means_b_costs_more() {
        let a = result_with(dec!(110000), dec!(3055.56));
        let b = result_with(dec!(120000), dec!(3333.33));
        let d = delta(&a, &b);
        assert_eq!(d.savings, dec!(-10000));
        assert_eq!(d.cheaper_scenario, CheaperScenario::A);
    }

    #[test]
    fn test_equal_scenarios() {
        let a = result_with(dec!(110000), dec!(3055.56));
        let d = delta(&a, &a.clone());
        assert!(d.savings.is_zero());
        assert_eq!(d.cheaper_scenario, CheaperScenario::Equal);
    }

    #[test]
    fn test_refinance_to_lower_rate() {
        let input = ScenarioDeltaInput {
            scenario_a: terms(dec!(9), 60),
            scenario_b: terms(dec!(6), 60),
        };
        let out = compare_scenarios(&input).unwrap();
        let d = &out.result.delta;
        assert!(d.savings > Decimal::ZERO);
        assert!(d.periodic_payment_difference > Decimal::ZERO);
        assert_eq!(
            d.savings,
            out.result.scenario_a.total_payment - out.result.scenario_b.total_payment
        );
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_shorter_term_warns_about_higher_payment() {
        let input = ScenarioDeltaInput {
            scenario_a: terms(dec!(6), 60),
            scenario_b: terms(dec!(6), 24),
        };
        let out = compare_scenarios(&input).unwrap();
        assert_eq!(out.result.delta.cheaper_scenario, CheaperScenario::B);
        assert!(out.warnings.iter().any(|w| w.contains("higher periodic payment")));
    }
}
