use chrono::NaiveDate;
use loan_engine_core::amortization::{self, LoanTerms};
use loan_engine_core::comparison::{
    compare_offers, compare_scenarios, delta, CheaperScenario, ComparisonResult,
    OfferComparisonInput, ScenarioDeltaInput,
};
use loan_engine_core::{LoanEngineError, PaymentFrequency};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

const MARKETPLACE_JSON: &str = r#"{
    "offers": [
        {
            "id": "bank-a",
            "provider_name": "First Bank",
            "loan_name": "Prime Personal",
            "interest_rate": "11.5",
            "fees": "250",
            "requirements": ["Credit score 700+", "Salary account"]
        },
        {
            "id": "union-b",
            "provider_name": "Harbor Credit Union",
            "loan_name": "Member Loan",
            "interest_rate": "9.75",
            "term_periods": 60
        },
        {
            "id": "online-c",
            "provider_name": "QuickLend",
            "loan_name": "Express",
            "interest_rate": "13.2"
        },
        {
            "id": "bank-d",
            "provider_name": "Second Bank",
            "loan_name": "Standard",
            "interest_rate": "9.75",
            "amount": "15000"
        }
    ],
    "shared_principal": "20000",
    "shared_term_periods": 36,
    "frequency": "monthly",
    "start_date": "2025-02-15"
}"#;

fn marketplace() -> OfferComparisonInput {
    serde_json::from_str(MARKETPLACE_JSON).unwrap()
}

fn count_flags(results: &[ComparisonResult], flag: fn(&ComparisonResult) -> bool) -> usize {
    results.iter().filter(|r| flag(r)).count()
}

fn loan(principal: Decimal, rate: Decimal, term_periods: u32) -> LoanTerms {
    LoanTerms {
        principal,
        annual_rate_percent: rate,
        term_periods: Some(term_periods),
        term_years: None,
        frequency: PaymentFrequency::Monthly,
        start_date: NaiveDate::from_ymd_opt(2025, 2, 15).unwrap(),
    }
}

// ===========================================================================
// Offer comparison
// ===========================================================================

#[test]
fn test_each_flag_set_exactly_once() {
    let out = compare_offers(&marketplace()).unwrap();
    let results = &out.result.results;
    assert_eq!(results.len(), 4);
    assert_eq!(count_flags(results, |r| r.is_best_rate), 1);
    assert_eq!(count_flags(results, |r| r.is_lowest_payment), 1);
    assert_eq!(count_flags(results, |r| r.is_lowest_total_cost), 1);
}

#[test]
fn test_flagged_offers_hold_minimum_values() {
    let out = compare_offers(&marketplace()).unwrap();
    let results = &out.result.results;

    let min_rate = results.iter().map(|r| r.interest_rate).min().unwrap();
    let min_payment = results
        .iter()
        .map(|r| r.amortization.periodic_payment)
        .min()
        .unwrap();
    let min_total = results
        .iter()
        .map(|r| r.amortization.total_payment)
        .min()
        .unwrap();

    for r in results {
        if r.is_best_rate {
            assert_eq!(r.interest_rate, min_rate);
        }
        if r.is_lowest_payment {
            assert_eq!(r.amortization.periodic_payment, min_payment);
        }
        if r.is_lowest_total_cost {
            assert_eq!(r.amortization.total_payment, min_total);
        }
    }
}

#[test]
fn test_marketplace_rankings() {
    let out = compare_offers(&marketplace()).unwrap().result;
    // union-b and bank-d tie on rate; union-b comes first
    assert_eq!(out.best_rate_offer_id, "union-b");
    // union-b spreads 20000 over 60 months
    assert_eq!(out.lowest_payment_offer_id, "union-b");
    // bank-d borrows the least over the shortest term
    assert_eq!(out.lowest_total_cost_offer_id, "bank-d");

    let ids: Vec<&str> = out.results.iter().map(|r| r.offer_id.as_str()).collect();
    assert_eq!(ids, vec!["bank-a", "union-b", "online-c", "bank-d"]);
}

#[test]
fn test_shared_parameters_fill_gaps() {
    let out = compare_offers(&marketplace()).unwrap().result;
    let bank_a = &out.results[0];
    assert_eq!(bank_a.amortization.principal, dec!(20000));
    assert_eq!(bank_a.amortization.term_periods, 36);
    assert_eq!(bank_a.fees, dec!(250));
    assert_eq!(
        bank_a.total_cost_with_fees,
        bank_a.amortization.total_payment + dec!(250)
    );
    assert_eq!(bank_a.requirements.len(), 2);

    let union_b = &out.results[1];
    assert_eq!(union_b.amortization.term_periods, 60);
    assert_eq!(union_b.fees, Decimal::ZERO);
}

#[test]
fn test_fees_raise_effective_rate() {
    let out = compare_offers(&marketplace()).unwrap().result;
    let with_fees = out.results[0].effective_annual_rate.unwrap();
    let no_fees = out.results[2].effective_annual_rate.unwrap();
    assert!(with_fees > dec!(11.5));
    assert!((no_fees - dec!(13.2)).abs() < dec!(0.01));
}

#[test]
fn test_different_amounts_warns() {
    let out = compare_offers(&marketplace()).unwrap();
    assert!(out
        .warnings
        .iter()
        .any(|w| w.contains("different loan amounts")));
}

#[test]
fn test_empty_offers_rejected() {
    let mut input = marketplace();
    input.offers.clear();
    let err = compare_offers(&input).unwrap_err();
    assert!(matches!(err, LoanEngineError::EmptyOfferSet));
}

#[test]
fn test_invalid_offer_rejects_whole_comparison() {
    let mut input = marketplace();
    input.offers[2].interest_rate = dec!(-1);
    match compare_offers(&input).unwrap_err() {
        LoanEngineError::InvalidRate { field, .. } => {
            assert_eq!(field, "offers[online-c].interest_rate")
        }
        other => panic!("Expected InvalidRate, got {:?}", other),
    }
}

#[test]
fn test_offer_over_term_ceiling_rejects_whole_comparison() {
    let mut input = marketplace();
    input.offers[1].term_periods = Some(601);
    match compare_offers(&input).unwrap_err() {
        LoanEngineError::InvalidTerm { field, .. } => {
            assert_eq!(field, "offers[union-b].term_periods")
        }
        other => panic!("Expected InvalidTerm, got {:?}", other),
    }
}

#[test]
fn test_offer_with_fractional_cents_rejected() {
    let mut input = marketplace();
    input.offers[3].amount = Some(dec!(15000.001));
    match compare_offers(&input).unwrap_err() {
        LoanEngineError::InvalidAmount { field, .. } => {
            assert_eq!(field, "offers[bank-d].amount")
        }
        other => panic!("Expected InvalidAmount, got {:?}", other),
    }
}

#[test]
fn test_near_total_fee_leaves_effective_rate_undetermined() {
    let mut input = marketplace();
    input.offers.truncate(1);
    input.offers[0].fees = Some(dec!(19999.99));
    let out = compare_offers(&input).unwrap();
    assert_eq!(out.result.results[0].effective_annual_rate, None);
    assert!(out
        .warnings
        .iter()
        .any(|w| w.contains("could not be determined")));
}

#[test]
fn test_missing_term_without_shared_term() {
    let mut input = marketplace();
    input.shared_term_periods = None;
    let err = compare_offers(&input).unwrap_err();
    assert!(matches!(err, LoanEngineError::InvalidTerm { .. }));
}

// ===========================================================================
// Scenario delta
// ===========================================================================

#[test]
fn test_delta_matches_totals() {
    let a = amortization::amortize(&loan(dec!(100000), dec!(12), 36))
        .unwrap()
        .result;
    let b = amortization::amortize(&loan(dec!(100000), dec!(9), 36))
        .unwrap()
        .result;
    let d = delta(&a, &b);
    assert_eq!(d.savings, a.total_payment - b.total_payment);
    assert_eq!(d.periodic_payment_difference, a.periodic_payment - b.periodic_payment);
    assert_eq!(d.interest_difference, a.total_interest - b.total_interest);
    assert_eq!(d.cheaper_scenario, CheaperScenario::B);
}

#[test]
fn test_delta_is_antisymmetric() {
    let a = amortization::amortize(&loan(dec!(80000), dec!(7), 48))
        .unwrap()
        .result;
    let b = amortization::amortize(&loan(dec!(80000), dec!(7.5), 36))
        .unwrap()
        .result;
    let ab = delta(&a, &b);
    let ba = delta(&b, &a);
    assert_eq!(ab.savings, -ba.savings);
    assert_eq!(ab.interest_difference, -ba.interest_difference);
    assert_ne!(ab.cheaper_scenario, ba.cheaper_scenario);
}

#[test]
fn test_scenario_delta_from_json() {
    let input: ScenarioDeltaInput = serde_json::from_str(
        r#"{
            "scenario_a": {"principal":"300000","annual_rate_percent":"7.25","term_years":"30","start_date":"2025-01-01"},
            "scenario_b": {"principal":"300000","annual_rate_percent":"6.125","term_years":"30","start_date":"2025-01-01"}
        }"#,
    )
    .unwrap();
    let out = compare_scenarios(&input).unwrap();
    assert_eq!(out.result.scenario_a.term_periods, 360);
    assert_eq!(out.result.delta.cheaper_scenario, CheaperScenario::B);
    assert!(out.result.delta.savings > dec!(50000));
}

#[test]
fn test_scenario_delta_propagates_errors() {
    let input = ScenarioDeltaInput {
        scenario_a: loan(dec!(50000), dec!(6), 60),
        scenario_b: loan(dec!(50000), dec!(6), 0),
    };
    let err = compare_scenarios(&input).unwrap_err();
    assert!(matches!(err, LoanEngineError::InvalidTerm { .. }));
}
