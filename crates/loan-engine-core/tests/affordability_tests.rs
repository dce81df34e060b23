use chrono::NaiveDate;
use loan_engine_core::affordability::{
    assess_affordability, calculate_max_principal, evaluate, max_affordable_principal,
    AffordabilityInput, MaxPrincipalInput, DEFAULT_DTI_THRESHOLD,
};
use loan_engine_core::amortization::{compute_periodic_payment, LoanTerms};
use loan_engine_core::{LoanEngineError, PaymentFrequency};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Helpers
// ===========================================================================

fn reference_loan() -> LoanTerms {
    LoanTerms {
        principal: dec!(100000),
        annual_rate_percent: dec!(12),
        term_periods: Some(36),
        term_years: None,
        frequency: PaymentFrequency::Monthly,
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    }
}

// ===========================================================================
// Evaluation
// ===========================================================================

#[test]
fn test_reference_payment_against_income() {
    let a = evaluate(dec!(3321.43), Some(dec!(5000)), DEFAULT_DTI_THRESHOLD).unwrap();
    assert_eq!(a.required_monthly_income, dec!(8303.58));
    assert_eq!(a.is_affordable, Some(false));
}

#[test]
fn test_affordable_iff_income_covers_requirement() {
    let payment = dec!(1250);
    for income in [dec!(0), dec!(3000), dec!(3124.99), dec!(3125), dec!(3125.01), dec!(10000)] {
        let a = evaluate(payment, Some(income), DEFAULT_DTI_THRESHOLD).unwrap();
        assert_eq!(a.required_monthly_income, dec!(3125));
        assert_eq!(a.is_affordable, Some(income >= dec!(3125)), "income {income}");
    }
}

#[test]
fn test_unknown_income_never_unaffordable() {
    for payment in [dec!(1), dec!(500), dec!(1000000)] {
        let a = evaluate(payment, None, DEFAULT_DTI_THRESHOLD).unwrap();
        assert_eq!(a.is_affordable, None);
        assert_eq!(a.max_affordable_payment, None);
    }
}

#[test]
fn test_stricter_threshold_raises_required_income() {
    let relaxed = evaluate(dec!(900), None, dec!(0.5)).unwrap();
    let strict = evaluate(dec!(900), None, dec!(0.3)).unwrap();
    assert_eq!(relaxed.required_monthly_income, dec!(1800));
    assert_eq!(strict.required_monthly_income, dec!(3000));
}

#[test]
fn test_income_a_fraction_of_a_cent_short_is_unaffordable() {
    let short = evaluate(dec!(100.01), Some(dec!(142.87)), dec!(0.7)).unwrap();
    assert_eq!(short.required_monthly_income, dec!(142.87));
    assert_eq!(short.is_affordable, Some(false));
}

#[test]
fn test_extreme_threshold_is_computation_error() {
    let err = evaluate(dec!(1000), None, dec!(0.0000000000000000000000000001)).unwrap_err();
    assert!(matches!(err, LoanEngineError::Computation { .. }));
}

// ===========================================================================
// Envelope
// ===========================================================================

#[test]
fn test_loan_assessment_warns_when_over_threshold() {
    let input = AffordabilityInput {
        loan: Some(reference_loan()),
        payment: None,
        payment_frequency: PaymentFrequency::Monthly,
        monthly_income: Some(dec!(5000)),
        debt_to_income_threshold: DEFAULT_DTI_THRESHOLD,
    };
    let out = assess_affordability(&input).unwrap();
    assert_eq!(out.result.is_affordable, Some(false));
    assert_eq!(out.warnings.len(), 1);
    assert!(out.warnings[0].contains("exceeds 40% of monthly income"));
}

#[test]
fn test_weekly_payment_converted_to_monthly() {
    let input: AffordabilityInput = serde_json::from_str(
        r#"{"payment":"300","payment_frequency":"weekly","monthly_income":"4000"}"#,
    )
    .unwrap();
    let out = assess_affordability(&input).unwrap().result;
    assert_eq!(out.monthly_payment, dec!(1300));
    assert_eq!(out.required_monthly_income, dec!(3250));
    assert_eq!(out.is_affordable, Some(true));
}

#[test]
fn test_missing_loan_and_payment_rejected() {
    let input: AffordabilityInput = serde_json::from_str(r#"{"monthly_income":"4000"}"#).unwrap();
    let err = assess_affordability(&input).unwrap_err();
    assert!(matches!(err, LoanEngineError::InvalidAmount { .. }));
}

// ===========================================================================
// Maximum principal
// ===========================================================================

#[test]
fn test_max_principal_payment_is_within_budget() {
    let out = max_affordable_principal(
        dec!(5000),
        DEFAULT_DTI_THRESHOLD,
        dec!(12),
        PaymentFrequency::Monthly,
        36,
    )
    .unwrap();
    assert_eq!(out.max_monthly_payment, dec!(2000));
    let payment =
        compute_periodic_payment(out.max_principal, dec!(12), PaymentFrequency::Monthly, 36)
            .unwrap();
    assert!(payment <= dec!(2000));

    let affordability = evaluate(payment, Some(dec!(5000)), DEFAULT_DTI_THRESHOLD).unwrap();
    assert_eq!(affordability.is_affordable, Some(true));
}

#[test]
fn test_max_principal_envelope_from_json() {
    let input: MaxPrincipalInput = serde_json::from_str(
        r#"{"monthly_income":"6500","annual_rate_percent":"0","frequency":"quarterly","term_periods":8}"#,
    )
    .unwrap();
    let out = calculate_max_principal(&input).unwrap();
    assert_eq!(out.result.max_monthly_payment, dec!(2600));
    assert_eq!(out.result.max_periodic_payment, dec!(7800));
    assert_eq!(out.result.max_principal, dec!(62400));
}

#[test]
fn test_max_principal_rejects_zero_income() {
    let err = max_affordable_principal(
        Decimal::ZERO,
        DEFAULT_DTI_THRESHOLD,
        dec!(5),
        PaymentFrequency::Monthly,
        12,
    )
    .unwrap_err();
    assert!(matches!(err, LoanEngineError::InvalidAmount { .. }));
}
