//! Comparing loans: ranking competing offers and measuring the cost of
//! switching between two computed scenarios.

pub mod delta;
pub mod offers;

pub use delta::{
    compare_scenarios, delta, CheaperScenario, ComparisonDelta, ScenarioDeltaInput,
    ScenarioDeltaOutput,
};
pub use offers::{
    compare, compare_offers, ComparisonResult, LoanOffer, OfferComparisonInput,
    OfferComparisonOutput,
};
