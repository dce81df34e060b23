//! Level-payment loan amortization.
//!
//! `payment` computes the fixed periodic payment, `schedule` expands it into
//! the full period-by-period breakdown, and `terms` holds the caller-facing
//! loan description and its validation rules.

pub mod payment;
pub mod schedule;
pub mod terms;

pub use payment::{compute_periodic_payment, periodic_rate};
pub use schedule::{amortize, build_amortization, generate_schedule, AmortizationResult, PaymentPeriod};
pub use terms::{LoanTerms, MAX_TERM_PERIODS};
