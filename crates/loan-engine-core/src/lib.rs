pub mod error;
pub mod frequency;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "comparison")]
pub mod comparison;

#[cfg(feature = "affordability")]
pub mod affordability;

pub use error::LoanEngineError;
pub use frequency::PaymentFrequency;
pub use types::*;

/// Standard result type for all loan-engine operations
pub type LoanEngineResult<T> = Result<T, LoanEngineError>;
