use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanEngineError {
    #[error("Invalid amount: {field} — {reason}")]
    InvalidAmount { field: String, reason: String },

    #[error("Invalid rate: {field} — {reason}")]
    InvalidRate { field: String, reason: String },

    #[error("Invalid term: {field} — {reason}")]
    InvalidTerm { field: String, reason: String },

    #[error("Unsupported payment frequency: '{0}' (expected weekly, biweekly, monthly or quarterly)")]
    UnsupportedFrequency(String),

    #[error("At least one loan offer is required for comparison")]
    EmptyOfferSet,

    #[error("Computation error: non-finite or overflowing value in {context}")]
    Computation { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanEngineError {
    pub(crate) fn computation(context: impl Into<String>) -> Self {
        LoanEngineError::Computation {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for LoanEngineError {
    fn from(e: serde_json::Error) -> Self {
        LoanEngineError::SerializationError(e.to_string())
    }
}
