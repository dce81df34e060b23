pub mod evaluator;

pub use evaluator::{
    assess_affordability, calculate_max_principal, evaluate, max_affordable_principal,
    monthly_equivalent, AffordabilityAssessment, AffordabilityInput, MaxPrincipalInput,
    MaxPrincipalOutput, DEFAULT_DTI_THRESHOLD,
};
