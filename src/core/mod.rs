mod engine;
mod rules;
mod sweep;
mod types;

pub use engine::{
    aggregate_expenses, derive_staffing, evaluate, facility_budget, lease_term_years,
    margin_tier, run_model,
};
pub use rules::{MarginRule, RuleTables, rule_tables};
pub use sweep::run_enrollment_sweep;
pub use types::{
    DEFAULT_TUITION_LEVELS, Expenses, FacilityBudget, Inputs, MarginTier, ModelRecord,
    ModelResult, Staffing, SweepPoint, SweepResult, Tier, ViableEnrollment,
};
