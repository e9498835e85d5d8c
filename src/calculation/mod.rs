//! Calculation logic for the payroll engine.
//!
//! This module contains the formula expression evaluator, the per-worker
//! variable context, concept evaluation by calculation rule, and the
//! three-phase preview calculator that turns a roster and a concept
//! catalog into a [`PayrollRun`](crate::models::PayrollRun).

mod concept;
mod context;
mod formula;
mod preview;

pub use concept::{evaluate_concept, try_evaluate_concept};
pub use context::{
    ABSENCE_DAYS, BASIC_SALARY, CONTRACT_FIXED_TERM, CONTRACT_INDEFINITE, CONTRACT_PART_TIME,
    DAYS_IN_PERIOD, DEPENDENTS, ORIGINAL_BASIC_SALARY, OVERTIME_HOURS, TENURE_MONTHS,
    TENURE_YEARS, TOTAL_EARNINGS, VariableContext, WORKED_DAYS,
};
pub use formula::{
    FormulaError, MAX_FORMULA_LENGTH, MAX_NESTING_DEPTH, evaluate, try_evaluate,
};
pub use preview::{ConceptPlan, PayrollCalculator};
