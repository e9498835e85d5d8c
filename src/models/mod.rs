//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod concept;
mod money;
mod payroll_run;
mod period;
mod worker;

pub use concept::{CalculationRule, Concept, ConceptStatus, ConceptType};
pub use money::{MONEY_SCALE, round_money};
pub use payroll_run::{
    ConceptApplication, PayrollRun, RunId, RunStatus, RunTotals, WorkerPayrollLine,
};
pub use period::{PayrollType, Period, PersonnelScope};
pub use worker::{ContractType, Worker, WorkerStatus};
