//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Concept, PayrollType, Worker};

/// Roster size from which workers are computed in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

fn default_worked_days() -> Decimal {
    Decimal::from(30)
}

fn default_parallel_threshold() -> usize {
    DEFAULT_PARALLEL_THRESHOLD
}

/// Values placed in every worker's context for inputs the engine does not
/// receive from outside.
///
/// These are a documented policy rather than computed facts: every worker
/// is assumed to have worked a full 30-day month with no overtime and no
/// absences unless configured otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDefaults {
    /// `WORKED_DAYS`.
    #[serde(default = "default_worked_days")]
    pub worked_days: Decimal,
    /// `OVERTIME_HOURS`.
    #[serde(default)]
    pub overtime_hours: Decimal,
    /// `ABSENCE_DAYS`.
    #[serde(default)]
    pub absence_days: Decimal,
    /// Additional named constants, e.g. `MINIMUM_WAGE`.
    #[serde(default)]
    pub extra: BTreeMap<String, Decimal>,
}

impl Default for ContextDefaults {
    fn default() -> Self {
        Self {
            worked_days: default_worked_days(),
            overtime_hours: Decimal::ZERO,
            absence_days: Decimal::ZERO,
            extra: BTreeMap::new(),
        }
    }
}

/// Engine policy loaded from `engine.yaml`.
///
/// # Example
///
/// ```
/// use payroll_engine::config::EngineConfig;
/// use payroll_engine::models::PayrollType;
/// use rust_decimal::Decimal;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.multiplier(PayrollType::SeveranceAccrual), Decimal::new(117, 2));
/// assert_eq!(config.defaults.worked_days, Decimal::from(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Basic salary multiplier per payroll type; missing types use the built-in value.
    #[serde(default)]
    pub payroll_types: BTreeMap<PayrollType, Decimal>,
    /// Context defaults.
    #[serde(default)]
    pub defaults: ContextDefaults,
    /// Roster size from which preview computation runs in parallel.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            payroll_types: BTreeMap::new(),
            defaults: ContextDefaults::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Returns the basic salary multiplier for a payroll type.
    pub fn multiplier(&self, payroll_type: PayrollType) -> Decimal {
        self.payroll_types
            .get(&payroll_type)
            .copied()
            .unwrap_or_else(|| payroll_type.default_multiplier())
    }
}

/// Concept catalog file structure (`concepts.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct ConceptsFile {
    /// All concepts, active or not.
    pub concepts: Vec<Concept>,
}

/// Roster file structure (`workers.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct WorkersFile {
    /// All workers, active or not.
    pub workers: Vec<Worker>,
}
