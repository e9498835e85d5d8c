//! Per-worker variable context.
//!
//! A [`VariableContext`] holds the named values concept rules and formulas
//! can read for one worker within one run. Contexts are immutable: the
//! calculator builds one for the earnings phase and derives a second one,
//! carrying `TOTAL_EARNINGS`, for the deduction and contribution phases.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::ContextDefaults;
use crate::models::{ContractType, Period, Worker};

/// Basic salary after the payroll-type multiplier.
pub const BASIC_SALARY: &str = "BASIC_SALARY";
/// Basic salary as supplied by the roster.
pub const ORIGINAL_BASIC_SALARY: &str = "ORIGINAL_BASIC_SALARY";
/// Sum of the earnings phase; only present after that phase.
pub const TOTAL_EARNINGS: &str = "TOTAL_EARNINGS";
/// Days worked in the period.
pub const WORKED_DAYS: &str = "WORKED_DAYS";
/// Overtime hours in the period.
pub const OVERTIME_HOURS: &str = "OVERTIME_HOURS";
/// Days absent in the period.
pub const ABSENCE_DAYS: &str = "ABSENCE_DAYS";
/// Calendar days in the period.
pub const DAYS_IN_PERIOD: &str = "DAYS_IN_PERIOD";
/// Whole years of service at the end of the period.
pub const TENURE_YEARS: &str = "TENURE_YEARS";
/// Whole months of service at the end of the period.
pub const TENURE_MONTHS: &str = "TENURE_MONTHS";
/// Declared dependents.
pub const DEPENDENTS: &str = "DEPENDENTS";
/// 1 for an indefinite contract, else 0.
pub const CONTRACT_INDEFINITE: &str = "CONTRACT_INDEFINITE";
/// 1 for a fixed-term contract, else 0.
pub const CONTRACT_FIXED_TERM: &str = "CONTRACT_FIXED_TERM";
/// 1 for a part-time contract, else 0.
pub const CONTRACT_PART_TIME: &str = "CONTRACT_PART_TIME";

/// Named decimal values visible to concept evaluation.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{TOTAL_EARNINGS, VariableContext};
/// use rust_decimal::Decimal;
///
/// let earnings_phase = VariableContext::from_pairs([("BASIC_SALARY", Decimal::from(2000))]);
/// let deductions_phase = earnings_phase.with_total_earnings(Decimal::from(2500));
///
/// assert_eq!(earnings_phase.get(TOTAL_EARNINGS), None);
/// assert_eq!(deductions_phase.get(TOTAL_EARNINGS), Some(Decimal::from(2500)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableContext {
    values: BTreeMap<String, Decimal>,
}

impl VariableContext {
    /// Builds a context from name/value pairs.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Decimal)>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Builds the earnings-phase context for one worker.
    ///
    /// `basic_salary` is the already-scaled salary. Inputs the engine does
    /// not receive from outside (worked days, overtime, absences) come from
    /// `defaults`; extra defaults never override worker attributes.
    pub fn for_worker(
        worker: &Worker,
        basic_salary: Decimal,
        period: Period,
        defaults: &ContextDefaults,
    ) -> Self {
        let as_of = period.last_day();
        let flag = |on: bool| if on { Decimal::ONE } else { Decimal::ZERO };

        let mut values: BTreeMap<String, Decimal> = defaults
            .extra
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect();

        let attributes = [
            (BASIC_SALARY, basic_salary),
            (ORIGINAL_BASIC_SALARY, worker.basic_salary),
            (WORKED_DAYS, defaults.worked_days),
            (OVERTIME_HOURS, defaults.overtime_hours),
            (ABSENCE_DAYS, defaults.absence_days),
            (DAYS_IN_PERIOD, Decimal::from(period.days())),
            (TENURE_YEARS, Decimal::from(worker.tenure_years(as_of))),
            (TENURE_MONTHS, Decimal::from(worker.tenure_months(as_of))),
            (DEPENDENTS, Decimal::from(worker.dependents)),
            (
                CONTRACT_INDEFINITE,
                flag(worker.contract_type == ContractType::Indefinite),
            ),
            (
                CONTRACT_FIXED_TERM,
                flag(worker.contract_type == ContractType::FixedTerm),
            ),
            (
                CONTRACT_PART_TIME,
                flag(worker.contract_type == ContractType::PartTime),
            ),
        ];
        for (name, value) in attributes {
            values.insert(name.to_string(), value);
        }
        // Set only after the earnings phase.
        values.remove(TOTAL_EARNINGS);

        Self { values }
    }

    /// Returns a new context with `TOTAL_EARNINGS` set; `self` is unchanged.
    pub fn with_total_earnings(&self, total_earnings: Decimal) -> Self {
        self.with(TOTAL_EARNINGS, total_earnings)
    }

    /// Returns a new context with one value added or replaced.
    pub fn with(&self, name: impl Into<String>, value: Decimal) -> Self {
        let mut values = self.values.clone();
        values.insert(name.into(), value);
        Self { values }
    }

    /// Looks up a value by exact name.
    pub fn get(&self, name: &str) -> Option<Decimal> {
        self.values.get(name).copied()
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the context holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkerStatus;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn create_worker(contract_type: ContractType) -> Worker {
        Worker {
            id: "w_001".to_string(),
            document_number: "40112233".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Quispe".to_string(),
            basic_salary: Decimal::from(2000),
            hire_date: NaiveDate::from_ymd_opt(2019, 2, 10).unwrap(),
            contract_type,
            personnel_group: "office".to_string(),
            dependents: 2,
            status: WorkerStatus::Active,
        }
    }

    #[test]
    fn test_for_worker_populates_attributes_and_defaults() {
        let worker = create_worker(ContractType::FixedTerm);
        let period = Period::new(2025, 3).unwrap();
        let ctx = VariableContext::for_worker(
            &worker,
            Decimal::new(234000, 2),
            period,
            &ContextDefaults::default(),
        );

        assert_eq!(ctx.get(BASIC_SALARY), Some(Decimal::new(234000, 2)));
        assert_eq!(ctx.get(ORIGINAL_BASIC_SALARY), Some(Decimal::from(2000)));
        assert_eq!(ctx.get(WORKED_DAYS), Some(Decimal::from(30)));
        assert_eq!(ctx.get(OVERTIME_HOURS), Some(Decimal::ZERO));
        assert_eq!(ctx.get(DAYS_IN_PERIOD), Some(Decimal::from(31)));
        assert_eq!(ctx.get(TENURE_YEARS), Some(Decimal::from(6)));
        assert_eq!(ctx.get(DEPENDENTS), Some(Decimal::from(2)));
        assert_eq!(ctx.get(CONTRACT_FIXED_TERM), Some(Decimal::ONE));
        assert_eq!(ctx.get(CONTRACT_INDEFINITE), Some(Decimal::ZERO));
        assert_eq!(ctx.get(TOTAL_EARNINGS), None);
    }

    #[test]
    fn test_extra_defaults_cannot_override_attributes_or_total_earnings() {
        let worker = create_worker(ContractType::Indefinite);
        let mut extra = BTreeMap::new();
        extra.insert("MINIMUM_WAGE".to_string(), Decimal::from(1130));
        extra.insert(BASIC_SALARY.to_string(), Decimal::from(1));
        extra.insert(TOTAL_EARNINGS.to_string(), Decimal::from(99));
        let defaults = ContextDefaults {
            extra,
            ..ContextDefaults::default()
        };

        let ctx =
            VariableContext::for_worker(&worker, Decimal::from(2000), Period::new(2025, 1).unwrap(), &defaults);
        assert_eq!(ctx.get("MINIMUM_WAGE"), Some(Decimal::from(1130)));
        assert_eq!(ctx.get(BASIC_SALARY), Some(Decimal::from(2000)));
        assert_eq!(ctx.get(TOTAL_EARNINGS), None);
    }

    #[test]
    fn test_with_total_earnings_leaves_original_untouched() {
        let base = VariableContext::from_pairs([(BASIC_SALARY, Decimal::from(1000))]);
        let derived = base.with_total_earnings(Decimal::from(1200));

        assert_eq!(base.get(TOTAL_EARNINGS), None);
        assert_eq!(derived.get(TOTAL_EARNINGS), Some(Decimal::from(1200)));
        assert_eq!(derived.get(BASIC_SALARY), Some(Decimal::from(1000)));
        assert_eq!(derived.len(), base.len() + 1);
    }

    #[test]
    fn test_lookup_is_exact() {
        let ctx = VariableContext::from_pairs([("BASE", Decimal::ONE)]);
        assert_eq!(ctx.get("BASE"), Some(Decimal::ONE));
        assert_eq!(ctx.get("base"), None);
        assert_eq!(ctx.get("BASE_EXTRA"), None);
    }
}
