//! Worker snapshot model.
//!
//! Workers are owned by the external roster; the engine only reads them.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The worker's contract arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    /// Open-ended contract.
    Indefinite,
    /// Contract with an end date.
    FixedTerm,
    /// Reduced-hours contract.
    PartTime,
}

/// Whether the worker is currently on the payroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    /// Included in payroll runs.
    #[default]
    Active,
    /// Terminated or suspended.
    Inactive,
}

/// A read-only snapshot of one worker as supplied by the roster.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{ContractType, Worker, WorkerStatus};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let worker = Worker {
///     id: "w_001".to_string(),
///     document_number: "40112233".to_string(),
///     first_name: "Ana".to_string(),
///     last_name: "Quispe".to_string(),
///     basic_salary: Decimal::from(2000),
///     hire_date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
///     contract_type: ContractType::Indefinite,
///     personnel_group: "office".to_string(),
///     dependents: 0,
///     status: WorkerStatus::Active,
/// };
/// assert_eq!(worker.full_name(), "Ana Quispe");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Unique identifier.
    pub id: String,
    /// National identity document number.
    pub document_number: String,
    /// Given name(s).
    pub first_name: String,
    /// Family name(s).
    pub last_name: String,
    /// Monthly basic salary before any payroll-type scaling.
    pub basic_salary: Decimal,
    /// First day of employment.
    pub hire_date: NaiveDate,
    /// Contract arrangement.
    pub contract_type: ContractType,
    /// Personnel group used for scoping runs (e.g. "office", "plant").
    pub personnel_group: String,
    /// Number of dependents declared by the worker.
    #[serde(default)]
    pub dependents: u32,
    /// Active or inactive.
    #[serde(default)]
    pub status: WorkerStatus,
}

impl Worker {
    /// Returns "first last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns true if the worker takes part in payroll runs.
    pub fn is_active(&self) -> bool {
        self.status == WorkerStatus::Active
    }

    /// Whole months of service from hire date to `as_of`, zero if hired later.
    pub fn tenure_months(&self, as_of: NaiveDate) -> u32 {
        if as_of < self.hire_date {
            return 0;
        }
        let mut months = (as_of.year() - self.hire_date.year()) * 12
            + (as_of.month() as i32 - self.hire_date.month() as i32);
        if as_of.day() < self.hire_date.day() {
            months -= 1;
        }
        months.max(0) as u32
    }

    /// Whole years of service from hire date to `as_of`.
    pub fn tenure_years(&self, as_of: NaiveDate) -> u32 {
        self.tenure_months(as_of) / 12
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_worker(hire_date: NaiveDate) -> Worker {
        Worker {
            id: "w_001".to_string(),
            document_number: "40112233".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Quispe".to_string(),
            basic_salary: Decimal::from(2000),
            hire_date,
            contract_type: ContractType::Indefinite,
            personnel_group: "office".to_string(),
            dependents: 1,
            status: WorkerStatus::Active,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_deserialize_worker_with_defaults() {
        let json = r#"{
            "id": "w_002",
            "document_number": "10203040",
            "first_name": "Luis",
            "last_name": "Rojas",
            "basic_salary": "3000.00",
            "hire_date": "2018-07-15",
            "contract_type": "fixed_term",
            "personnel_group": "plant"
        }"#;

        let worker: Worker = serde_json::from_str(json).unwrap();
        assert_eq!(worker.contract_type, ContractType::FixedTerm);
        assert_eq!(worker.dependents, 0);
        assert!(worker.is_active());
    }

    #[test]
    fn test_tenure_counts_whole_months() {
        let worker = create_test_worker(date(2020, 3, 15));
        assert_eq!(worker.tenure_months(date(2020, 4, 14)), 0);
        assert_eq!(worker.tenure_months(date(2020, 4, 15)), 1);
        assert_eq!(worker.tenure_months(date(2025, 3, 31)), 60);
        assert_eq!(worker.tenure_years(date(2025, 3, 31)), 5);
    }

    #[test]
    fn test_tenure_is_zero_before_hire() {
        let worker = create_test_worker(date(2025, 6, 1));
        assert_eq!(worker.tenure_months(date(2025, 3, 31)), 0);
        assert_eq!(worker.tenure_years(date(2025, 3, 31)), 0);
    }

    #[test]
    fn test_full_name() {
        let worker = create_test_worker(date(2020, 1, 1));
        assert_eq!(worker.full_name(), "Ana Quispe");
    }
}
