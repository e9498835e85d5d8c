//! Payroll run result models.
//!
//! This module contains the [`PayrollRun`] type and the per-worker
//! [`WorkerPayrollLine`] and [`ConceptApplication`] structures it aggregates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ConceptType, PayrollType, Period, PersonnelScope, round_money};

/// Identifier of a committed payroll run.
pub type RunId = Uuid;

/// One concept applied to one worker, with its rounded amount.
///
/// Only non-zero amounts are ever recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptApplication {
    /// The concept's identifier.
    pub concept_id: String,
    /// The concept's business code.
    pub code: String,
    /// The concept's name.
    pub name: String,
    /// Earning, deduction or employer contribution.
    pub concept_type: ConceptType,
    /// The computed amount, rounded to two places.
    pub amount: Decimal,
}

/// The pay breakdown of one worker within a run.
///
/// Invariant: `net_pay == total_earnings - total_deductions`. Employer
/// contributions are reported but never enter net pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerPayrollLine {
    /// The worker's identifier.
    pub worker_id: String,
    /// The worker's identity document number.
    pub document_number: String,
    /// The worker's full name.
    pub full_name: String,
    /// Basic salary after the payroll-type multiplier.
    pub basic_salary: Decimal,
    /// Sum of earning applications.
    pub total_earnings: Decimal,
    /// Sum of deduction applications.
    pub total_deductions: Decimal,
    /// Sum of employer contribution applications.
    pub total_contributions: Decimal,
    /// Earnings minus deductions.
    pub net_pay: Decimal,
    /// Applied concepts: earnings, then deductions, then contributions.
    pub applications: Vec<ConceptApplication>,
}

impl WorkerPayrollLine {
    /// Returns true if `net_pay` equals earnings minus deductions. A
    /// difference outside the `Decimal` range is never balanced.
    pub fn is_balanced(&self) -> bool {
        self.total_earnings.checked_sub(self.total_deductions) == Some(self.net_pay)
    }
}

/// Whether a run is an ephemeral preview or a durable committed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Computed on demand and never persisted.
    Preview,
    /// Persisted exactly once for its period and payroll type.
    Committed,
}

/// Run-level totals, each the rounded sum of the corresponding line totals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunTotals {
    /// Number of worker lines.
    pub worker_count: usize,
    /// Sum of line earnings.
    pub total_earnings: Decimal,
    /// Sum of line deductions.
    pub total_deductions: Decimal,
    /// Sum of line employer contributions.
    pub total_contributions: Decimal,
    /// Sum of line net pay.
    pub net_pay: Decimal,
}

impl RunTotals {
    /// Sums a set of lines, or returns `None` if any sum leaves the
    /// `Decimal` range.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{RunTotals, WorkerPayrollLine};
    /// use rust_decimal::Decimal;
    ///
    /// let line = WorkerPayrollLine {
    ///     worker_id: "w1".to_string(),
    ///     document_number: "1".to_string(),
    ///     full_name: "A B".to_string(),
    ///     basic_salary: Decimal::from(1000),
    ///     total_earnings: Decimal::from(1000),
    ///     total_deductions: Decimal::from(130),
    ///     total_contributions: Decimal::from(90),
    ///     net_pay: Decimal::from(870),
    ///     applications: vec![],
    /// };
    /// let totals = RunTotals::from_lines(&[line.clone(), line]).unwrap();
    /// assert_eq!(totals.worker_count, 2);
    /// assert_eq!(totals.net_pay, Decimal::from(1740));
    /// ```
    pub fn from_lines(lines: &[WorkerPayrollLine]) -> Option<Self> {
        let sums = lines.iter().try_fold(RunTotals::default(), |acc, line| {
            Some(RunTotals {
                worker_count: acc.worker_count + 1,
                total_earnings: acc.total_earnings.checked_add(line.total_earnings)?,
                total_deductions: acc.total_deductions.checked_add(line.total_deductions)?,
                total_contributions: acc
                    .total_contributions
                    .checked_add(line.total_contributions)?,
                net_pay: acc.net_pay.checked_add(line.net_pay)?,
            })
        })?;
        Some(RunTotals {
            worker_count: sums.worker_count,
            total_earnings: round_money(sums.total_earnings),
            total_deductions: round_money(sums.total_deductions),
            total_contributions: round_money(sums.total_contributions),
            net_pay: round_money(sums.net_pay),
        })
    }
}

/// A computed payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRun {
    /// The month covered.
    pub period: Period,
    /// The payroll classification.
    pub payroll_type: PayrollType,
    /// The part of the roster covered.
    pub scope: PersonnelScope,
    /// Preview or committed.
    pub status: RunStatus,
    /// Aggregated totals.
    pub totals: RunTotals,
    /// One line per worker, in roster order.
    pub lines: Vec<WorkerPayrollLine>,
    /// When the run was computed.
    pub computed_at: DateTime<Utc>,
    /// The engine version that computed the run.
    pub engine_version: String,
}
