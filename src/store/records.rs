//! Rows written by the commit boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    ConceptApplication, ConceptType, PayrollRun, PayrollType, Period, PersonnelScope, RunId,
    RunStatus, RunTotals, WorkerPayrollLine,
};

/// Header row of a committed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHeader {
    /// Identifier assigned at commit.
    pub run_id: RunId,
    /// The run's period.
    pub period: Period,
    /// The run's payroll type.
    pub payroll_type: PayrollType,
    /// The personnel scope the run was computed for.
    pub scope: PersonnelScope,
    /// Totals recomputed from the committed detail rows.
    pub totals: RunTotals,
    /// Commit time.
    pub committed_at: DateTime<Utc>,
    /// Version of the engine that committed the run.
    pub engine_version: String,
}

/// One worker's totals within a committed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRow {
    /// Owning run.
    pub run_id: RunId,
    /// Position of the line within the run, from 0.
    pub line_index: usize,
    /// The worker's identifier.
    pub worker_id: String,
    /// The worker's identity document number.
    pub document_number: String,
    /// The worker's full name.
    pub full_name: String,
    /// Scaled basic salary.
    pub basic_salary: Decimal,
    /// Sum of earnings.
    pub total_earnings: Decimal,
    /// Sum of deductions.
    pub total_deductions: Decimal,
    /// Sum of employer contributions.
    pub total_contributions: Decimal,
    /// Earnings minus deductions.
    pub net_pay: Decimal,
}

impl DetailRow {
    /// Builds the detail row for one line.
    pub fn from_line(run_id: RunId, line_index: usize, line: &WorkerPayrollLine) -> Self {
        Self {
            run_id,
            line_index,
            worker_id: line.worker_id.clone(),
            document_number: line.document_number.clone(),
            full_name: line.full_name.clone(),
            basic_salary: line.basic_salary,
            total_earnings: line.total_earnings,
            total_deductions: line.total_deductions,
            total_contributions: line.total_contributions,
            net_pay: line.net_pay,
        }
    }
}

/// One concept applied to one worker within a committed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRow {
    /// Owning run.
    pub run_id: RunId,
    /// Owning detail row's worker.
    pub worker_id: String,
    /// The concept's identifier.
    pub concept_id: String,
    /// The concept's business code.
    pub code: String,
    /// The concept's name.
    pub name: String,
    /// Earning, deduction or employer contribution.
    pub concept_type: ConceptType,
    /// The applied amount.
    pub amount: Decimal,
}

impl ApplicationRow {
    /// Builds the application row for one applied concept.
    pub fn from_application(
        run_id: RunId,
        worker_id: &str,
        application: &ConceptApplication,
    ) -> Self {
        Self {
            run_id,
            worker_id: worker_id.to_string(),
            concept_id: application.concept_id.clone(),
            code: application.code.clone(),
            name: application.name.clone(),
            concept_type: application.concept_type,
            amount: application.amount,
        }
    }
}

/// Everything persisted for one committed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedRun {
    /// The header row.
    pub header: RunHeader,
    /// Detail rows in commit order.
    pub details: Vec<DetailRow>,
    /// Application rows in commit order.
    pub applications: Vec<ApplicationRow>,
}

impl CommittedRun {
    /// Reassembles the rows into a committed [`PayrollRun`].
    pub fn to_payroll_run(&self) -> PayrollRun {
        let mut details: Vec<&DetailRow> = self.details.iter().collect();
        details.sort_by_key(|detail| detail.line_index);
        let lines = details
            .into_iter()
            .map(|detail| WorkerPayrollLine {
                worker_id: detail.worker_id.clone(),
                document_number: detail.document_number.clone(),
                full_name: detail.full_name.clone(),
                basic_salary: detail.basic_salary,
                total_earnings: detail.total_earnings,
                total_deductions: detail.total_deductions,
                total_contributions: detail.total_contributions,
                net_pay: detail.net_pay,
                applications: self
                    .applications
                    .iter()
                    .filter(|row| row.worker_id == detail.worker_id)
                    .map(|row| ConceptApplication {
                        concept_id: row.concept_id.clone(),
                        code: row.code.clone(),
                        name: row.name.clone(),
                        concept_type: row.concept_type,
                        amount: row.amount,
                    })
                    .collect(),
            })
            .collect();

        PayrollRun {
            period: self.header.period,
            payroll_type: self.header.payroll_type,
            scope: self.header.scope.clone(),
            status: RunStatus::Committed,
            totals: self.header.totals.clone(),
            lines,
            computed_at: self.header.committed_at,
            engine_version: self.header.engine_version.clone(),
        }
    }
}
