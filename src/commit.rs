//! Payroll commit boundary.
//!
//! Persists a reviewed, possibly edited, set of worker lines exactly once
//! per (period, payroll type). The header, detail rows and application rows
//! are written in one store transaction; any failure rolls it back.

use std::collections::HashSet;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{PayrollType, Period, PersonnelScope, RunId, RunTotals, WorkerPayrollLine};
use crate::store::{ApplicationRow, DetailRow, PayrollStore, RunHeader, StoreError};

/// Rejects line sets that cannot form a consistent run.
fn validate_lines(lines: &[WorkerPayrollLine]) -> EngineResult<()> {
    if lines.is_empty() {
        return Err(EngineError::EmptyDetail);
    }

    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        if line.worker_id.trim().is_empty() {
            return Err(EngineError::InvalidDetail {
                worker_id: line.worker_id.clone(),
                message: "worker id is empty".to_string(),
            });
        }
        if !seen.insert(line.worker_id.as_str()) {
            return Err(EngineError::InvalidDetail {
                worker_id: line.worker_id.clone(),
                message: "worker appears more than once".to_string(),
            });
        }
        if !line.is_balanced() {
            return Err(EngineError::InvalidDetail {
                worker_id: line.worker_id.clone(),
                message: format!(
                    "net pay {} does not equal earnings {} minus deductions {}",
                    line.net_pay, line.total_earnings, line.total_deductions
                ),
            });
        }
    }
    Ok(())
}

fn map_store_error(period: Period, payroll_type: PayrollType, err: StoreError) -> EngineError {
    match err {
        StoreError::AlreadyCommitted { .. } => EngineError::CommitConflict {
            period: period.to_string(),
            payroll_type: payroll_type.to_string(),
        },
        StoreError::Backend(message) => {
            error!(
                period = %period,
                payroll_type = %payroll_type,
                error = %message,
                "Payroll commit failed"
            );
            EngineError::Persistence { message }
        }
    }
}

/// Stages every row of the run into `tx`.
fn write_rows<S: PayrollStore>(
    store: &S,
    tx: &mut S::Transaction,
    header: RunHeader,
    lines: &[WorkerPayrollLine],
) -> Result<(), StoreError> {
    let run_id = header.run_id;
    store.insert_header(tx, header)?;
    for (line_index, line) in lines.iter().enumerate() {
        store.insert_detail(tx, DetailRow::from_line(run_id, line_index, line))?;
        for application in line.applications.iter().filter(|a| !a.amount.is_zero()) {
            store.insert_application(
                tx,
                ApplicationRow::from_application(run_id, &line.worker_id, application),
            )?;
        }
    }
    Ok(())
}

/// Commits a run and returns its new identifier.
///
/// # Errors
///
/// - `InvalidPeriod` if `period` is not `YYYY-MM`
/// - `EmptyDetail` if `lines` is empty
/// - `InvalidDetail` for an unbalanced line or a repeated worker
/// - `AmountOutOfRange` if the run totals do not fit in a `Decimal`
/// - `CommitConflict` if a run is already committed for the key, whether
///   found before writing or at the store's final commit
/// - `Persistence` for any other store failure; nothing is persisted
pub fn commit_run<S: PayrollStore>(
    store: &S,
    period: &str,
    payroll_type: PayrollType,
    scope: &PersonnelScope,
    lines: &[WorkerPayrollLine],
) -> EngineResult<RunId> {
    let start_time = Instant::now();

    let period: Period = period.parse()?;
    validate_lines(lines)?;
    let totals = RunTotals::from_lines(lines).ok_or_else(|| EngineError::AmountOutOfRange {
        message: format!("totals of the {} {} run", period, payroll_type),
    })?;

    if store
        .run_exists(period, payroll_type)
        .map_err(|e| map_store_error(period, payroll_type, e))?
    {
        warn!(
            period = %period,
            payroll_type = %payroll_type,
            "Payroll run already committed, refusing commit"
        );
        return Err(EngineError::CommitConflict {
            period: period.to_string(),
            payroll_type: payroll_type.to_string(),
        });
    }

    let header = RunHeader {
        run_id: Uuid::new_v4(),
        period,
        payroll_type,
        scope: scope.clone(),
        totals: totals.clone(),
        committed_at: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let run_id = header.run_id;

    let mut tx = store
        .begin()
        .map_err(|e| map_store_error(period, payroll_type, e))?;

    if let Err(err) = write_rows(store, &mut tx, header, lines) {
        if let Err(rollback_err) = store.rollback(tx) {
            error!(
                run_id = %run_id,
                error = %rollback_err,
                "Rollback after failed payroll write also failed"
            );
        }
        return Err(map_store_error(period, payroll_type, err));
    }

    if let Err(err) = store.commit(tx) {
        if matches!(err, StoreError::AlreadyCommitted { .. }) {
            warn!(
                period = %period,
                payroll_type = %payroll_type,
                "Concurrent commit won the race, refusing commit"
            );
        }
        return Err(map_store_error(period, payroll_type, err));
    }

    info!(
        run_id = %run_id,
        period = %period,
        payroll_type = %payroll_type,
        scope = %scope,
        workers = totals.worker_count,
        total_earnings = %totals.total_earnings,
        net_pay = %totals.net_pay,
        duration_us = start_time.elapsed().as_micros() as u64,
        "Payroll run committed"
    );

    Ok(run_id)
}
