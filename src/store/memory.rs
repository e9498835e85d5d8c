//! In-memory collaborators.
//!
//! [`StaticRoster`] and [`StaticCatalog`] serve fixed lists, typically
//! loaded from YAML by [`ConfigLoader`](crate::config::ConfigLoader).
//! [`InMemoryPayrollStore`] stages writes per transaction and installs them
//! under a single mutex at commit.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::models::{Concept, PayrollType, Period, PersonnelScope, Worker};

use super::error::StoreError;
use super::records::{ApplicationRow, CommittedRun, DetailRow, RunHeader};
use super::traits::{ConceptCatalog, PayrollStore, WorkerRoster};

/// A roster backed by a fixed list of workers.
#[derive(Debug, Clone, Default)]
pub struct StaticRoster {
    workers: Vec<Worker>,
}

impl StaticRoster {
    /// Creates a roster; inactive workers are kept but never returned.
    pub fn new(workers: Vec<Worker>) -> Self {
        Self { workers }
    }
}

impl WorkerRoster for StaticRoster {
    fn active_workers(&self, scope: &PersonnelScope) -> Result<Vec<Worker>, StoreError> {
        Ok(self
            .workers
            .iter()
            .filter(|w| w.is_active() && scope.includes(&w.personnel_group))
            .cloned()
            .collect())
    }
}

/// A catalog backed by a fixed list of concepts.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    concepts: Vec<Concept>,
}

impl StaticCatalog {
    /// Creates a catalog; inactive concepts are kept but never returned.
    pub fn new(concepts: Vec<Concept>) -> Self {
        Self { concepts }
    }
}

impl ConceptCatalog for StaticCatalog {
    fn active_concepts(&self) -> Result<Vec<Concept>, StoreError> {
        Ok(self
            .concepts
            .iter()
            .filter(|c| c.is_active())
            .cloned()
            .collect())
    }
}

/// Rows staged by one [`InMemoryPayrollStore`] transaction.
#[derive(Debug, Default)]
pub struct MemoryTransaction {
    header: Option<RunHeader>,
    details: Vec<DetailRow>,
    applications: Vec<ApplicationRow>,
    staged_workers: HashSet<String>,
}

/// A [`PayrollStore`] holding committed runs in memory.
#[derive(Debug, Default)]
pub struct InMemoryPayrollStore {
    runs: Mutex<BTreeMap<(Period, PayrollType), CommittedRun>>,
}

impl InMemoryPayrollStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn runs(&self) -> Result<MutexGuard<'_, BTreeMap<(Period, PayrollType), CommittedRun>>, StoreError> {
        self.runs
            .lock()
            .map_err(|_| StoreError::Backend("run table lock poisoned".to_string()))
    }
}

fn require_header(tx: &MemoryTransaction) -> Result<&RunHeader, StoreError> {
    tx.header
        .as_ref()
        .ok_or_else(|| StoreError::Backend("no run header in transaction".to_string()))
}

impl PayrollStore for InMemoryPayrollStore {
    type Transaction = MemoryTransaction;

    fn run_exists(&self, period: Period, payroll_type: PayrollType) -> Result<bool, StoreError> {
        Ok(self.runs()?.contains_key(&(period, payroll_type)))
    }

    fn begin(&self) -> Result<MemoryTransaction, StoreError> {
        Ok(MemoryTransaction::default())
    }

    fn insert_header(&self, tx: &mut MemoryTransaction, header: RunHeader) -> Result<(), StoreError> {
        if tx.header.is_some() {
            return Err(StoreError::Backend(
                "run header already staged in transaction".to_string(),
            ));
        }
        tx.header = Some(header);
        Ok(())
    }

    fn insert_detail(&self, tx: &mut MemoryTransaction, detail: DetailRow) -> Result<(), StoreError> {
        let header = require_header(tx)?;
        if detail.run_id != header.run_id {
            return Err(StoreError::Backend(format!(
                "detail row for worker {} references another run",
                detail.worker_id
            )));
        }
        if !tx.staged_workers.insert(detail.worker_id.clone()) {
            return Err(StoreError::Backend(format!(
                "duplicate detail row for worker {}",
                detail.worker_id
            )));
        }
        tx.details.push(detail);
        Ok(())
    }

    fn insert_application(
        &self,
        tx: &mut MemoryTransaction,
        application: ApplicationRow,
    ) -> Result<(), StoreError> {
        require_header(tx)?;
        if !tx.staged_workers.contains(&application.worker_id) {
            return Err(StoreError::Backend(format!(
                "application row for worker {} has no detail row",
                application.worker_id
            )));
        }
        tx.applications.push(application);
        Ok(())
    }

    fn commit(&self, tx: MemoryTransaction) -> Result<(), StoreError> {
        let MemoryTransaction {
            header,
            details,
            applications,
            ..
        } = tx;
        let header =
            header.ok_or_else(|| StoreError::Backend("no run header in transaction".to_string()))?;
        let key = (header.period, header.payroll_type);

        let mut runs = self.runs()?;
        if runs.contains_key(&key) {
            return Err(StoreError::AlreadyCommitted {
                period: header.period,
                payroll_type: header.payroll_type,
            });
        }
        runs.insert(
            key,
            CommittedRun {
                header,
                details,
                applications,
            },
        );
        Ok(())
    }

    fn rollback(&self, tx: MemoryTransaction) -> Result<(), StoreError> {
        drop(tx);
        Ok(())
    }

    fn committed_run(
        &self,
        period: Period,
        payroll_type: PayrollType,
    ) -> Result<Option<CommittedRun>, StoreError> {
        Ok(self.runs()?.get(&(period, payroll_type)).cloned())
    }

    fn committed_run_count(&self) -> Result<usize, StoreError> {
        Ok(self.runs()?.len())
    }
}
