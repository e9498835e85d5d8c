//! Collaborator and storage traits.
//!
//! The engine depends only on these traits. In-memory implementations are
//! in `store::memory`.

use crate::models::{Concept, PayrollType, Period, PersonnelScope, Worker};

use super::error::StoreError;
use super::records::{ApplicationRow, CommittedRun, DetailRow, RunHeader};

/// Source of the workers a run is computed for.
pub trait WorkerRoster: Send + Sync {
    /// Returns the active workers within `scope`, in roster order.
    fn active_workers(&self, scope: &PersonnelScope) -> Result<Vec<Worker>, StoreError>;
}

/// Source of the concepts a run applies.
pub trait ConceptCatalog: Send + Sync {
    /// Returns the active concepts, in any order.
    fn active_concepts(&self) -> Result<Vec<Concept>, StoreError>;
}

/// Durable, transactional storage for committed runs.
///
/// ## Transaction Semantics
///
/// All writes take `&mut Self::Transaction`. The lifecycle is:
///
/// 1. `begin()` starts a transaction
/// 2. `insert_header`, then `insert_detail` / `insert_application` per line
/// 3. `commit(tx)` makes every row visible at once, OR `rollback(tx)`
///    discards them
///
/// Nothing written through a transaction is visible before `commit`. A
/// transaction dropped without either call must behave as rolled back.
///
/// ## Uniqueness
///
/// `commit` must check and install the (period, payroll type) key
/// atomically and return [`StoreError::AlreadyCommitted`] if the key is
/// taken, so two racing commits cannot both succeed.
pub trait PayrollStore: Send + Sync {
    /// The in-progress transaction type of this backend.
    type Transaction: Send;

    /// Returns true if a run is committed for the key.
    fn run_exists(&self, period: Period, payroll_type: PayrollType) -> Result<bool, StoreError>;

    /// Begins a new transaction.
    fn begin(&self) -> Result<Self::Transaction, StoreError>;

    /// Stages the run header. Must come before any detail row.
    fn insert_header(
        &self,
        tx: &mut Self::Transaction,
        header: RunHeader,
    ) -> Result<(), StoreError>;

    /// Stages one detail row.
    fn insert_detail(&self, tx: &mut Self::Transaction, detail: DetailRow)
    -> Result<(), StoreError>;

    /// Stages one application row.
    fn insert_application(
        &self,
        tx: &mut Self::Transaction,
        application: ApplicationRow,
    ) -> Result<(), StoreError>;

    /// Commits the transaction, consuming it.
    fn commit(&self, tx: Self::Transaction) -> Result<(), StoreError>;

    /// Rolls the transaction back, consuming it.
    fn rollback(&self, tx: Self::Transaction) -> Result<(), StoreError>;

    /// Reads back a committed run.
    fn committed_run(
        &self,
        period: Period,
        payroll_type: PayrollType,
    ) -> Result<Option<CommittedRun>, StoreError>;

    /// Number of committed runs.
    fn committed_run_count(&self) -> Result<usize, StoreError>;
}
