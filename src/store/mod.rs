//! Collaborator ports and storage.
//!
//! The engine reads workers and concepts through [`WorkerRoster`] and
//! [`ConceptCatalog`], and persists committed runs through the
//! transactional [`PayrollStore`]. In-memory implementations of all three
//! are provided.

mod error;
mod memory;
mod records;
mod traits;

pub use error::StoreError;
pub use memory::{InMemoryPayrollStore, MemoryTransaction, StaticCatalog, StaticRoster};
pub use records::{ApplicationRow, CommittedRun, DetailRow, RunHeader};
pub use traits::{ConceptCatalog, PayrollStore, WorkerRoster};
