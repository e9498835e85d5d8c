//! Error type shared by the collaborator and store traits.

use thiserror::Error;

use crate::models::{PayrollType, Period};

/// Errors returned by collaborator and store implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A committed run already exists for the key. Raised inside the
    /// store's atomic commit, so it also catches commits that raced past
    /// an earlier existence check.
    #[error("payroll run already committed: {period} {payroll_type}")]
    AlreadyCommitted {
        /// The run's period.
        period: Period,
        /// The run's payroll type.
        payroll_type: PayrollType,
    },

    /// A backend-specific failure (connection, lock, constraint, ...).
    #[error("storage backend error: {0}")]
    Backend(String),
}
