//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition a caller of the engine can observe. Formula and
//! storage failures have their own types and are converted at the boundary
//! that owns them.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// Validation and conflict variants carry enough detail for the caller to
/// correct the request. `Persistence` is deliberately generic: the commit
/// has been rolled back and the backend message is only useful in logs.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::InvalidPeriod {
///     value: "2025-13".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid period '2025-13': expected YYYY-MM");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// The period string was not of the form `YYYY-MM`.
    #[error("Invalid period '{value}': expected YYYY-MM")]
    InvalidPeriod {
        /// The rejected input.
        value: String,
    },

    /// The roster returned no active workers for the requested scope.
    #[error("No eligible workers for personnel scope '{scope}'")]
    NoEligibleWorkers {
        /// The scope that was queried.
        scope: String,
    },

    /// The concept catalog holds no active concepts.
    #[error("No active concepts in the catalog")]
    NoActiveConcepts,

    /// A commit was requested with zero detail lines.
    #[error("Cannot commit a payroll run without detail lines")]
    EmptyDetail,

    /// A detail line supplied for commit is internally inconsistent.
    #[error("Invalid detail line for worker '{worker_id}': {message}")]
    InvalidDetail {
        /// The worker the line belongs to.
        worker_id: String,
        /// What made the line invalid.
        message: String,
    },

    /// An amount or a sum of amounts does not fit in a `Decimal`.
    #[error("Amount out of range: {message}")]
    AmountOutOfRange {
        /// Which amount overflowed.
        message: String,
    },

    /// A committed run already exists for this period and payroll type.
    #[error("A {payroll_type} payroll for period {period} has already been committed")]
    CommitConflict {
        /// The period of the existing run.
        period: String,
        /// The payroll type of the existing run.
        payroll_type: String,
    },

    /// The durable store failed while committing; nothing was written.
    #[error("Internal error while persisting the payroll run")]
    Persistence {
        /// The backend error, for diagnostics only.
        message: String,
    },

    /// The worker roster or concept catalog could not be queried.
    #[error("Collaborator query failed: {message}")]
    Collaborator {
        /// A description of the failure.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Returns true for errors the caller can fix by changing the request.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidPeriod { .. }
                | EngineError::NoEligibleWorkers { .. }
                | EngineError::NoActiveConcepts
                | EngineError::EmptyDetail
                | EngineError::InvalidDetail { .. }
                | EngineError::AmountOutOfRange { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_period_displays_value() {
        let error = EngineError::InvalidPeriod {
            value: "March".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid period 'March': expected YYYY-MM");
    }

    #[test]
    fn test_no_eligible_workers_displays_scope() {
        let error = EngineError::NoEligibleWorkers {
            scope: "plant".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "No eligible workers for personnel scope 'plant'"
        );
    }

    #[test]
    fn test_commit_conflict_displays_period_and_type() {
        let error = EngineError::CommitConflict {
            period: "2025-01".to_string(),
            payroll_type: "regular".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "A regular payroll for period 2025-01 has already been committed"
        );
    }

    #[test]
    fn test_persistence_hides_backend_message() {
        let error = EngineError::Persistence {
            message: "disk full".to_string(),
        };
        assert!(!error.to_string().contains("disk full"));
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/engine.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/engine.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(EngineError::EmptyDetail.is_validation());
        assert!(EngineError::NoActiveConcepts.is_validation());
        assert!(
            EngineError::AmountOutOfRange {
                message: "run totals".to_string()
            }
            .is_validation()
        );
        assert!(
            !EngineError::CommitConflict {
                period: "2025-01".to_string(),
                payroll_type: "regular".to_string(),
            }
            .is_validation()
        );
        assert!(
            !EngineError::Persistence {
                message: "x".to_string()
            }
            .is_validation()
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_empty_detail() -> EngineResult<()> {
            Err(EngineError::EmptyDetail)
        }

        fn propagates_error() -> EngineResult<()> {
            returns_empty_detail()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
