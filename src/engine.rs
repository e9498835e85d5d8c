//! The payroll engine facade.

use std::path::Path;

use crate::calculation::{ConceptPlan, PayrollCalculator};
use crate::commit::commit_run;
use crate::config::{ConfigLoader, EngineConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{PayrollRun, PayrollType, Period, PersonnelScope, RunId, WorkerPayrollLine};
use crate::store::{
    ConceptCatalog, InMemoryPayrollStore, PayrollStore, StaticCatalog, StaticRoster, StoreError,
    WorkerRoster,
};

fn collaborator_error(err: StoreError) -> EngineError {
    EngineError::Collaborator {
        message: err.to_string(),
    }
}

/// Computes previews and commits runs against a roster, a concept catalog
/// and a payroll store.
///
/// # Example
///
/// ```no_run
/// use payroll_engine::engine::PayrollEngine;
/// use payroll_engine::models::{PayrollType, PersonnelScope};
///
/// let engine = PayrollEngine::from_config_dir("./config/default")?;
/// let preview = engine.compute_preview("2025-03", PayrollType::Regular, &PersonnelScope::All)?;
/// let run_id = engine.commit("2025-03", PayrollType::Regular, &PersonnelScope::All, &preview.lines)?;
/// println!("Committed {}", run_id);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub struct PayrollEngine<R, C, S> {
    calculator: PayrollCalculator,
    roster: R,
    catalog: C,
    store: S,
}

impl PayrollEngine<StaticRoster, StaticCatalog, InMemoryPayrollStore> {
    /// Builds an engine from a configuration directory, serving its roster
    /// and catalog fixtures and committing into an empty in-memory store.
    pub fn from_config_dir<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let (config, concepts, workers) = ConfigLoader::load(path)?.into_parts();
        Ok(Self::new(
            config,
            StaticRoster::new(workers),
            StaticCatalog::new(concepts),
            InMemoryPayrollStore::new(),
        ))
    }
}

impl<R, C, S> PayrollEngine<R, C, S>
where
    R: WorkerRoster,
    C: ConceptCatalog,
    S: PayrollStore,
{
    /// Creates an engine from its collaborators.
    pub fn new(config: EngineConfig, roster: R, catalog: C, store: S) -> Self {
        Self {
            calculator: PayrollCalculator::new(config),
            roster,
            catalog,
            store,
        }
    }

    /// Returns the engine policy.
    pub fn config(&self) -> &EngineConfig {
        self.calculator.config()
    }

    /// Returns the payroll store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Computes an unpersisted run for the active workers in `scope`.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod`, `NoEligibleWorkers`, `NoActiveConcepts`,
    /// `AmountOutOfRange` if a scaled salary or a run total overflows, or
    /// `Collaborator` if the roster or catalog cannot be read.
    pub fn compute_preview(
        &self,
        period: &str,
        payroll_type: PayrollType,
        scope: &PersonnelScope,
    ) -> EngineResult<PayrollRun> {
        let period: Period = period.parse()?;
        let workers = self
            .roster
            .active_workers(scope)
            .map_err(collaborator_error)?;
        let concepts = self
            .catalog
            .active_concepts()
            .map_err(collaborator_error)?;
        let plan = ConceptPlan::from_concepts(concepts);

        self.calculator
            .compute_run(period, payroll_type, scope, &workers, &plan)
    }

    /// Persists `lines` as the committed run for (period, payroll type).
    ///
    /// See [`commit_run`] for validation and error semantics.
    pub fn commit(
        &self,
        period: &str,
        payroll_type: PayrollType,
        scope: &PersonnelScope,
        lines: &[WorkerPayrollLine],
    ) -> EngineResult<RunId> {
        commit_run(&self.store, period, payroll_type, scope, lines)
    }

    /// Reads back a committed run.
    pub fn committed_run(
        &self,
        period: &str,
        payroll_type: PayrollType,
    ) -> EngineResult<Option<PayrollRun>> {
        let period: Period = period.parse()?;
        let run = self
            .store
            .committed_run(period, payroll_type)
            .map_err(|e| EngineError::Persistence {
                message: e.to_string(),
            })?;
        Ok(run.map(|run| run.to_payroll_run()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunStatus;

    struct BrokenRoster;

    impl WorkerRoster for BrokenRoster {
        fn active_workers(
            &self,
            _scope: &PersonnelScope,
        ) -> Result<Vec<crate::models::Worker>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
    }

    #[test]
    fn test_roster_failure_surfaces_as_collaborator_error() {
        let engine = PayrollEngine::new(
            EngineConfig::default(),
            BrokenRoster,
            StaticCatalog::default(),
            InMemoryPayrollStore::new(),
        );
        let result = engine.compute_preview("2025-03", PayrollType::Regular, &PersonnelScope::All);
        assert!(matches!(result, Err(EngineError::Collaborator { .. })));
    }

    #[test]
    fn test_preview_rejects_malformed_period() {
        let engine = PayrollEngine::from_config_dir("./config/default").unwrap();
        let result = engine.compute_preview("03-2025", PayrollType::Regular, &PersonnelScope::All);
        assert!(matches!(result, Err(EngineError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_committed_run_reads_back() {
        let engine = PayrollEngine::from_config_dir("./config/default").unwrap();
        let preview = engine
            .compute_preview("2025-03", PayrollType::Regular, &PersonnelScope::All)
            .unwrap();
        engine
            .commit("2025-03", PayrollType::Regular, &PersonnelScope::All, &preview.lines)
            .unwrap();

        let committed = engine
            .committed_run("2025-03", PayrollType::Regular)
            .unwrap()
            .unwrap();
        assert_eq!(committed.status, RunStatus::Committed);
        assert_eq!(committed.lines, preview.lines);
        assert_eq!(committed.totals, preview.totals);
        assert!(engine.committed_run("2025-04", PayrollType::Regular).unwrap().is_none());
    }
}
