//! Payroll preview calculation.
//!
//! This module computes an unpersisted [`PayrollRun`] from a roster and a
//! concept catalog. Each worker is computed in three phases:
//!
//! 1. earnings, against the initial context;
//! 2. deductions, against a derived context that carries `TOTAL_EARNINGS`;
//! 3. employer contributions, against the same derived context.
//!
//! Within a phase concepts run in ascending `order`. Earning concepts never
//! see a running total: `TOTAL_EARNINGS` only exists once the whole
//! earnings phase has finished. Every amount is rounded to two places at
//! the point it is computed.

use std::time::Instant;

use chrono::Utc;
use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, info, info_span, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Concept, ConceptApplication, ConceptType, PayrollRun, PayrollType, Period, PersonnelScope,
    RunStatus, RunTotals, Worker, WorkerPayrollLine, round_money,
};

use super::concept::evaluate_concept;
use super::context::VariableContext;

/// Active concepts grouped by type, each group in evaluation order.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::ConceptPlan;
/// use payroll_engine::models::{CalculationRule, Concept, ConceptStatus, ConceptType};
///
/// let concept = |code: &str, order: i32, status: ConceptStatus| Concept {
///     id: code.to_lowercase(),
///     code: code.to_string(),
///     name: code.to_string(),
///     concept_type: ConceptType::Earning,
///     rule: CalculationRule::ManualVariable,
///     order,
///     status,
/// };
/// let plan = ConceptPlan::from_concepts(vec![
///     concept("B", 2, ConceptStatus::Active),
///     concept("A", 1, ConceptStatus::Active),
///     concept("OLD", 0, ConceptStatus::Inactive),
/// ]);
/// let codes: Vec<&str> = plan.earnings().iter().map(|c| c.code.as_str()).collect();
/// assert_eq!(codes, vec!["A", "B"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConceptPlan {
    earnings: Vec<Concept>,
    deductions: Vec<Concept>,
    contributions: Vec<Concept>,
}

impl ConceptPlan {
    /// Groups the active concepts by type and sorts each group by
    /// `order`, then `code` for ties. Inactive concepts are dropped.
    pub fn from_concepts<I: IntoIterator<Item = Concept>>(concepts: I) -> Self {
        let mut plan = ConceptPlan::default();
        for concept in concepts.into_iter().filter(Concept::is_active) {
            match concept.concept_type {
                ConceptType::Earning => plan.earnings.push(concept),
                ConceptType::Deduction => plan.deductions.push(concept),
                ConceptType::EmployerContribution => plan.contributions.push(concept),
            }
        }
        for group in [
            &mut plan.earnings,
            &mut plan.deductions,
            &mut plan.contributions,
        ] {
            group.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.code.cmp(&b.code)));
        }
        plan
    }

    /// Earning concepts in evaluation order.
    pub fn earnings(&self) -> &[Concept] {
        &self.earnings
    }

    /// Deduction concepts in evaluation order.
    pub fn deductions(&self) -> &[Concept] {
        &self.deductions
    }

    /// Employer contribution concepts in evaluation order.
    pub fn contributions(&self) -> &[Concept] {
        &self.contributions
    }

    /// Total number of active concepts.
    pub fn len(&self) -> usize {
        self.earnings.len() + self.deductions.len() + self.contributions.len()
    }

    /// Returns true if there is nothing to evaluate.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Evaluates one phase, appending non-zero applications, and returns the
/// rounded phase total. A concept that would push the total out of the
/// `Decimal` range counts as 0.
fn apply_phase(
    concepts: &[Concept],
    context: &VariableContext,
    applications: &mut Vec<ConceptApplication>,
) -> Decimal {
    let mut total = Decimal::ZERO;
    for concept in concepts {
        let amount = round_money(evaluate_concept(concept, context));
        if amount.is_zero() {
            continue;
        }
        total = match total.checked_add(amount) {
            Some(sum) => sum,
            None => {
                warn!(
                    concept_id = %concept.id,
                    concept_code = %concept.code,
                    amount = %amount,
                    phase_total = %total,
                    "Phase total out of range, concept counted as 0"
                );
                continue;
            }
        };
        applications.push(ConceptApplication {
            concept_id: concept.id.clone(),
            code: concept.code.clone(),
            name: concept.name.clone(),
            concept_type: concept.concept_type,
            amount,
        });
    }
    round_money(total)
}

/// Computes preview runs.
///
/// The calculator holds no state besides its configuration; every call is
/// a pure function of its inputs apart from the `computed_at` timestamp.
#[derive(Debug, Clone, Default)]
pub struct PayrollCalculator {
    config: EngineConfig,
}

impl PayrollCalculator {
    /// Creates a calculator with the given policy.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the policy in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Computes the pay breakdown of one worker.
    ///
    /// Returns `AmountOutOfRange` if the salary scaled by the payroll type's
    /// multiplier does not fit in a `Decimal`.
    pub fn compute_line(
        &self,
        worker: &Worker,
        period: Period,
        payroll_type: PayrollType,
        plan: &ConceptPlan,
    ) -> EngineResult<WorkerPayrollLine> {
        let _span = info_span!("payroll_line", worker_id = %worker.id).entered();

        let multiplier = self.config.multiplier(payroll_type);
        let basic_salary = worker
            .basic_salary
            .checked_mul(multiplier)
            .map(round_money)
            .ok_or_else(|| EngineError::AmountOutOfRange {
                message: format!(
                    "basic salary {} of worker '{}' scaled by {}",
                    worker.basic_salary, worker.id, multiplier
                ),
            })?;
        let earnings_context =
            VariableContext::for_worker(worker, basic_salary, period, &self.config.defaults);

        let mut applications = Vec::new();
        let total_earnings = apply_phase(plan.earnings(), &earnings_context, &mut applications);

        let settled_context = earnings_context.with_total_earnings(total_earnings);
        let total_deductions = apply_phase(plan.deductions(), &settled_context, &mut applications);
        let total_contributions =
            apply_phase(plan.contributions(), &settled_context, &mut applications);

        // Both totals are non-negative, so the difference cannot overflow.
        let net_pay = round_money(total_earnings - total_deductions);

        debug!(
            total_earnings = %total_earnings,
            total_deductions = %total_deductions,
            total_contributions = %total_contributions,
            net_pay = %net_pay,
            applied = applications.len(),
            "Computed payroll line"
        );

        Ok(WorkerPayrollLine {
            worker_id: worker.id.clone(),
            document_number: worker.document_number.clone(),
            full_name: worker.full_name(),
            basic_salary,
            total_earnings,
            total_deductions,
            total_contributions,
            net_pay,
            applications,
        })
    }

    /// Computes a preview run for the workers of `scope`.
    ///
    /// Inactive workers and workers outside the scope are skipped. Returns
    /// `NoEligibleWorkers` if none remain and `NoActiveConcepts` if the plan
    /// is empty, and `AmountOutOfRange` if a scaled salary or a run total
    /// leaves the `Decimal` range. Lines come back in roster order whether or
    /// not the roster was large enough to be computed in parallel.
    pub fn compute_run(
        &self,
        period: Period,
        payroll_type: PayrollType,
        scope: &PersonnelScope,
        workers: &[Worker],
        plan: &ConceptPlan,
    ) -> EngineResult<PayrollRun> {
        let start_time = Instant::now();

        let eligible: Vec<&Worker> = workers
            .iter()
            .filter(|w| w.is_active() && scope.includes(&w.personnel_group))
            .collect();
        if eligible.is_empty() {
            return Err(EngineError::NoEligibleWorkers {
                scope: scope.to_string(),
            });
        }
        if plan.is_empty() {
            return Err(EngineError::NoActiveConcepts);
        }

        let lines: Vec<WorkerPayrollLine> = if eligible.len() < self.config.parallel_threshold {
            eligible
                .iter()
                .map(|worker| self.compute_line(worker, period, payroll_type, plan))
                .collect::<EngineResult<_>>()?
        } else {
            eligible
                .par_iter()
                .map(|worker| self.compute_line(worker, period, payroll_type, plan))
                .collect::<EngineResult<_>>()?
        };

        let totals =
            RunTotals::from_lines(&lines).ok_or_else(|| EngineError::AmountOutOfRange {
                message: format!("totals of the {} {} run", period, payroll_type),
            })?;

        info!(
            period = %period,
            payroll_type = %payroll_type,
            scope = %scope,
            workers = totals.worker_count,
            concepts = plan.len(),
            total_earnings = %totals.total_earnings,
            net_pay = %totals.net_pay,
            duration_us = start_time.elapsed().as_micros() as u64,
            "Payroll preview computed"
        );

        Ok(PayrollRun {
            period,
            payroll_type,
            scope: scope.clone(),
            status: RunStatus::Preview,
            totals,
            lines,
            computed_at: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}
