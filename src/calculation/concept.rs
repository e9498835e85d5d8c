//! Concept evaluation.
//!
//! Resolves the value of one concept for one worker by dispatching on the
//! concept's [`CalculationRule`]. Evaluation never fails from the caller's
//! point of view: a rule that cannot be computed is logged and counts as 0.

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{CalculationRule, Concept};

use super::context::{BASIC_SALARY, TOTAL_EARNINGS, VariableContext};
use super::formula::{self, FormulaError};

fn fixed_value(fixed_value: Option<Decimal>) -> Decimal {
    fixed_value.unwrap_or(Decimal::ZERO)
}

/// Percentage of `TOTAL_EARNINGS` when it is positive, else of `BASIC_SALARY`.
fn percentage_value(
    percentage_rate: Option<Decimal>,
    context: &VariableContext,
) -> Result<Decimal, FormulaError> {
    let rate = percentage_rate.unwrap_or(Decimal::ZERO);
    let base = match context.get(TOTAL_EARNINGS) {
        Some(total) if total > Decimal::ZERO => total,
        _ => context.get(BASIC_SALARY).unwrap_or(Decimal::ZERO),
    };
    base.checked_mul(rate)
        .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(FormulaError::Overflow)
}

fn formula_value(expression: &str, context: &VariableContext) -> Result<Decimal, FormulaError> {
    formula::try_evaluate(expression, context)
}

/// Manual concepts are filled in outside bulk computation.
fn manual_value() -> Decimal {
    Decimal::ZERO
}

/// Evaluates a concept, reporting why a formula-driven rule failed.
///
/// The raw value is returned: no clamping and no rounding.
pub fn try_evaluate_concept(
    concept: &Concept,
    context: &VariableContext,
) -> Result<Decimal, FormulaError> {
    match &concept.rule {
        CalculationRule::Fixed { fixed_value: value } => Ok(fixed_value(*value)),
        CalculationRule::Percentage { percentage_rate } => {
            percentage_value(*percentage_rate, context)
        }
        CalculationRule::FormulaDriven { formula_expression } => {
            formula_value(formula_expression, context)
        }
        CalculationRule::ManualVariable => Ok(manual_value()),
    }
}

/// Evaluates a concept and never fails.
///
/// Failures are logged at `warn` and yield 0; negative values are clamped
/// to 0.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{VariableContext, evaluate_concept};
/// use payroll_engine::models::{CalculationRule, Concept, ConceptStatus, ConceptType};
/// use rust_decimal::Decimal;
///
/// let afp = Concept {
///     id: "c_101".to_string(),
///     code: "AFP".to_string(),
///     name: "Pension fund".to_string(),
///     concept_type: ConceptType::Deduction,
///     rule: CalculationRule::Percentage { percentage_rate: Some(Decimal::from(10)) },
///     order: 1,
///     status: ConceptStatus::Active,
/// };
/// let context = VariableContext::from_pairs([("BASIC_SALARY", Decimal::from(1000))]);
/// assert_eq!(evaluate_concept(&afp, &context), Decimal::from(100));
/// ```
pub fn evaluate_concept(concept: &Concept, context: &VariableContext) -> Decimal {
    match try_evaluate_concept(concept, context) {
        Ok(value) if value.is_sign_negative() => Decimal::ZERO,
        Ok(value) => value,
        Err(error) => {
            warn!(
                concept_id = %concept.id,
                concept_code = %concept.code,
                error = %error,
                "Concept evaluation failed, using 0"
            );
            Decimal::ZERO
        }
    }
}
