//! Payroll concept model.
//!
//! A concept is a named line item (earning, deduction or employer
//! contribution) together with the rule used to compute its value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Classification of a concept, which also fixes its evaluation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptType {
    /// Added to total earnings.
    Earning,
    /// Subtracted from total earnings to obtain net pay.
    Deduction,
    /// Paid by the employer; never affects net pay.
    EmployerContribution,
}

impl ConceptType {
    /// Returns the snake_case label used in serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConceptType::Earning => "earning",
            ConceptType::Deduction => "deduction",
            ConceptType::EmployerContribution => "employer_contribution",
        }
    }
}

/// How the value of a concept is obtained.
///
/// Each variant carries only the field it needs, so a percentage concept
/// can never accidentally be read as a fixed amount.
///
/// # Example
///
/// ```
/// use payroll_engine::models::CalculationRule;
/// use rust_decimal::Decimal;
///
/// let rule: CalculationRule =
///     serde_json::from_str(r#"{"calculation_type":"percentage","percentage_rate":"13"}"#).unwrap();
/// assert_eq!(rule, CalculationRule::Percentage { percentage_rate: Some(Decimal::from(13)) });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "calculation_type", rename_all = "snake_case")]
pub enum CalculationRule {
    /// A constant amount.
    Fixed {
        /// The amount; unset means zero.
        #[serde(default)]
        fixed_value: Option<Decimal>,
    },
    /// A percentage of total earnings, or of basic salary before earnings exist.
    Percentage {
        /// The rate in percent (13 means 13%).
        #[serde(default)]
        percentage_rate: Option<Decimal>,
    },
    /// A value computed by the formula evaluator.
    FormulaDriven {
        /// The formula source, e.g. `BASIC_SALARY * 0.1`.
        formula_expression: String,
    },
    /// Entered per worker outside bulk computation; zero here.
    ManualVariable,
}

/// Whether a concept takes part in computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptStatus {
    /// Included in computations.
    #[default]
    Active,
    /// Kept for history only.
    Inactive,
}

/// A configurable payroll concept.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{CalculationRule, Concept, ConceptStatus, ConceptType};
/// use rust_decimal::Decimal;
///
/// let concept = Concept {
///     id: "c1".to_string(),
///     code: "AFP".to_string(),
///     name: "Pension fund".to_string(),
///     concept_type: ConceptType::Deduction,
///     rule: CalculationRule::Percentage { percentage_rate: Some(Decimal::from(13)) },
///     order: 1,
///     status: ConceptStatus::Active,
/// };
/// assert!(concept.is_active());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// Unique identifier.
    pub id: String,
    /// Short business code, e.g. `AFP`.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Earning, deduction or employer contribution.
    pub concept_type: ConceptType,
    /// The calculation rule, serialized flat with a `calculation_type` tag.
    #[serde(flatten)]
    pub rule: CalculationRule,
    /// Evaluation sequence within the concept type (ascending).
    #[serde(default)]
    pub order: i32,
    /// Active or inactive.
    #[serde(default)]
    pub status: ConceptStatus,
}

impl Concept {
    /// Returns true if the concept should be evaluated.
    pub fn is_active(&self) -> bool {
        self.status == ConceptStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_deserialize_fixed_concept() {
        let json = r#"{
            "id": "c_base",
            "code": "BASE",
            "name": "Basic pay",
            "concept_type": "earning",
            "calculation_type": "fixed",
            "fixed_value": "2000.00",
            "order": 1,
            "status": "active"
        }"#;

        let concept: Concept = serde_json::from_str(json).unwrap();
        assert_eq!(concept.code, "BASE");
        assert_eq!(concept.concept_type, ConceptType::Earning);
        assert_eq!(
            concept.rule,
            CalculationRule::Fixed {
                fixed_value: Some(Decimal::from_str("2000.00").unwrap())
            }
        );
        assert_eq!(concept.order, 1);
    }

    #[test]
    fn test_deserialize_formula_concept_defaults() {
        let json = r#"{
            "id": "c_ot",
            "code": "OVERTIME",
            "name": "Overtime",
            "concept_type": "earning",
            "calculation_type": "formula_driven",
            "formula_expression": "OVERTIME_HOURS * BASIC_SALARY / 240 * 1.25"
        }"#;

        let concept: Concept = serde_json::from_str(json).unwrap();
        assert_eq!(concept.order, 0);
        assert_eq!(concept.status, ConceptStatus::Active);
        assert!(matches!(
            concept.rule,
            CalculationRule::FormulaDriven { ref formula_expression }
                if formula_expression.starts_with("OVERTIME_HOURS")
        ));
    }

    #[test]
    fn test_fixed_without_value_deserializes_to_none() {
        let rule: CalculationRule = serde_json::from_str(r#"{"calculation_type":"fixed"}"#).unwrap();
        assert_eq!(rule, CalculationRule::Fixed { fixed_value: None });
    }

    #[test]
    fn test_unknown_calculation_type_is_rejected() {
        let result: Result<CalculationRule, _> =
            serde_json::from_str(r#"{"calculation_type":"script"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_concept_type_serialization() {
        assert_eq!(
            serde_json::to_string(&ConceptType::EmployerContribution).unwrap(),
            "\"employer_contribution\""
        );
        assert_eq!(ConceptType::Deduction.as_str(), "deduction");
    }

    #[test]
    fn test_inactive_concept() {
        let concept = Concept {
            id: "c1".to_string(),
            code: "OLD".to_string(),
            name: "Retired bonus".to_string(),
            concept_type: ConceptType::Earning,
            rule: CalculationRule::ManualVariable,
            order: 9,
            status: ConceptStatus::Inactive,
        };
        assert!(!concept.is_active());
    }
}
