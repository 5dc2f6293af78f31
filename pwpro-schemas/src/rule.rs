use crate::weather::{SafetyStatus, WorkCategory};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    LessThan,
    GreaterThan,
    AtLeast,
    AtMost,
    EqualTo,
    NotEqualTo,
}

impl ComparisonOperator {
    pub fn compare(&self, current: f64, threshold: f64) -> bool {
        match self {
            ComparisonOperator::LessThan => current < threshold,
            ComparisonOperator::GreaterThan => current > threshold,
            ComparisonOperator::AtLeast => current >= threshold,
            ComparisonOperator::AtMost => current <= threshold,
            ComparisonOperator::EqualTo => (current - threshold).abs() < f64::EPSILON,
            ComparisonOperator::NotEqualTo => (current - threshold).abs() >= f64::EPSILON,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Wind {
        operator: ComparisonOperator,
        mph: f64,
    },
    Temperature {
        operator: ComparisonOperator,
        fahrenheit: f64,
    },
    /// Never matches when the snapshot carries no rain forecast.
    RainChance {
        operator: ComparisonOperator,
        percent: f64,
    },
    AnyOf {
        conditions: Vec<Condition>,
    },
    AllOf {
        conditions: Vec<Condition>,
    },
}

/// One row of the weather advisory table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRule {
    pub name: String,
    /// `None` applies the rule to every category.
    #[serde(default)]
    pub category: Option<WorkCategory>,
    pub condition: Condition,
    pub status: SafetyStatus,
    /// May contain `{wind}` and `{temp}` placeholders.
    pub message: String,
}
