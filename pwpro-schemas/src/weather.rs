use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_f: f64,
    pub wind_speed_mph: f64,
    pub rain_chance_percent: Option<f64>,
    pub description: Option<String>,
}

/// Coarse kind of work, derived from a job's scope text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkCategory {
    Roof,
    Siding,
    Concrete,
    General,
}

impl WorkCategory {
    /// Classifies free-text scope; the first keyword group that matches wins.
    pub fn from_scope(scope: &str) -> Self {
        let scope = scope.to_lowercase();
        if scope.contains("roof") {
            WorkCategory::Roof
        } else if scope.contains("siding") || scope.contains("house") {
            WorkCategory::Siding
        } else if ["concrete", "driveway", "patio"].iter().any(|k| scope.contains(k)) {
            WorkCategory::Concrete
        } else {
            WorkCategory::General
        }
    }
}

impl fmt::Display for WorkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkCategory::Roof => "roof",
            WorkCategory::Siding => "siding",
            WorkCategory::Concrete => "concrete",
            WorkCategory::General => "general",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyStatus {
    Optimal,
    Suboptimal,
    Dangerous,
}

impl fmt::Display for SafetyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SafetyStatus::Optimal => "OPTIMAL",
            SafetyStatus::Suboptimal => "SUBOPTIMAL",
            SafetyStatus::Dangerous => "DANGEROUS",
        };
        f.write_str(label)
    }
}

/// Go/no-go advice for one job under one weather snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub category: WorkCategory,
    pub status: SafetyStatus,
    pub recommended: bool,
    pub message: String,
    /// Name of the rule that fired, if any.
    pub rule: Option<String>,
}
