//! Request and result shapes for the chemical dilution calculator.
//!
//! Ratios are always written `1:X`, one part chemical to `X` parts carrier, so
//! the chemical fraction of the finished mix is `1 / (1 + X)`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard ratios found on mixing valves and downstream injectors, ascending.
pub const STANDARD_RATIO_PRESETS: [f64; 6] = [5.0, 10.0, 20.0, 50.0, 100.0, 128.0];

/// Fluid ounces per US gallon.
pub const OUNCES_PER_GALLON: f64 = 128.0;

/// How the chemical gets into the water stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixMode {
    /// Premixed in a tank.
    Batch,
    /// Proportioned by a mixing valve on the manifold.
    Manifold,
    /// Drawn in by a downstream injector.
    Injector,
}

impl fmt::Display for MixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MixMode::Batch => "Batch Mix",
            MixMode::Manifold => "Manifold Valve",
            MixMode::Injector => "Downstream Injector",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DilutionRequest {
    BatchMix {
        tank_volume: f64,
        desired_percent: f64,
    },
    ManifoldOrInjector {
        mode: MixMode,
        total_volume: f64,
        ratio_denominator: f64,
        desired_percent: Option<f64>,
    },
}

impl DilutionRequest {
    pub fn mode(&self) -> MixMode {
        match self {
            DilutionRequest::BatchMix { .. } => MixMode::Batch,
            DilutionRequest::ManifoldOrInjector { mode, .. } => *mode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchMixResult {
    pub chemical_volume: f64,
    pub water_volume: f64,
    pub achieved_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioMixResult {
    pub chemical_volume: f64,
    pub achieved_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_preset: Option<f64>,
}

/// Unified result over both request variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DilutionResult {
    pub mode: MixMode,
    pub chemical_volume: f64,
    /// Informational: `chemical_volume` expressed in fluid ounces.
    pub chemical_ounces: f64,
    /// Only populated for batch mixes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_volume: Option<f64>,
    pub achieved_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_preset: Option<f64>,
}
