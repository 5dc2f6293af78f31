//! Rough surface and contamination guesses from a photo's average color.
//!
//! Image decoding and averaging happen elsewhere; this module only maps an
//! average RGB value onto suggestions through an ordered rule table.

use pwpro_schemas::estimate::{Contamination, Estimate, SurfaceType};
use serde::Serialize;

/// Upper bound on the pixel-area square footage guess.
pub const MAX_SQFT_ESTIMATE: f64 = 20_000.0;

/// Average color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl AverageColor {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// From an 8-bit RGBA pixel; alpha is ignored.
    pub fn from_rgba8(pixel: [u8; 4]) -> Self {
        Self::new(
            f64::from(pixel[0]) / 255.0,
            f64::from(pixel[1]) / 255.0,
            f64::from(pixel[2]) / 255.0,
        )
    }

    fn brightness(&self) -> f64 {
        (self.r + self.g + self.b) / 3.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceFindings {
    pub surfaces: Vec<SurfaceType>,
    pub objects: Vec<String>,
    pub sqft_estimate: Option<f64>,
}

struct ColorRule {
    applies: fn(&AverageColor) -> bool,
    surfaces: &'static [SurfaceType],
    objects: &'static [&'static str],
}

// Every matching row contributes.
const COLOR_RULES: &[ColorRule] = &[
    ColorRule {
        applies: |c| c.g > c.r * 1.15 && c.g > c.b * 1.15,
        surfaces: &[SurfaceType::Vinyl],
        objects: &["Vegetation"],
    },
    ColorRule {
        applies: |c| c.r > 0.35 && c.g > 0.18 && c.b < 0.25 && c.r > c.g && c.r > c.b,
        surfaces: &[SurfaceType::Brick],
        objects: &[],
    },
    ColorRule {
        applies: |c| (c.r - c.g).abs() < 0.05 && (c.g - c.b).abs() < 0.05,
        surfaces: &[SurfaceType::Aluminum, SurfaceType::Vinyl],
        objects: &[],
    },
    ColorRule {
        applies: |c| c.brightness() < 0.4,
        surfaces: &[],
        objects: &["Organic Growth / Mildew"],
    },
];

pub fn analyze_color(color: AverageColor, dimensions: Option<(u32, u32)>) -> SurfaceFindings {
    let mut surfaces: Vec<SurfaceType> = Vec::new();
    let mut objects: Vec<String> = Vec::new();

    for rule in COLOR_RULES.iter().filter(|r| (r.applies)(&color)) {
        for surface in rule.surfaces {
            if !surfaces.contains(surface) {
                surfaces.push(*surface);
            }
        }
        for object in rule.objects {
            if !objects.iter().any(|o| o == object) {
                objects.push(object.to_string());
            }
        }
    }

    let sqft_estimate = dimensions.map(|(w, h)| {
        let pixel_area = f64::from(w) * f64::from(h);
        (pixel_area / 1000.0).clamp(0.0, MAX_SQFT_ESTIMATE)
    });

    SurfaceFindings {
        surfaces,
        objects,
        sqft_estimate,
    }
}

/// Seeds an estimate's surface, contamination and size from the findings.
pub fn apply_findings(estimate: &mut Estimate, findings: &SurfaceFindings) {
    if let Some(first) = findings.surfaces.first() {
        estimate.surface = *first;
    }
    if let Some(first) = findings.objects.first() {
        let object = first.to_lowercase();
        if object.contains("mildew") || object.contains("organic") {
            estimate.contamination = Contamination::Mildew;
        } else if object.contains("vegetation") {
            estimate.contamination = Contamination::Organic;
        }
    }
    if let Some(sqft) = findings.sqft_estimate {
        estimate.sqft = sqft;
    }
}
