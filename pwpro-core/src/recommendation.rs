//! Cleaning recommendation for an estimate, driven by small lookup tables.

use pwpro_schemas::estimate::{Contamination, Estimate, RecommendationResult, SurfaceType};

/// Above this, overspray containment becomes a planning item.
pub const LARGE_AREA_SQFT: f64 = 5000.0;

struct JobFacts {
    surface: SurfaceType,
    contamination: Contamination,
    sqft: f64,
}

type Predicate = fn(&JobFacts) -> bool;

// First match wins.
const SURFACE_ADVICE: &[(Predicate, &str)] = &[
    (
        |f| matches!(f.surface, SurfaceType::Vinyl | SurfaceType::Aluminum),
        "Low-pressure wash with non-ionic surfactant; avoid acidic cleaners.",
    ),
    (
        |f| matches!(f.surface, SurfaceType::Brick | SurfaceType::Stone | SurfaceType::Concrete),
        "Use medium pressure with a mixed alkaline cleaner; pre-wet nearby vegetation and protect plantings.",
    ),
    (
        |f| f.surface == SurfaceType::Wood,
        "Low pressure and wood-safe cleaner; avoid soaking and use quick rinse.",
    ),
    (|_| true, "Start with low-pressure rinse and small spot test."),
];

// First match wins; the warning travels with the treatment.
const TREATMENT_ADVICE: &[(Predicate, &str, &str)] = &[
    (
        |f| f.contamination == Contamination::Organic,
        "Treat with oxygen bleach or mildew wash for biological growth.",
        "Biocides may harm vegetation; protect plants and rinsate.",
    ),
    (
        |f| f.contamination == Contamination::Mildew,
        "Use oxygen or chlorine-based house wash depending on substrate.",
        "Avoid mixing chlorine with acids or quats.",
    ),
    (
        |f| f.contamination == Contamination::Oil,
        "Pre-treat with degreaser; consider hot-water or hot-surface methods.",
        "Oil runoff requires containment and proper disposal.",
    ),
];

// Every match applies.
const SITE_WARNINGS: &[(Predicate, &str)] = &[
    (
        |f| f.surface.is_masonry(),
        "High-pressure can damage mortar; use appropriate nozzle angles.",
    ),
    (
        |f| f.sqft > LARGE_AREA_SQFT,
        "Large area: watch for overspray and plan containment.",
    ),
];

pub fn recommend(
    surface: SurfaceType,
    contamination: Contamination,
    sqft: f64,
) -> RecommendationResult {
    let facts = JobFacts {
        surface,
        contamination,
        sqft,
    };

    let mut recommendation = String::from("Recommended: ");
    if let Some((_, sentence)) = SURFACE_ADVICE.iter().find(|(applies, _)| applies(&facts)) {
        recommendation.push_str(sentence);
    }

    let mut warnings = Vec::new();
    if let Some((_, sentence, warning)) = TREATMENT_ADVICE.iter().find(|(applies, ..)| applies(&facts)) {
        recommendation.push(' ');
        recommendation.push_str(sentence);
        warnings.push(warning.to_string());
    }
    warnings.extend(
        SITE_WARNINGS
            .iter()
            .filter(|(applies, _)| applies(&facts))
            .map(|(_, w)| w.to_string()),
    );

    RecommendationResult {
        recommendation,
        warnings,
    }
}

/// Writes the recommendation and warnings onto the estimate in place.
pub fn apply_to_estimate(estimate: &mut Estimate) {
    let result = recommend(estimate.surface, estimate.contamination, estimate.sqft);
    estimate.recommendation = result.recommendation;
    estimate.warnings = result.warnings;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_everything_gets_spot_test() {
        let result = recommend(SurfaceType::Unknown, Contamination::Unknown, 0.0);
        assert_eq!(
            result.recommendation,
            "Recommended: Start with low-pressure rinse and small spot test."
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn brick_with_oil_over_large_area_collects_all_warnings() {
        let result = recommend(SurfaceType::Brick, Contamination::Oil, 6000.0);
        assert!(result.recommendation.starts_with("Recommended: Use medium pressure"));
        assert!(result.recommendation.ends_with("hot-surface methods."));
        assert_eq!(
            result.warnings,
            vec![
                "Oil runoff requires containment and proper disposal.".to_string(),
                "High-pressure can damage mortar; use appropriate nozzle angles.".to_string(),
                "Large area: watch for overspray and plan containment.".to_string(),
            ]
        );
    }

    #[test]
    fn dirt_and_paint_add_no_treatment() {
        for contamination in [Contamination::Dirt, Contamination::Paint] {
            let result = recommend(SurfaceType::Vinyl, contamination, 1200.0);
            assert_eq!(
                result.recommendation,
                "Recommended: Low-pressure wash with non-ionic surfactant; avoid acidic cleaners."
            );
            assert!(result.warnings.is_empty());
        }
    }

    #[test]
    fn exactly_five_thousand_is_not_large() {
        let result = recommend(SurfaceType::Wood, Contamination::Unknown, LARGE_AREA_SQFT);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn apply_to_estimate_overwrites_previous_advice() {
        let mut estimate = Estimate {
            surface: SurfaceType::Stone,
            contamination: Contamination::Mildew,
            warnings: vec!["stale".to_string()],
            ..Estimate::default()
        };
        apply_to_estimate(&mut estimate);
        assert_eq!(estimate.warnings.len(), 2);
        assert_eq!(estimate.warnings[0], "Avoid mixing chlorine with acids or quats.");
        assert!(estimate.recommendation.contains("house wash"));
    }
}
