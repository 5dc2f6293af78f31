//! Chemical dilution math for batch tanks, mixing valves and injectors.
//!
//! Every function here is total: negative, zero or non-finite inputs are
//! clamped and produce a zeroed (or field-omitted) result instead of an error.

use log::{debug, warn};
use pwpro_schemas::dilution::{
    BatchMixResult, DilutionRequest, DilutionResult, MixMode, RatioMixResult, OUNCES_PER_GALLON,
    STANDARD_RATIO_PRESETS,
};

/// Tank premix: how much concentrate and water for `desired_percent` strength.
///
/// `desired_percent` is clamped into `[0, 100]`; a negative or non-finite tank
/// volume is treated as an empty tank.
pub fn compute_batch_mix(tank_volume: f64, desired_percent: f64) -> BatchMixResult {
    let tank_volume = non_negative(tank_volume, "tank_volume");
    let fraction = non_negative(desired_percent, "desired_percent").min(100.0) / 100.0;

    let chemical_volume = tank_volume * fraction;
    let result = BatchMixResult {
        chemical_volume,
        water_volume: (tank_volume - chemical_volume).max(0.0),
        achieved_percent: fraction * 100.0,
    };
    debug!(
        "batch mix: {} gal @ {}% -> {:?}",
        tank_volume, result.achieved_percent, result
    );
    result
}

/// Proportioned mix at `1:ratio_denominator` over `total_volume` of output.
///
/// When a positive `desired_percent` is given, also reports the ratio that
/// would hit it and the closest standard preset. An unusable ratio
/// (non-finite or `<= 0`) zeroes the chemical volume and achieved percent; the
/// suggestion fields depend only on `desired_percent` and are still filled.
pub fn compute_ratio_mix(
    total_volume: f64,
    ratio_denominator: f64,
    desired_percent: Option<f64>,
) -> RatioMixResult {
    compute_ratio_mix_with_presets(
        total_volume,
        ratio_denominator,
        desired_percent,
        &STANDARD_RATIO_PRESETS,
    )
}

/// Same as [`compute_ratio_mix`], snapping suggestions to a custom preset list.
pub fn compute_ratio_mix_with_presets(
    total_volume: f64,
    ratio_denominator: f64,
    desired_percent: Option<f64>,
    presets: &[f64],
) -> RatioMixResult {
    let total_volume = non_negative(total_volume, "total_volume");

    let fraction = if ratio_denominator.is_finite() && ratio_denominator > 0.0 {
        1.0 / (1.0 + ratio_denominator)
    } else {
        warn!("ratio mix: unusable ratio 1:{}, reporting zero chemical", ratio_denominator);
        0.0
    };

    let suggested_ratio = desired_percent
        .filter(|p| p.is_finite() && *p > 0.0)
        .map(required_ratio);
    let nearest_preset = suggested_ratio.and_then(|r| nearest_preset_in(r, presets));

    let result = RatioMixResult {
        chemical_volume: total_volume * fraction,
        achieved_percent: fraction * 100.0,
        suggested_ratio,
        nearest_preset,
    };
    debug!(
        "ratio mix: {} gal @ 1:{} (desired {:?}) -> {:?}",
        total_volume, ratio_denominator, desired_percent, result
    );
    result
}

/// The `X` in `1:X` that yields `desired_percent`, never below zero.
///
/// Saturates at `f64::MAX` when a tiny percent overflows the division.
pub fn required_ratio(desired_percent: f64) -> f64 {
    (100.0 / desired_percent - 1.0).clamp(0.0, f64::MAX)
}

/// Nearest standard preset to `target`; see [`nearest_preset_in`].
pub fn nearest_preset(target: f64) -> Option<f64> {
    nearest_preset_in(target, &STANDARD_RATIO_PRESETS)
}

/// The preset closest to `target` by absolute difference.
///
/// Presets are scanned in the order given and only a strictly smaller
/// difference replaces the current best, so on an exact tie the earlier (for an
/// ascending list, the lower) preset wins. Empty lists and non-finite targets
/// have no answer.
pub fn nearest_preset_in(target: f64, presets: &[f64]) -> Option<f64> {
    if !target.is_finite() {
        return None;
    }
    let (first, rest) = presets.split_first()?;
    // At huge targets every difference rounds to the same value.
    let largest = rest.iter().copied().fold(*first, f64::max);
    if target >= largest {
        return Some(largest);
    }
    let mut best = *first;
    let mut best_diff = (target - best).abs();
    for &preset in rest {
        let diff = (target - preset).abs();
        if diff < best_diff {
            best = preset;
            best_diff = diff;
        }
    }
    Some(best)
}

/// Dispatches a [`DilutionRequest`] using the standard presets.
pub fn compute(request: &DilutionRequest) -> DilutionResult {
    compute_with_presets(request, &STANDARD_RATIO_PRESETS)
}

pub fn compute_with_presets(request: &DilutionRequest, presets: &[f64]) -> DilutionResult {
    match *request {
        DilutionRequest::BatchMix {
            tank_volume,
            desired_percent,
        } => {
            let mix = compute_batch_mix(tank_volume, desired_percent);
            DilutionResult {
                mode: MixMode::Batch,
                chemical_volume: mix.chemical_volume,
                chemical_ounces: mix.chemical_volume * OUNCES_PER_GALLON,
                water_volume: Some(mix.water_volume),
                achieved_percent: mix.achieved_percent,
                suggested_ratio: None,
                nearest_preset: None,
            }
        }
        DilutionRequest::ManifoldOrInjector {
            mode,
            total_volume,
            ratio_denominator,
            desired_percent,
        } => {
            let mix = compute_ratio_mix_with_presets(
                total_volume,
                ratio_denominator,
                desired_percent,
                presets,
            );
            DilutionResult {
                mode,
                chemical_volume: mix.chemical_volume,
                chemical_ounces: mix.chemical_volume * OUNCES_PER_GALLON,
                water_volume: None,
                achieved_percent: mix.achieved_percent,
                suggested_ratio: mix.suggested_ratio,
                nearest_preset: mix.nearest_preset,
            }
        }
    }
}

fn non_negative(value: f64, name: &str) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!("dilution: {} = {} clamped to 0", name, value);
        0.0
    }
}
