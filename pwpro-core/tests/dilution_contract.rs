use pwpro_core::{compute, compute_batch_mix, compute_ratio_mix, dilution::compute_with_presets};
use pwpro_schemas::dilution::{DilutionRequest, MixMode};

#[test]
fn documented_examples_hold() {
    let batch = compute_batch_mix(50.0, 2.0);
    assert!((batch.chemical_volume - 1.0).abs() < 1e-9);
    assert!((batch.water_volume - 49.0).abs() < 1e-9);
    assert!((batch.achieved_percent - 2.0).abs() < 1e-9);

    let ratio = compute_ratio_mix(100.0, 20.0, None);
    assert!((ratio.chemical_volume - 4.7619).abs() < 1e-4);
    assert!((ratio.achieved_percent - 4.7619).abs() < 1e-4);

    let suggestion = compute_ratio_mix(100.0, 128.0, Some(2.0));
    assert_eq!(suggestion.suggested_ratio, Some(49.0));
    assert_eq!(suggestion.nearest_preset, Some(50.0));
}

#[test]
fn batch_mix_components_always_add_up() {
    for (tank, percent) in [(0.0, 5.0), (12.5, 0.5), (300.0, 12.0), (55.0, 100.0)] {
        let mix = compute_batch_mix(tank, percent);
        assert!((mix.chemical_volume + mix.water_volume - tank).abs() < 1e-9);
        assert!((0.0..=100.0).contains(&mix.achieved_percent));
    }
}

#[test]
fn manifold_and_injector_differ_only_in_label() {
    let request = |mode| DilutionRequest::ManifoldOrInjector {
        mode,
        total_volume: 80.0,
        ratio_denominator: 50.0,
        desired_percent: Some(1.0),
    };
    let manifold = compute(&request(MixMode::Manifold));
    let injector = compute(&request(MixMode::Injector));
    assert_eq!(manifold.chemical_volume, injector.chemical_volume);
    assert_eq!(manifold.nearest_preset, Some(100.0));
    assert_eq!(manifold.suggested_ratio, Some(99.0));
    assert_eq!(injector.mode, MixMode::Injector);
}

#[test]
fn custom_presets_are_respected() {
    let request = DilutionRequest::ManifoldOrInjector {
        mode: MixMode::Manifold,
        total_volume: 10.0,
        ratio_denominator: 4.0,
        desired_percent: Some(20.0),
    };
    let result = compute_with_presets(&request, &[3.0, 6.0]);
    assert_eq!(result.suggested_ratio, Some(4.0));
    assert_eq!(result.nearest_preset, Some(3.0));
    assert!((result.achieved_percent - 20.0).abs() < 1e-9);

    let none = compute_with_presets(&request, &[]);
    assert_eq!(none.nearest_preset, None);
}

#[test]
fn requests_deserialize_from_tagged_json() {
    let request: DilutionRequest = serde_json::from_str(
        r#"{"type":"batch_mix","tank_volume":50.0,"desired_percent":2.0}"#,
    )
    .unwrap();
    assert_eq!(request.mode(), MixMode::Batch);
    let result = compute(&request);
    assert_eq!(result.water_volume.map(|w| (w - 49.0).abs() < 1e-9), Some(true));
}
