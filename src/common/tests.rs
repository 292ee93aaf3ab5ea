use super::math::{
    clamp_or_bound, exp_smooth, extend_linear, floor_g_load, kmh_to_ms, loading_factor,
    ms_to_kmh, round_index, steps_between, MIN_G_LOAD,
};
use rand::Rng;

#[test]
fn test_loading_factor() {
    assert!((loading_factor(0.0) - 1.0).abs() < f32::EPSILON);
    assert!((loading_factor(50.0) - 1.5_f32.sqrt()).abs() < 1e-6);
    assert!(loading_factor(-500.0).is_finite());
    assert!(loading_factor(-500.0) > 0.0);
}

#[test]
fn test_floor_g_load() {
    assert!((floor_g_load(1.0) - 1.0).abs() < f32::EPSILON);
    assert!((floor_g_load(-2.0) - MIN_G_LOAD).abs() < f32::EPSILON);
    assert!((floor_g_load(f32::NAN) - MIN_G_LOAD).abs() < f32::EPSILON);
}

#[test]
fn test_clamp_or_bound() {
    assert!((clamp_or_bound(f32::NAN, 80.0, 250.0) - 80.0).abs() < f32::EPSILON);
    assert!((clamp_or_bound(f32::INFINITY, 80.0, 250.0) - 250.0).abs() < f32::EPSILON);
    assert!((clamp_or_bound(40.0, 80.0, 250.0) - 80.0).abs() < f32::EPSILON);
    assert!((clamp_or_bound(300.0, 80.0, 250.0) - 250.0).abs() < f32::EPSILON);
    assert!((clamp_or_bound(120.0, 80.0, 250.0) - 120.0).abs() < f32::EPSILON);
}

#[test]
fn test_round_index() {
    assert_eq!(round_index(0.4, 0), None);
    assert_eq!(round_index(-0.8, 3), Some(0));
    assert_eq!(round_index(1.49, 3), Some(1));
    assert_eq!(round_index(1.5, 3), Some(2));
    assert_eq!(round_index(7.2, 3), Some(2));
    assert_eq!(round_index(f32::NAN, 3), Some(0));
}

#[test]
fn test_linear_helpers_invert() {
    let mut rng = rand::rng();
    for _ in 0..100 {
        let base = rng.random_range(50.0..200.0_f32);
        let delta = rng.random_range(-60.0..-1.0_f32);
        let offset = rng.random_range(-1.0..2.0_f32);
        let value = extend_linear(base, offset, delta);
        assert!((steps_between(base, value, delta) - offset).abs() < 1e-3);
    }
    assert!(steps_between(1.0, 5.0, 0.0).abs() < f32::EPSILON);
}

#[test]
fn test_unit_conversion_and_smoothing() {
    assert!((kmh_to_ms(36.0) - 10.0).abs() < 1e-5);
    assert!((ms_to_kmh(10.0) - 36.0).abs() < 1e-5);
    assert!((exp_smooth(1.0, 2.0, 0.5) - 1.5).abs() < f32::EPSILON);
}
