use super::{fit_polar, mass, GliderPolar, PolarModel, PolarPoint, PolarPoints};
use crate::setup::{AdvisorTuning, MemorySetupStore, SetupStore, SetupValues};
use rand::Rng;
use std::sync::Arc;

fn assert_close(actual: f32, expected: f32, rel_tol: f32) {
    let tol = expected.abs() * rel_tol;
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected} ± {tol}, got {actual}"
    );
}

fn init_model(values: SetupValues) -> (Arc<MemorySetupStore>, PolarModel) {
    let store = Arc::new(MemorySetupStore::new(values));
    let dyn_store: Arc<dyn SetupStore> = store.clone();
    let mut model = PolarModel::new(dyn_store, AdvisorTuning::default());
    model.begin();
    (store, model)
}

#[test]
fn test_fit_reference_polar() {
    let c = fit_polar(80.0, -0.6, 120.0, -0.8, 160.0, -1.6, 0.0, 0.0);
    assert_close(c.a2(), -0.00243, 0.01);
    assert_close(c.a1(), 0.117, 0.01);
    assert_close(c.a0(), -2.00, 0.01);
    assert!(c.is_valid());
}

#[test]
fn test_reference_polar_derived_speeds() {
    let (store, model) = init_model(SetupValues::default());
    assert!(model.ballast_pct().abs() < 1e-3, "reference mass should give 0% ballast");
    assert!((store.empty_weight() - 266.5).abs() < 1e-3);
    assert!(model.is_valid());
    assert_close(model.min_sink_speed(), 86.7, 0.01);
    assert_close(model.min_sink(), -0.59, 0.01);
    assert_close(model.circling_speed(), 104.0, 0.01);
    assert_close(model.circling_sink(), -0.65, 0.01);
    assert_close(model.stall_speed_ms() * 3.6, 70.0, 0.001);
}

#[test]
fn test_flat_polar_is_invalid() {
    let values = SetupValues {
        polar_points: PolarPoints::new([
            PolarPoint::new(80.0, -0.7),
            PolarPoint::new(120.0, -0.7),
            PolarPoint::new(160.0, -0.7),
        ]),
        ..SetupValues::default()
    };
    let (_, model) = init_model(values);
    assert!(model.coefficients().a2() == 0.0);
    assert!(!model.is_valid());
    for v in [0.0, 60.0, 100.0, 180.0, 250.0] {
        assert!(model.sink(v) == 0.0);
    }
    assert!(model.min_sink_speed() == 0.0);
    assert!(model.circling_speed() == 0.0);
}

#[test]
fn test_equal_speeds_do_not_panic() {
    let c = fit_polar(100.0, -0.7, 100.0, -0.8, 100.0, -0.9, 0.0, 0.0);
    assert!(!c.is_valid());
    assert!(c.a0().is_finite() && c.a1().is_finite() && c.a2().is_finite());
}

#[test]
fn test_sink_below_stall_margin_is_zero() {
    let (_, model) = init_model(SetupValues::default());
    let margin = model.stall_speed_ms() * 3.6 * 0.9;
    assert!(model.sink(margin - 0.5) == 0.0);
    assert!(model.sink(margin + 0.5) < 0.0);
}

#[test]
fn test_ballast_and_bugs_correction() {
    let clean = fit_polar(80.0, -0.6, 120.0, -0.8, 160.0, -1.6, 0.0, 0.0);
    let heavy = fit_polar(80.0, -0.6, 120.0, -0.8, 160.0, -1.6, 50.0, 0.0);
    let lf = 1.5_f32.sqrt();
    assert_close(heavy.a0(), clean.a0() * lf, 1e-4);
    assert_close(heavy.a1(), clean.a1(), 1e-4);
    assert_close(heavy.a2(), clean.a2() / lf, 1e-4);
    // heavier glider: minimum sink moves to a higher speed
    assert!(heavy.vertex_speed() > clean.vertex_speed());

    let buggy = fit_polar(80.0, -0.6, 120.0, -0.8, 160.0, -1.6, 0.0, 10.0);
    assert_close(buggy.a0(), clean.a0() * 1.1, 1e-4);
    assert_close(buggy.a1(), clean.a1() * 1.1, 1e-4);
    assert_close(buggy.a2(), clean.a2() * 1.1, 1e-4);
}

#[test]
fn test_change_ballast_from_water() {
    let (store, mut model) = init_model(SetupValues::default());
    // reference mass is 346.5 kg, half of it again in water
    store.set_ballast_kg(173.25);
    model.change_ballast();
    assert_close(model.ballast_pct(), 50.0, 1e-4);
    assert_close(store.ballast_pct(), 50.0, 1e-4);
    assert_close(store.gross_weight(), 519.75, 1e-4);
    assert!(model.min_sink_speed() > 86.7 * 1.2);
    assert_close(model.stall_speed_ms() * 3.6, 70.0 * 1.5_f32.powf(0.25), 1e-4);
}

#[test]
fn test_speed_to_fly_modes_and_clamps() {
    let (_, model) = init_model(SetupValues::default());
    let v_max = 270.0;
    assert!((model.speed_to_fly(0.0, true, 2.0, false, v_max) - model.circling_speed()).abs() < 1e-4);

    // mc 1.0: sqrt((a0 - 1) / a2) = sqrt(-3 / -0.00243) m/s
    let block = model.speed_to_fly(5.0, false, 1.0, true, v_max);
    assert_close(block, 126.5, 0.01);
    let still_air = model.speed_to_fly(0.0, false, 1.0, false, v_max);
    assert!((block - still_air).abs() < 1e-3);
    let sinking_air = model.speed_to_fly(-2.0, false, 1.0, false, v_max);
    assert!(sinking_air > still_air);

    // strong lift puts the root argument negative
    let lift = model.speed_to_fly(6.0, false, 0.0, false, v_max);
    assert!((lift - model.min_sink_speed()).abs() < 1e-4);
    let huge_sink = model.speed_to_fly(-40.0, false, 5.0, false, v_max);
    assert!((huge_sink - v_max).abs() < 1e-4);
}

#[test]
fn test_speed_to_fly_never_leaves_bounds() {
    let (_, model) = init_model(SetupValues::default());
    let mut rng = rand::rng();
    for _ in 0..500 {
        let netto = rng.random_range(-10.0..10.0_f32);
        let mc = rng.random_range(0.0..5.0_f32);
        let stf = model.speed_to_fly(netto, false, mc, rng.random_bool(0.5), 270.0);
        assert!(stf.is_finite());
        assert!(stf >= model.min_sink_speed() && stf <= 270.0);
    }
}

#[test]
fn test_g_load_floor_and_sink_scaling() {
    let (_, mut model) = init_model(SetupValues::default());
    model.set_g_load(-1.0);
    assert!((model.current_g_load() - 0.3).abs() < f32::EPSILON);
    model.set_g_load(1.0);
    let level = model.sink(120.0);
    model.set_g_load(2.0);
    let pulled = model.sink(120.0);
    assert!(pulled < level, "more load must sink faster");
    assert!((model.vn(30.0) - 30.0 * 2.0_f32.sqrt()).abs() < 1e-4);
    model.set_g_load(1.0);
    assert!((model.vn(1.0) - model.stall_speed_ms()).abs() < 1e-6);
    assert!(model.cw(10.0) == 0.0);
    assert!((model.cw(30.0) - model.sink(108.0) / 30.0).abs() < 1e-6);
}

#[test]
fn test_set_polar_and_compare() {
    let (store, mut model) = init_model(SetupValues::default());
    let polar = GliderPolar {
        points: PolarPoints::new([
            PolarPoint::new(90.0, -0.62),
            PolarPoint::new(130.0, -0.85),
            PolarPoint::new(180.0, -1.75),
        ]),
        wingload: 40.0,
        max_ballast: 150.0,
        wingarea: 10.0,
    };
    assert!(!model.is_polar_equal_to(&polar));
    model.set_polar(&polar);
    assert!(model.is_polar_equal_to(&polar));
    assert!((store.empty_weight() - 320.0).abs() < 1e-3);
    assert_close(store.stall_speed() / 3.6, mass::estimate_stall_speed(40.0), 1e-5);
    assert!(model.is_valid());
}

#[test]
fn test_mass_helpers() {
    assert!(mass::overweight_pct(400.0, 0.0, 10.0) == 0.0);
    assert_close(mass::overweight_pct(400.0, 32.0, 10.0), 25.0, 1e-5);
    assert_close(mass::estimate_stall_speed(33.0), 20.4, 0.01);
    assert!(mass::effective_max_ballast(0.0) == mass::DEFAULT_MAX_BALLAST);
    assert!(mass::effective_max_ballast(180.0) == 180.0);
}
