use super::{AdvisorContext, AdvisoryOutputs, ConfigEvent, SensorFeed, SensorSample, Supervisor};
use crate::flap::{FlapLabel, FlapLevel, FlapTableError, LevelEdit};
use crate::polar::{GliderPolar, PolarPoint, PolarPoints};
use crate::setup::{AdvisorTuning, MemorySetupStore, SetupStore, SetupValues};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Replays a fixed list of samples, then closes.
struct ReplayFeed {
    samples: Mutex<VecDeque<SensorSample>>,
}

impl ReplayFeed {
    fn new(samples: impl IntoIterator<Item = SensorSample>) -> Self {
        Self { samples: Mutex::new(samples.into_iter().collect()) }
    }
}

#[async_trait]
impl SensorFeed for ReplayFeed {
    async fn sample(&self) -> Option<SensorSample> { self.samples.lock().await.pop_front() }
}

fn slot(speed: f32, label: &str, sensor: i32) -> crate::setup::FlapSlot {
    FlapLevel::new(speed, FlapLabel::new(label), sensor).to_slot()
}

fn init_context(sensor_enabled: bool) -> (Arc<MemorySetupStore>, AdvisorContext) {
    let mut values = SetupValues {
        flaps_defined: true,
        flap_sensor_enabled: sensor_enabled,
        ..SetupValues::default()
    };
    values.flap_slots[0] = slot(180.0, "-1", 100);
    values.flap_slots[1] = slot(120.0, "0", 300);
    values.flap_slots[2] = slot(80.0, "+1", 500);
    let store = Arc::new(MemorySetupStore::new(values));
    let dyn_store: Arc<dyn SetupStore> = store.clone();
    let context = AdvisorContext::new(dyn_store, AdvisorTuning::default(), None);
    (store, context)
}

fn cruise_sample() -> SensorSample {
    SensorSample { airspeed_kmh: 150.0, accel_z: 1.0, netto_vario: 0.0, ..SensorSample::default() }
}

#[tokio::test]
async fn test_context_startup() {
    let (store, context) = init_context(false);
    // default reference mass 33 * 10.5, empty weight derived from it
    assert!((store.empty_weight() - 266.5).abs() < 1e-3);
    assert!(store.ballast_pct().abs() < 1e-3);
    assert!(context.polar().read().await.is_valid());
    assert_eq!(context.flaps().read().await.len(), 3);
}

#[tokio::test]
async fn test_ballast_event_updates_both_models() {
    let (store, context) = init_context(false);
    let before = context.flaps().read().await.prepared().level(0).unwrap().prepared_speed();
    context.apply(ConfigEvent::Ballast { kg: 173.25 }).await.unwrap();

    assert!((store.ballast_pct() - 50.0).abs() < 1e-3);
    assert!((context.polar().read().await.ballast_pct() - 50.0).abs() < 1e-3);
    let after = context.flaps().read().await.prepared().level(0).unwrap().prepared_speed();
    assert!((after - before * 1.5_f32.sqrt()).abs() < 1e-3);
}

#[tokio::test]
async fn test_mc_and_bugs_events() {
    let (store, context) = init_context(false);
    let sample = cruise_sample();
    let (supervisor, _rx) = Supervisor::new(context.clone());
    let slow = supervisor.tick(sample).await.speed_to_fly;

    context.apply(ConfigEvent::Mc { value: 2.0 }).await.unwrap();
    assert!((store.mc() - 2.0).abs() < f32::EPSILON);
    let fast = supervisor.tick(sample).await.speed_to_fly;
    assert!(fast > slow);

    let clean_sink = supervisor.tick(sample).await.sink;
    context.apply(ConfigEvent::Bugs { pct: 20.0 }).await.unwrap();
    let bugged_sink = supervisor.tick(sample).await.sink;
    assert!(bugged_sink < clean_sink);
}

#[tokio::test]
async fn test_polar_event_replaces_polar() {
    let (store, context) = init_context(false);
    let polar = GliderPolar {
        points: PolarPoints::new([
            PolarPoint::new(90.0, -0.55),
            PolarPoint::new(130.0, -0.85),
            PolarPoint::new(180.0, -1.7),
        ]),
        wingload: 40.0,
        max_ballast: 150.0,
        wingarea: 11.0,
    };
    context.apply(ConfigEvent::Polar(polar)).await.unwrap();
    let polar_lock = context.polar();
    let model = polar_lock.read().await;
    assert!(model.is_polar_equal_to(&polar));
    assert!(model.is_valid());
    assert!((store.empty_weight() - (40.0 * 11.0 - 80.0)).abs() < 1e-3);
    assert!(store.ballast_pct().abs() < 1e-3);
}

#[tokio::test]
async fn test_rejected_flap_events() {
    let (store, context) = init_context(false);
    let duplicate = FlapLevel::new(120.0, FlapLabel::new("x"), 900);
    assert_eq!(
        context.apply(ConfigEvent::AddLevel(duplicate)).await,
        Err(FlapTableError::DuplicateSpeed(120.0))
    );
    assert_eq!(
        context.apply(ConfigEvent::RemoveLevel(5)).await,
        Err(FlapTableError::IndexOutOfRange(5))
    );
    assert_eq!(context.flaps().read().await.len(), 3);
    assert!(!store.flap_slot(3).unwrap().is_used());
}

#[tokio::test]
async fn test_config_hub_applies_in_order() {
    let (store, context) = init_context(false);
    let (supervisor, _rx) = Supervisor::new(context);
    let (tx, rx) = mpsc::channel(8);
    for event in [
        ConfigEvent::AddLevel(FlapLevel::new(60.0, FlapLabel::new("L"), 700)),
        ConfigEvent::AddLevel(FlapLevel::new(120.0, FlapLabel::new("dup"), 900)),
        ConfigEvent::EditLevel { idx: 3, edit: LevelEdit::Label(FlapLabel::new("T")) },
        ConfigEvent::Crew { kg: 95.0 },
    ] {
        tx.send(event).await.unwrap();
    }
    drop(tx);
    supervisor.run_config_hub(rx).await;

    let flaps = supervisor.context().flaps();
    let flaps = flaps.read().await;
    assert_eq!(flaps.len(), 4);
    assert_eq!(flaps.table().get(3).unwrap().label().text(), "T");
    assert!((store.crew_weight() - 95.0).abs() < f32::EPSILON);
    assert!(store.ballast_pct() > 0.0);
    let expected_lf = (1.0 + store.ballast_pct() / 100.0).sqrt();
    let level = flaps.prepared().level(0).unwrap();
    assert!((level.prepared_speed() - 180.0 * expected_lf).abs() < 1e-3);
}

#[tokio::test]
async fn test_tick_publishes_outputs() {
    let (_, context) = init_context(false);
    let (supervisor, mut rx) = Supervisor::new(context);
    let outputs = supervisor.tick(cruise_sample()).await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), outputs);

    assert!(outputs.sink < 0.0);
    assert!(outputs.speed_to_fly >= outputs.min_sink_speed);
    assert!((outputs.flap_optimum - 0.5).abs() < 1e-4);
    assert_eq!(outputs.flap_position, None);
    // lever 0.5 rounds to level 1, shifted half a level towards level 0
    assert!((outputs.flap_band.0 - 140.0).abs() < 1e-3);
    assert!((outputs.flap_band.1 - 200.0).abs() < 1e-3);
    assert!((outputs.stall_speed - 70.0).abs() < 1e-3);
}

#[tokio::test]
async fn test_circling_tick() {
    let (_, context) = init_context(false);
    let (supervisor, _rx) = Supervisor::new(context);
    let sample = SensorSample { circling: true, accel_z: 1.4, ..cruise_sample() };
    let outputs = supervisor.tick(sample).await;
    assert!((outputs.speed_to_fly - outputs.circling_speed).abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_flap_sensor_position() {
    let raw_sample = SensorSample { flap_raw: Some(300), ..cruise_sample() };

    let (_, context) = init_context(false);
    let (supervisor, _rx) = Supervisor::new(context);
    for _ in 0..5 {
        assert_eq!(supervisor.tick(raw_sample).await.flap_position, None);
    }

    // a peer reporting a sensor enables the measured position
    let (_, context) = init_context(false);
    let (supervisor, _rx) = Supervisor::new(context);
    let peer_sample = SensorSample { peer_flap_sensor: true, ..raw_sample };
    let mut outputs = AdvisoryOutputs::default();
    for _ in 0..5 {
        outputs = supervisor.tick(peer_sample).await;
    }
    let position = outputs.flap_position.unwrap();
    assert!((position - 0.64).abs() < 1e-4);
    let band = supervisor.context().flaps().read().await.get_speed_band(position);
    assert_eq!(outputs.flap_band, band);
}

#[tokio::test]
async fn test_sensor_loop_runs_until_feed_closes() {
    let (_, context) = init_context(true);
    let (supervisor, rx) = Supervisor::new(context);
    let samples = (0..5).map(|i| {
        #[allow(clippy::cast_precision_loss)]
        let airspeed = 100.0 + 10.0 * i as f32;
        SensorSample { airspeed_kmh: airspeed, flap_raw: Some(500), ..cruise_sample() }
    });
    let feed: Arc<dyn SensorFeed> = Arc::new(ReplayFeed::new(samples));
    supervisor.run_sensor_loop(feed).await;

    let last = *rx.borrow();
    assert!((last.flap_optimum - supervisor.context().flaps().read().await.optimum(140.0)).abs() < 1e-4);
    assert!(last.flap_position.is_some());
}
