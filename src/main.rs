use async_trait::async_trait;
use glide_advisor::control::{AdvisorContext, ConfigEvent, SensorFeed, SensorSample, Supervisor};
use glide_advisor::flap::{FlapLabel, FlapLevel, LevelEdit};
use glide_advisor::setup::{AdvisorTuning, MemorySetupStore, SetupStore, SetupValues};
use glide_advisor::{fatal, info, warn};
use rand::Rng;
use std::sync::atomic::{AtomicU32, Ordering};
use std::{env, sync::Arc, time::Duration};
use tokio::sync::mpsc;

#[cfg(all(feature = "profiling", not(target_env = "msvc")))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const DEFAULT_DEMO_TICKS: u32 = 200;
const CONFIG_EVENT_DELAY: Duration = Duration::from_secs(2);
const OUTPUT_LOG_EVERY: u32 = 10;

/// Sensor feed flying a slow dolphin pattern through random gusts.
struct SimulatedFeed {
    remaining: AtomicU32,
    tick: AtomicU32,
}

impl SimulatedFeed {
    fn new(ticks: u32) -> Self { Self { remaining: AtomicU32::new(ticks), tick: AtomicU32::new(0) } }
}

#[async_trait]
impl SensorFeed for SimulatedFeed {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    async fn sample(&self) -> Option<SensorSample> {
        if self.remaining.fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| r.checked_sub(1)).is_err() {
            return None;
        }
        let tick = self.tick.fetch_add(1, Ordering::AcqRel) as f32;
        let mut rng = rand::rng();
        let phase = tick / 50.0;
        let airspeed_kmh = 120.0 + 40.0 * phase.sin() + rng.random_range(-3.0..3.0_f32);
        Some(SensorSample {
            airspeed_kmh,
            accel_z: 1.0 + 0.3 * phase.cos() + rng.random_range(-0.2..0.2_f32),
            netto_vario: 1.5 * (phase * 0.7).sin() + rng.random_range(-0.5..0.5_f32),
            circling: phase.sin() < -0.8,
            flap_raw: Some((1800.0 - 8.0 * airspeed_kmh + rng.random_range(-20.0..20.0_f32)) as i32),
            peer_flap_sensor: false,
        })
    }
}

/// A four position table with a calibrated lever sensor.
fn demo_setup() -> SetupValues {
    let mut values = SetupValues { flaps_defined: true, flap_sensor_enabled: true, ..SetupValues::default() };
    let levels = [(170.0, "-2", 400), (140.0, "0", 700), (110.0, "+2", 1000), (85.0, "L", 1300)];
    for (slot, (speed, label, sensor)) in values.flap_slots.iter_mut().zip(levels) {
        *slot = FlapLevel::new(speed, FlapLabel::new(label), sensor).to_slot();
    }
    values
}

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let ticks_var = env::var("GLIDE_DEMO_TICKS");
    let ticks = ticks_var.as_ref().map_or(DEFAULT_DEMO_TICKS, |v| {
        v.parse().unwrap_or_else(|_| fatal!("GLIDE_DEMO_TICKS is not a tick count: {v}"))
    });

    let store = Arc::new(MemorySetupStore::new(demo_setup()));
    let context = AdvisorContext::new(store.clone(), AdvisorTuning::default(), None);
    if !context.polar().read().await.is_valid() {
        fatal!("Configured polar does not fit a valid parabola");
    }
    let (supervisor, mut outputs_rx) = {
        let (sv, rx) = Supervisor::new(context);
        (Arc::new(sv), rx)
    };

    let (config_tx, config_rx) = mpsc::channel(16);
    let supervisor_clone = Arc::clone(&supervisor);
    let config_hub = tokio::spawn(async move {
        supervisor_clone.run_config_hub(config_rx).await;
    });
    let supervisor_clone_clone = Arc::clone(&supervisor);
    let sensor_loop = tokio::spawn(async move {
        let feed: Arc<dyn SensorFeed> = Arc::new(SimulatedFeed::new(ticks));
        supervisor_clone_clone.run_sensor_loop(feed).await;
    });
    tokio::spawn(async move {
        let mut count = 0_u32;
        while outputs_rx.changed().await.is_ok() {
            let out = *outputs_rx.borrow_and_update();
            count += 1;
            if count % OUTPUT_LOG_EVERY == 0 {
                info!(
                    "sink {:.2} m/s, s2f {:.0} km/h, flap {:.1} (lever {}), band {:.0}..{:.0} km/h",
                    out.sink,
                    out.speed_to_fly,
                    out.flap_optimum,
                    out.flap_position.map_or_else(|| "-".to_string(), |p| format!("{p:.1}")),
                    out.flap_band.0,
                    out.flap_band.1
                );
            }
        }
    });

    for event in [
        ConfigEvent::Mc { value: 1.5 },
        ConfigEvent::Ballast { kg: 80.0 },
        ConfigEvent::EditLevel { idx: 3, edit: LevelEdit::Label(FlapLabel::new("T")) },
        ConfigEvent::Bugs { pct: 5.0 },
    ] {
        tokio::time::sleep(CONFIG_EVENT_DELAY).await;
        if config_tx.send(event).await.is_err() {
            warn!("Config hub gone, dropping {event}");
        }
    }

    if let Err(e) = sensor_loop.await {
        warn!("Sensor loop ended abnormally: {e}");
    }
    drop(config_tx);
    if let Err(e) = config_hub.await {
        warn!("Config hub ended abnormally: {e}");
    }
    info!(
        "Demo finished, ballast {:.1}%, MC {:.1}, {} flap levels",
        store.ballast_pct(),
        store.mc(),
        supervisor.context().flaps().read().await.len()
    );
}
