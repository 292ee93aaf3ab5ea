use super::config_event::ConfigEvent;
use super::context::AdvisorContext;
use super::outputs::AdvisoryOutputs;
use super::sensor_feed::{SensorFeed, SensorSample};
use crate::common::math::ms_to_kmh;
use crate::flap::{sensor_available, FlapSensor};
use crate::{conf, event, info, log, warn};
use chrono::Utc;
use std::sync::Arc;
use strum::VariantNames;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::MissedTickBehavior;

/// Drives the advisor: applies configuration events and turns sensor samples into
/// [`AdvisoryOutputs`].
pub struct Supervisor {
    context: AdvisorContext,
    flap_sensor: Mutex<FlapSensor>,
    outputs: watch::Sender<AdvisoryOutputs>,
}

impl Supervisor {
    /// Sensor loop period, 10 Hz.
    const SENSOR_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);

    /// Creates a new `Supervisor` together with the receiving end of its outputs.
    pub fn new(context: AdvisorContext) -> (Self, watch::Receiver<AdvisoryOutputs>) {
        let (tx, rx) = watch::channel(AdvisoryOutputs::default());
        (Self { context, flap_sensor: Mutex::new(FlapSensor::new()), outputs: tx }, rx)
    }

    pub fn context(&self) -> &AdvisorContext { &self.context }

    /// Another receiver of the published outputs.
    pub fn subscribe(&self) -> watch::Receiver<AdvisoryOutputs> { self.outputs.subscribe() }

    /// Processes one sensor sample and publishes the result.
    ///
    /// # Arguments
    /// - `sample`: The readings of this tick.
    ///
    /// # Returns
    /// The published [`AdvisoryOutputs`].
    pub async fn tick(&self, sample: SensorSample) -> AdvisoryOutputs {
        let polar_lock = self.context.polar();
        let flaps_lock = self.context.flaps();
        let mut outputs = AdvisoryOutputs { timestamp: Utc::now(), ..AdvisoryOutputs::default() };

        let mut polar = polar_lock.write().await;
        polar.set_g_load(sample.accel_z);
        outputs.sink = polar.sink(sample.airspeed_kmh);
        outputs.speed_to_fly = polar.speed(sample.netto_vario, sample.circling);
        outputs.min_sink_speed = polar.min_sink_speed();
        outputs.min_sink = polar.min_sink();
        outputs.circling_speed = polar.circling_speed();
        outputs.circling_sink = polar.circling_sink();
        outputs.stall_speed = ms_to_kmh(polar.stall_speed_ms());
        drop(polar);

        let mut flaps = flaps_lock.write().await;
        outputs.flap_optimum = flaps.get_optimum(sample.airspeed_kmh, sample.accel_z);
        let has_sensor =
            sensor_available(self.context.store().flap_sensor_enabled(), sample.peer_flap_sensor);
        outputs.flap_position = match sample.flap_raw {
            Some(raw) if has_sensor => {
                let mut sensor = self.flap_sensor.lock().await;
                sensor.progress(raw, &flaps);
                Some(sensor.position())
            }
            _ => None,
        };
        outputs.flap_band = flaps.get_speed_band(outputs.flap_position.unwrap_or(outputs.flap_optimum));
        drop(flaps);

        event!(
            "Tick: ias {:.1} sink {:.2} s2f {:.1} flap {:.2}",
            sample.airspeed_kmh,
            outputs.sink,
            outputs.speed_to_fly,
            outputs.flap_optimum
        );
        self.outputs.send_replace(outputs);
        outputs
    }

    /// Samples `feed` at the sensor rate until it closes.
    pub async fn run_sensor_loop(&self, feed: Arc<dyn SensorFeed>) {
        let mut interval = tokio::time::interval(Self::SENSOR_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let Some(sample) = feed.sample().await else {
                info!("Sensor feed closed, stopping sensor loop");
                break;
            };
            self.tick(sample).await;
        }
    }

    /// Applies configuration events in arrival order until all senders are dropped.
    pub async fn run_config_hub(&self, mut rx: mpsc::Receiver<ConfigEvent>) {
        log!("Config hub accepting {}", ConfigEvent::VARIANTS.join(", "));
        while let Some(config) = rx.recv().await {
            match self.context.apply(config).await {
                Ok(()) => conf!("Applied {config}: {config:?}"),
                Err(e) => warn!("Rejected config event {config}: {e}"),
            }
        }
        info!("Config channel closed, stopping config hub");
    }
}
