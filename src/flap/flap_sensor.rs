use super::flap_advisor::FlapAdvisor;
use crate::{event, warn};
use num::ToPrimitive;

/// Largest count the flap sensor ADC delivers.
pub const SENSOR_RAW_MAX: i32 = 4096;

/// Sensor samples per lever position update, 10 Hz sampling gives 2 Hz updates.
const SAMPLES_PER_UPDATE: u32 = 5;

/// Divider of the raw reading low pass.
const FILTER_DIVIDER: i32 = 4;

/// Whether a flap sensor is usable, either wired locally or reported by a peer device.
pub fn sensor_available(local_sensor_enabled: bool, peer_has_sensor: bool) -> bool {
    local_sensor_enabled || peer_has_sensor
}

/// Filters raw flap sensor samples and tracks the measured lever position.
#[derive(Debug, Clone, Default)]
pub struct FlapSensor {
    raw_filtered: i32,
    samples: u32,
    /// Last published lever position.
    position: f32,
}

impl FlapSensor {
    pub fn new() -> Self { Self::default() }

    pub fn raw_filtered(&self) -> i32 { self.raw_filtered }

    /// Measured lever position, clamped into the table.
    pub fn position(&self) -> f32 { self.position }

    /// Feeds one raw sample, to be called at the sensor rate.
    ///
    /// # Returns
    /// - `Some(position)` whenever the published lever position changes in its first
    ///   decimal, `None` otherwise or for a dropped sample.
    pub fn progress(&mut self, raw: i32, advisor: &FlapAdvisor) -> Option<f32> {
        if raw < 0 {
            warn!("Negative flap sensor reading: {raw}");
            return None;
        }
        let clamped = raw.min(SENSOR_RAW_MAX);
        self.raw_filtered += (clamped - self.raw_filtered) / FILTER_DIVIDER;
        self.samples = self.samples.wrapping_add(1);
        if self.samples % SAMPLES_PER_UPDATE != 0 {
            return None;
        }

        let lever = advisor
            .sensor_to_lever_position(self.raw_filtered)
            .clamp(0.0, advisor.prepared().max_position());
        event!("Flap sensor raw {} lever {lever:.2}", self.raw_filtered);
        let tenths = |position: f32| (position * 10.0).to_i32();
        if tenths(self.position) == tenths(lever) {
            return None;
        }
        self.position = lever;
        Some(lever)
    }
}
