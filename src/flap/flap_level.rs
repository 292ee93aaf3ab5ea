use crate::setup::FlapSlot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Up to three characters packed into a 32-bit integer, NUL padded.
///
/// The packing is little endian, which is how the labels have always been stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FlapLabel(i32);

impl FlapLabel {
    /// Number of visible characters a label can carry.
    pub const MAX_CHARS: usize = 3;

    /// Packs the first three bytes of `text`.
    pub fn new(text: &str) -> Self {
        let mut bytes = [0_u8; 4];
        for (dst, src) in bytes.iter_mut().zip(text.bytes().take(Self::MAX_CHARS)) {
            *dst = src;
        }
        Self(i32::from_le_bytes(bytes))
    }

    pub const fn from_packed(packed: i32) -> Self { Self(packed) }

    pub fn packed(self) -> i32 { self.0 }

    /// The label text up to the first NUL.
    pub fn text(self) -> String {
        let bytes = self.0.to_le_bytes();
        let end = bytes.iter().take(Self::MAX_CHARS).position(|b| *b == 0).unwrap_or(Self::MAX_CHARS);
        String::from_utf8_lossy(&bytes[..end]).into_owned()
    }
}

impl fmt::Display for FlapLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.text()) }
}

/// A configured flap position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FlapLevel {
    /// Reference speed in km/h at zero ballast. Faster positions come first.
    configured_speed: f32,
    label: FlapLabel,
    /// Raw sensor count at this lever position.
    sensor_calibration: i32,
}

impl FlapLevel {
    pub fn new(configured_speed: f32, label: FlapLabel, sensor_calibration: i32) -> Self {
        Self { configured_speed, label, sensor_calibration }
    }

    pub fn configured_speed(&self) -> f32 { self.configured_speed }
    pub fn label(&self) -> FlapLabel { self.label }
    pub fn sensor_calibration(&self) -> i32 { self.sensor_calibration }

    pub fn set_configured_speed(&mut self, speed: f32) { self.configured_speed = speed; }
    pub fn set_label(&mut self, label: FlapLabel) { self.label = label; }
    pub fn set_sensor_calibration(&mut self, raw: i32) { self.sensor_calibration = raw; }

    /// Persisted form of this level.
    pub fn to_slot(self) -> FlapSlot {
        FlapSlot { speed: self.configured_speed, label: self.label.packed(), sensor: self.sensor_calibration }
    }
}

impl From<FlapSlot> for FlapLevel {
    fn from(slot: FlapSlot) -> Self {
        Self::new(slot.speed, FlapLabel::from_packed(slot.label), slot.sensor)
    }
}

/// A flap level together with the values derived for the current wingloading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PreparedLevel {
    level: FlapLevel,
    /// Configured speed corrected for ballast, km/h.
    prepared_speed: f32,
    /// Sensor count difference to the next level, never zero.
    sensor_delta: i32,
    /// Prepared speed difference to the next level, at most `-1.0`.
    speed_delta: f32,
}

impl PreparedLevel {
    pub(super) fn new(level: FlapLevel, prepared_speed: f32) -> Self {
        Self { level, prepared_speed, sensor_delta: 0, speed_delta: 0.0 }
    }

    pub(super) fn set_deltas(&mut self, sensor_delta: i32, speed_delta: f32) {
        self.sensor_delta = sensor_delta;
        self.speed_delta = speed_delta;
    }

    pub fn level(&self) -> &FlapLevel { &self.level }
    pub fn prepared_speed(&self) -> f32 { self.prepared_speed }
    pub fn sensor_delta(&self) -> i32 { self.sensor_delta }
    pub fn speed_delta(&self) -> f32 { self.speed_delta }
}
