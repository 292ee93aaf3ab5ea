use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything the advisor publishes per sensor tick.
///
/// Speeds are in km/h, sink rates in m/s and lever positions fractional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AdvisoryOutputs {
    pub timestamp: DateTime<Utc>,
    /// Polar sink at the current airspeed and G-load.
    pub sink: f32,
    pub speed_to_fly: f32,
    /// Recommended lever position.
    pub flap_optimum: f32,
    /// Measured lever position, `None` without a flap sensor.
    pub flap_position: Option<f32>,
    /// Speed band `(min, max)` of the measured or else the recommended position.
    pub flap_band: (f32, f32),
    pub min_sink_speed: f32,
    pub min_sink: f32,
    pub circling_speed: f32,
    pub circling_sink: f32,
    /// Ballast corrected stall speed.
    pub stall_speed: f32,
}
