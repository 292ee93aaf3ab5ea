use async_trait::async_trait;

/// One set of readings taken at the sensor rate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorSample {
    /// Indicated airspeed in km/h.
    pub airspeed_kmh: f32,
    /// Vertical acceleration in g.
    pub accel_z: f32,
    /// Air mass vertical speed in m/s.
    pub netto_vario: f32,
    pub circling: bool,
    /// Raw flap sensor count, if one was read this tick.
    pub flap_raw: Option<i32>,
    /// A peer device reports a flap sensor.
    pub peer_flap_sensor: bool,
}

/// Source of sensor samples for [`super::Supervisor::run_sensor_loop`].
#[async_trait]
pub trait SensorFeed: Send + Sync {
    /// Next sample, `None` once the feed is closed.
    async fn sample(&self) -> Option<SensorSample>;
}
