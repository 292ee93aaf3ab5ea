use serde::{Deserialize, Serialize};

/// Fixed tuning constants of the advisory models.
///
/// Defaults match the values flown on the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvisorTuning {
    /// Weight of a new G sample in the flap optimum smoothing.
    pub g_smoothing: f32,
    /// Circling speed as a multiple of the minimum sink speed.
    pub circling_factor: f32,
    /// Below this G corrected airspeed (km/h) the takeoff flap is recommended.
    pub general_v_min: f32,
    /// Flap optimum reported when the speed is faster than the first position.
    pub below_range_position: f32,
    /// Fraction of the stall speed below which no sink is modelled.
    pub stall_margin: f32,
}

impl AdvisorTuning {
    pub const G_SMOOTHING: f32 = 0.5;
    pub const CIRCLING_FACTOR: f32 = 1.2;
    pub const GENERAL_V_MIN: f32 = 50.0;
    pub const BELOW_RANGE_POSITION: f32 = -0.1;
    pub const STALL_MARGIN: f32 = 0.9;
}

impl Default for AdvisorTuning {
    fn default() -> Self {
        Self {
            g_smoothing: Self::G_SMOOTHING,
            circling_factor: Self::CIRCLING_FACTOR,
            general_v_min: Self::GENERAL_V_MIN,
            below_range_position: Self::BELOW_RANGE_POSITION,
            stall_margin: Self::STALL_MARGIN,
        }
    }
}
