use crate::flap::MAX_POSITIONS;
use crate::polar::PolarPoints;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// One persisted flap position as it is kept by the configuration store.
///
/// A slot without a positive, finite speed is unused.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FlapSlot {
    /// Configured speed in km/h at zero ballast.
    pub speed: f32,
    /// Packed 4 byte label.
    pub label: i32,
    /// Raw flap sensor reading at this position.
    pub sensor: i32,
}

impl FlapSlot {
    pub fn is_used(&self) -> bool { self.speed > 0.0 && self.speed.is_finite() }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    SlotOutOfRange(usize),
}

impl std::error::Error for SetupError {}

/// Plain accessor interface into the instrument configuration.
///
/// Implementations are expected to be cheap and non-blocking. Setters take `&self`,
/// interior mutability is up to the implementation.
pub trait SetupStore: Send + Sync {
    fn polar_points(&self) -> PolarPoints;
    fn set_polar_points(&self, points: PolarPoints);
    /// Reference wingload of the polar in kg/m².
    fn wingload(&self) -> f32;
    fn set_wingload(&self, wingload: f32);
    /// Wing area in m².
    fn wingarea(&self) -> f32;
    fn set_wingarea(&self, wingarea: f32);
    /// Maximum water ballast in liters, `0.0` if the polar does not state one.
    fn max_ballast(&self) -> f32;
    fn set_max_ballast(&self, liters: f32);
    fn empty_weight(&self) -> f32;
    fn set_empty_weight(&self, kg: f32);
    fn crew_weight(&self) -> f32;
    fn set_crew_weight(&self, kg: f32);
    fn ballast_kg(&self) -> f32;
    fn set_ballast_kg(&self, kg: f32);
    fn gross_weight(&self) -> f32;
    fn set_gross_weight(&self, kg: f32);
    /// Overweight relative to the polar reference mass in percent.
    fn ballast_pct(&self) -> f32;
    fn set_ballast_pct(&self, pct: f32);
    fn bugs_pct(&self) -> f32;
    fn set_bugs_pct(&self, pct: f32);
    fn mc(&self) -> f32;
    fn set_mc(&self, mc: f32);
    /// Never exceed speed in km/h.
    fn v_max(&self) -> f32;
    /// Pilot confirmed stall speed in km/h at reference wingload.
    fn stall_speed(&self) -> f32;
    fn set_stall_speed(&self, kmh: f32);
    /// Speed-to-fly ignores netto vario when set.
    fn block_speed(&self) -> bool;
    /// Flap position recommended below the general minimum speed.
    fn takeoff_flap(&self) -> f32;
    fn flap_sensor_enabled(&self) -> bool;
    /// Set once a flap table was ever written in the current layout.
    fn flaps_defined(&self) -> bool;
    fn set_flaps_defined(&self, defined: bool);
    /// Returns the persisted slot `idx`, `None` beyond [`MAX_POSITIONS`].
    fn flap_slot(&self, idx: usize) -> Option<FlapSlot>;
    /// Overwrites slot `idx`.
    ///
    /// # Errors
    /// `SetupError::SlotOutOfRange` for `idx >= MAX_POSITIONS`.
    fn set_flap_slot(&self, idx: usize, slot: FlapSlot) -> Result<(), SetupError>;

    /// Number of slots the store keeps.
    fn flap_slot_count(&self) -> usize { MAX_POSITIONS }
}
