use super::setup_store::{FlapSlot, SetupError, SetupStore};
use crate::flap::MAX_POSITIONS;
use crate::polar::{PolarPoint, PolarPoints};
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Snapshot of every configuration value the advisor consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupValues {
    pub polar_points: PolarPoints,
    pub wingload: f32,
    pub wingarea: f32,
    pub max_ballast: f32,
    pub empty_weight: f32,
    pub crew_weight: f32,
    pub ballast_kg: f32,
    pub gross_weight: f32,
    pub ballast_pct: f32,
    pub bugs_pct: f32,
    pub mc: f32,
    pub v_max: f32,
    pub stall_speed: f32,
    pub block_speed: bool,
    pub takeoff_flap: f32,
    pub flap_sensor_enabled: bool,
    pub flaps_defined: bool,
    pub flap_slots: [FlapSlot; MAX_POSITIONS],
}

impl Default for SetupValues {
    fn default() -> Self {
        Self {
            polar_points: PolarPoints::new([
                PolarPoint::new(80.0, -0.6),
                PolarPoint::new(120.0, -0.8),
                PolarPoint::new(160.0, -1.6),
            ]),
            wingload: 33.0,
            wingarea: 10.5,
            max_ballast: 0.0,
            empty_weight: 0.0,
            crew_weight: 80.0,
            ballast_kg: 0.0,
            gross_weight: 0.0,
            ballast_pct: 0.0,
            bugs_pct: 0.0,
            mc: 0.5,
            v_max: 270.0,
            stall_speed: 70.0,
            block_speed: false,
            takeoff_flap: 0.0,
            flap_sensor_enabled: false,
            flaps_defined: false,
            flap_slots: [FlapSlot::default(); MAX_POSITIONS],
        }
    }
}

/// In-process [`SetupStore`] backed by a lock-guarded [`SetupValues`].
///
/// Used by the demo binary and the tests, a firmware build plugs its own store in.
#[derive(Debug, Default)]
pub struct MemorySetupStore {
    values: RwLock<SetupValues>,
}

macro_rules! scalar_accessor {
    ($get:ident, $set:ident, $field:ident, $ty:ty) => {
        fn $get(&self) -> $ty { self.read().$field }
        fn $set(&self, value: $ty) { self.write().$field = value; }
    };
}

impl MemorySetupStore {
    pub fn new(values: SetupValues) -> Self { Self { values: RwLock::new(values) } }

    /// Copy of all current values.
    pub fn snapshot(&self) -> SetupValues { self.read().clone() }

    /// Applies `f` to the values under a single write lock.
    pub fn update(&self, f: impl FnOnce(&mut SetupValues)) { f(&mut self.write()); }

    fn read(&self) -> RwLockReadGuard<'_, SetupValues> {
        self.values.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SetupValues> {
        self.values.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SetupStore for MemorySetupStore {
    scalar_accessor!(polar_points, set_polar_points, polar_points, PolarPoints);
    scalar_accessor!(wingload, set_wingload, wingload, f32);
    scalar_accessor!(wingarea, set_wingarea, wingarea, f32);
    scalar_accessor!(max_ballast, set_max_ballast, max_ballast, f32);
    scalar_accessor!(empty_weight, set_empty_weight, empty_weight, f32);
    scalar_accessor!(crew_weight, set_crew_weight, crew_weight, f32);
    scalar_accessor!(ballast_kg, set_ballast_kg, ballast_kg, f32);
    scalar_accessor!(gross_weight, set_gross_weight, gross_weight, f32);
    scalar_accessor!(ballast_pct, set_ballast_pct, ballast_pct, f32);
    scalar_accessor!(bugs_pct, set_bugs_pct, bugs_pct, f32);
    scalar_accessor!(mc, set_mc, mc, f32);
    scalar_accessor!(stall_speed, set_stall_speed, stall_speed, f32);
    scalar_accessor!(flaps_defined, set_flaps_defined, flaps_defined, bool);

    fn v_max(&self) -> f32 { self.read().v_max }

    fn block_speed(&self) -> bool { self.read().block_speed }

    fn takeoff_flap(&self) -> f32 { self.read().takeoff_flap }

    fn flap_sensor_enabled(&self) -> bool { self.read().flap_sensor_enabled }

    fn flap_slot(&self, idx: usize) -> Option<FlapSlot> { self.read().flap_slots.get(idx).copied() }

    fn set_flap_slot(&self, idx: usize, slot: FlapSlot) -> Result<(), SetupError> {
        let mut values = self.write();
        let target = values.flap_slots.get_mut(idx).ok_or(SetupError::SlotOutOfRange(idx))?;
        *target = slot;
        Ok(())
    }
}
