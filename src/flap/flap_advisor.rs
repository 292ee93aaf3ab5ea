use super::flap_level::{FlapLabel, FlapLevel};
use super::flap_sensor::SENSOR_RAW_MAX;
use super::level_table::LevelTable;
use super::prepared_table::PreparedTable;
use crate::common::math::{exp_smooth, floor_g_load};
use crate::setup::legacy::{migrate_legacy_flaps, LegacyStore};
use crate::setup::{AdvisorTuning, FlapSlot, SetupError, SetupStore};
use crate::{conf, error, event, info, log, warn};
use std::sync::Arc;
use strum_macros::Display;

/// Speed the last slot falls back to below its predecessor when loaded out of order, km/h.
const LAST_SLOT_SPEED_STEP: f32 = 20.0;

#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum FlapTableError {
    TableFull,
    IndexOutOfRange(usize),
    InvalidSpeed(f32),
    DuplicateSpeed(f32),
    InvalidCalibration(i32),
}

impl std::error::Error for FlapTableError {}

/// A single field change of an existing flap level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelEdit {
    Speed(f32),
    Label(FlapLabel),
    SensorCalibration(i32),
}

/// Owns the flap table and answers all flap related queries.
///
/// Every structural change runs the same protocol before returning: mutate, sort by
/// speed, persist to the [`SetupStore`], rebuild the prepared table. Since the prepared
/// table is replaced within the same `&mut self` call no reader can see stale deltas.
pub struct FlapAdvisor {
    store: Arc<dyn SetupStore>,
    tuning: AdvisorTuning,
    table: LevelTable,
    prepared: PreparedTable,
    /// Smoothed load factor used for the optimum lookup.
    g_force: f32,
}

impl FlapAdvisor {
    /// Loads the flap table from `store` and prepares it.
    ///
    /// If the store never held a table in the current layout and `legacy` is given, the
    /// old flat layout is migrated, sorted and written back once.
    pub fn new(
        store: Arc<dyn SetupStore>,
        tuning: AdvisorTuning,
        legacy: Option<&dyn LegacyStore>,
    ) -> Self {
        let mut advisor = Self {
            store,
            tuning,
            table: LevelTable::new(),
            prepared: PreparedTable::default(),
            g_force: 1.0,
        };
        if advisor.load_from_store() {
            if let Some(old) = legacy {
                conf!("Migrating legacy flap settings");
                advisor.table = LevelTable::from_levels(&migrate_legacy_flaps(old));
            }
            advisor.store.set_flaps_defined(true);
            advisor.finish_mutation();
        } else {
            advisor.rebuild_derived_state();
        }
        advisor
    }

    pub fn table(&self) -> &LevelTable { &self.table }
    pub fn prepared(&self) -> &PreparedTable { &self.prepared }
    pub fn len(&self) -> usize { self.prepared.len() }
    pub fn is_empty(&self) -> bool { self.prepared.is_empty() }
    pub fn g_force(&self) -> f32 { self.g_force }

    /// Recomputes ballast corrected speeds and deltas from the current table.
    pub fn rebuild_derived_state(&mut self) {
        self.prepared = self.table.prepare(self.store.ballast_pct());
        for (i, level) in self.prepared.levels().iter().enumerate() {
            log!(
                "Flap level {i} {}: {:.1} km/h, sensor delta {}, speed delta {:.1}",
                level.level().label(),
                level.prepared_speed(),
                level.sensor_delta(),
                level.speed_delta()
            );
        }
    }

    /// Adds a new flap level.
    ///
    /// # Errors
    /// - `TableFull` with [`super::MAX_POSITIONS`] levels configured.
    /// - `InvalidSpeed` for a non-positive or non-finite speed.
    /// - `DuplicateSpeed` if another level has the same speed.
    /// - `InvalidCalibration` for a sensor count outside the sensor range.
    pub fn add_level(&mut self, level: FlapLevel) -> Result<(), FlapTableError> {
        self.check_speed(level.configured_speed(), None)?;
        Self::check_calibration(level.sensor_calibration())?;
        self.table.push(level).map_err(|_| FlapTableError::TableFull)?;
        self.finish_mutation();
        Ok(())
    }

    /// Removes the level at `idx`.
    ///
    /// # Errors
    /// `IndexOutOfRange` if there is no such level.
    pub fn remove_level(&mut self, idx: usize) -> Result<FlapLevel, FlapTableError> {
        let removed = self.table.remove(idx).ok_or(FlapTableError::IndexOutOfRange(idx))?;
        self.finish_mutation();
        Ok(removed)
    }

    /// Changes one field of the level at `idx`.
    ///
    /// # Errors
    /// `IndexOutOfRange` for an unknown index, speed and calibration edits are validated
    /// like [`Self::add_level`].
    pub fn edit_level(&mut self, idx: usize, edit: LevelEdit) -> Result<(), FlapTableError> {
        if idx >= self.table.len() {
            return Err(FlapTableError::IndexOutOfRange(idx));
        }
        match edit {
            LevelEdit::Speed(speed) => self.check_speed(speed, Some(idx))?,
            LevelEdit::SensorCalibration(raw) => Self::check_calibration(raw)?,
            LevelEdit::Label(_) => {}
        }
        let level = self.table.get_mut(idx).ok_or(FlapTableError::IndexOutOfRange(idx))?;
        match edit {
            LevelEdit::Speed(speed) => level.set_configured_speed(speed),
            LevelEdit::Label(label) => level.set_label(label),
            LevelEdit::SensorCalibration(raw) => level.set_sensor_calibration(raw),
        }
        self.finish_mutation();
        Ok(())
    }

    /// Stores the current raw sensor count as calibration of level `idx`.
    ///
    /// # Errors
    /// See [`Self::edit_level`].
    pub fn set_sensor_calibration(&mut self, idx: usize, raw: i32) -> Result<(), FlapTableError> {
        self.edit_level(idx, LevelEdit::SensorCalibration(raw))
    }

    /// # Errors
    /// See [`Self::edit_level`].
    pub fn set_label(&mut self, idx: usize, label: &str) -> Result<(), FlapTableError> {
        self.edit_level(idx, LevelEdit::Label(FlapLabel::new(label)))
    }

    /// # Errors
    /// See [`Self::edit_level`].
    pub fn set_speed(&mut self, idx: usize, speed: f32) -> Result<(), FlapTableError> {
        self.edit_level(idx, LevelEdit::Speed(speed))
    }

    /// Discards the in-memory table and reloads it from the store.
    pub fn reload_levels(&mut self) {
        self.load_from_store();
        self.rebuild_derived_state();
    }

    /// Fractional lever position for a raw sensor count.
    pub fn sensor_to_lever_position(&self, raw: i32) -> f32 {
        self.prepared.sensor_to_lever_position(raw)
    }

    /// Airspeed in km/h at a fractional lever position.
    pub fn get_speed(&self, lever: f32) -> f32 { self.prepared.speed(lever) }

    /// Speed band `(min, max)` in km/h for a fractional lever position.
    pub fn get_speed_band(&self, lever: f32) -> (f32, f32) {
        let band = self.prepared.speed_band(lever, self.store.v_max());
        event!("Flap {lever:.1} band {:.1}..{:.1} km/h", band.0, band.1);
        band
    }

    /// Advances the G-load smoothing by one control loop tick.
    pub fn tick_g_load(&mut self, accel_z: f32) {
        self.g_force = floor_g_load(exp_smooth(self.g_force, accel_z, self.tuning.g_smoothing));
    }

    /// Recommended fractional lever position for `airspeed` km/h at the smoothed G-load.
    ///
    /// The airspeed is reduced by `sqrt(g)` rather than raising the switch speeds, so the
    /// same prepared speeds serve both.
    ///
    /// # Returns
    /// - `0.0` for an empty table or a non-finite airspeed.
    /// - The takeoff flap below the general minimum speed.
    /// - A slightly negative sentinel when faster than the first position.
    /// - At most the last position.
    pub fn optimum(&self, airspeed: f32) -> f32 {
        if !airspeed.is_finite() {
            return 0.0;
        }
        let g_speed = airspeed / self.g_force.sqrt();
        let Some(wkf) = self.prepared.position_for_speed(g_speed) else { return 0.0 };
        let optimum = if g_speed < self.tuning.general_v_min {
            self.store.takeoff_flap()
        } else if wkf < 0.0 {
            self.tuning.below_range_position
        } else {
            wkf.min(self.prepared.max_position())
        };
        event!("Flap optimum: g-ias {g_speed:.1} -> {optimum:.2}");
        optimum
    }

    /// [`Self::tick_g_load`] followed by [`Self::optimum`].
    pub fn get_optimum(&mut self, airspeed: f32, accel_z: f32) -> f32 {
        self.tick_g_load(accel_z);
        self.optimum(airspeed)
    }

    fn check_speed(&self, speed: f32, skip: Option<usize>) -> Result<(), FlapTableError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(FlapTableError::InvalidSpeed(speed));
        }
        let duplicate = self
            .table
            .as_slice()
            .iter()
            .enumerate()
            .any(|(i, l)| Some(i) != skip && l.configured_speed().total_cmp(&speed).is_eq());
        if duplicate { Err(FlapTableError::DuplicateSpeed(speed)) } else { Ok(()) }
    }

    fn check_calibration(raw: i32) -> Result<(), FlapTableError> {
        if (0..=SENSOR_RAW_MAX).contains(&raw) { Ok(()) } else { Err(FlapTableError::InvalidCalibration(raw)) }
    }

    fn finish_mutation(&mut self) {
        self.table.sort_by_speed();
        let dropped = self.table.dedup_by_speed();
        if dropped > 0 {
            warn!("Dropped {dropped} flap levels with repeated speeds");
        }
        if let Err(e) = self.save_to_store() {
            error!("Persisting flap table failed: {e}");
        }
        conf!("Flap table now has {} levels", self.table.len());
        self.rebuild_derived_state();
    }

    /// Reads the persisted slots, returns `true` when a migration is due.
    ///
    /// Slots written out of order are sorted and repeated speeds dropped, the normalized
    /// table is written back.
    fn load_from_store(&mut self) -> bool {
        self.table.clear();
        let slot_count = self.store.flap_slot_count();
        for i in 0..slot_count {
            let Some(slot) = self.store.flap_slot(i).filter(FlapSlot::is_used) else { continue };
            let mut level = FlapLevel::from(slot);
            if i == slot_count - 1 {
                if let Some(prev) = self.table.last() {
                    if level.configured_speed() >= prev.configured_speed() {
                        let fixed = prev.configured_speed() - LAST_SLOT_SPEED_STEP;
                        if fixed <= 0.0 {
                            continue;
                        }
                        level.set_configured_speed(fixed);
                    }
                }
            }
            info!(
                "Loaded flap level {i} {}: {:.1} ({})",
                level.label(),
                level.configured_speed(),
                level.sensor_calibration()
            );
            if self.table.push(level).is_err() {
                break;
            }
        }
        info!("Found {} flap levels", self.table.len());

        let loaded = self.table;
        self.table.sort_by_speed();
        let dropped = self.table.dedup_by_speed();
        if self.table.as_slice() != loaded.as_slice() {
            warn!("Normalized stored flap levels, {dropped} repeated speeds dropped");
            if let Err(e) = self.save_to_store() {
                error!("Persisting flap table failed: {e}");
            }
        }
        self.table.is_empty() && !self.store.flaps_defined()
    }

    /// Writes changed slots back and clears the unused ones.
    fn save_to_store(&self) -> Result<(), SetupError> {
        for i in 0..self.store.flap_slot_count() {
            let slot = self.table.get(i).map(|l| l.to_slot()).unwrap_or_default();
            if self.store.flap_slot(i) != Some(slot) {
                self.store.set_flap_slot(i, slot)?;
            }
        }
        Ok(())
    }
}
