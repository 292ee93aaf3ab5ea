use super::flap_level::PreparedLevel;
use super::MAX_POSITIONS;
use crate::common::math::{extend_linear, round_index, steps_between};

/// Ballast corrected flap levels with precomputed interpolation deltas.
///
/// Only produced by [`super::LevelTable::prepare`], so it can never be out of step with
/// the levels it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PreparedTable {
    levels: [PreparedLevel; MAX_POSITIONS],
    len: usize,
    /// Sensor counts decrease with increasing lever index.
    sensor_descending: bool,
}

impl PreparedTable {
    pub(super) fn new(levels: [PreparedLevel; MAX_POSITIONS], len: usize, sensor_descending: bool) -> Self {
        Self { levels, len: len.min(MAX_POSITIONS), sensor_descending }
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn sensor_descending(&self) -> bool { self.sensor_descending }
    pub fn levels(&self) -> &[PreparedLevel] { &self.levels[..self.len] }
    pub fn level(&self, idx: usize) -> Option<&PreparedLevel> { self.levels().get(idx) }

    /// Highest valid lever position, `0.0` for an empty table.
    #[allow(clippy::cast_precision_loss)]
    pub fn max_position(&self) -> f32 { self.len.saturating_sub(1) as f32 }

    /// Maps a raw flap sensor count onto a fractional lever position.
    ///
    /// Exact at the calibration points and linear in between, readings beyond the
    /// outermost positions are extrapolated with the neighbouring slope.
    ///
    /// # Returns
    /// - `0.0` for tables with fewer than two levels.
    #[allow(clippy::cast_precision_loss)]
    pub fn sensor_to_lever_position(&self, raw: i32) -> f32 {
        let levels = self.levels();
        if levels.len() < 2 {
            return 0.0;
        }
        let passed = levels.iter().position(|l| {
            let cal = l.level().sensor_calibration();
            if self.sensor_descending { raw > cal } else { raw < cal }
        });
        let wk = match passed {
            Some(i) => i.saturating_sub(1),
            None => levels.len() - 1,
        };
        let bracket = &levels[wk];
        let offset = raw.saturating_sub(bracket.level().sensor_calibration()) as f32;
        wk as f32 + offset / bracket.sensor_delta() as f32
    }

    /// Airspeed in km/h belonging to a fractional lever position.
    ///
    /// # Returns
    /// - `0.0` for an empty table.
    #[allow(clippy::cast_precision_loss)]
    pub fn speed(&self, lever: f32) -> f32 {
        let Some(wki) = round_index(lever, self.len) else { return 0.0 };
        let level = &self.levels[wki];
        extend_linear(level.prepared_speed(), lever - wki as f32, level.speed_delta())
    }

    /// Speed envelope `(min, max)` in km/h for a fractional lever position.
    ///
    /// The band of a full position spans from its own speed up to the next faster
    /// position (or `v_max` for the first one) and is shifted along with fractional
    /// positions.
    ///
    /// # Returns
    /// - `(0.0, 0.0)` for an empty table.
    #[allow(clippy::cast_precision_loss)]
    pub fn speed_band(&self, lever: f32, v_max: f32) -> (f32, f32) {
        let Some(wki) = round_index(lever, self.len) else { return (0.0, 0.0) };
        let level = &self.levels[wki];
        let min_speed = level.prepared_speed();
        let max_speed = if wki == 0 { v_max } else { self.levels[wki - 1].prepared_speed() };
        let shift = (lever - wki as f32) * level.speed_delta();
        (min_speed + shift, max_speed + shift)
    }

    /// Index of the level whose segment brackets `speed` from the slow side.
    ///
    /// Scans for the first level slower than `speed` and steps one level back, clamped
    /// into the table.
    pub fn bracket_for_speed(&self, speed: f32) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let first_slower = self.levels().iter().position(|l| speed > l.prepared_speed());
        Some(match first_slower {
            Some(i) => i.saturating_sub(1),
            None => self.len - 1,
        })
    }

    /// Unclamped fractional lever position at which `speed` is reached.
    #[allow(clippy::cast_precision_loss)]
    pub fn position_for_speed(&self, speed: f32) -> Option<f32> {
        let wki = self.bracket_for_speed(speed)?;
        let level = &self.levels[wki];
        Some(wki as f32 + steps_between(level.prepared_speed(), speed, level.speed_delta()))
    }
}
