use super::flap_level::{FlapLevel, PreparedLevel};
use super::prepared_table::PreparedTable;
use super::MAX_POSITIONS;
use crate::common::math::loading_factor;
use itertools::Itertools;

/// Fixed capacity list of configured flap levels.
///
/// The table itself does not enforce the speed order, [`Self::sort_by_speed`] is part of
/// the mutation protocol run by the flap advisor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LevelTable {
    levels: [FlapLevel; MAX_POSITIONS],
    len: usize,
}

impl LevelTable {
    pub fn new() -> Self { Self::default() }

    /// Builds a table from the first [`MAX_POSITIONS`] levels of `levels`.
    pub fn from_levels(levels: &[FlapLevel]) -> Self {
        let mut table = Self::new();
        for level in levels.iter().take(MAX_POSITIONS) {
            table.levels[table.len] = *level;
            table.len += 1;
        }
        table
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn is_full(&self) -> bool { self.len == MAX_POSITIONS }

    pub fn as_slice(&self) -> &[FlapLevel] { &self.levels[..self.len] }

    pub fn get(&self, idx: usize) -> Option<&FlapLevel> { self.as_slice().get(idx) }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut FlapLevel> {
        self.levels[..self.len].get_mut(idx)
    }

    pub fn last(&self) -> Option<&FlapLevel> { self.as_slice().last() }

    /// Appends `level`, handing it back if the table is full.
    pub fn push(&mut self, level: FlapLevel) -> Result<(), FlapLevel> {
        if self.is_full() {
            return Err(level);
        }
        self.levels[self.len] = level;
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the level at `idx`, shifting the rest down.
    pub fn remove(&mut self, idx: usize) -> Option<FlapLevel> {
        if idx >= self.len {
            return None;
        }
        let removed = self.levels[idx];
        self.levels.copy_within(idx + 1..self.len, idx);
        self.len -= 1;
        self.levels[self.len] = FlapLevel::default();
        Some(removed)
    }

    pub fn clear(&mut self) { *self = Self::default(); }

    /// Sorts by configured speed, fastest first.
    pub fn sort_by_speed(&mut self) {
        self.levels[..self.len]
            .sort_by(|a, b| b.configured_speed().total_cmp(&a.configured_speed()));
    }

    /// Drops levels repeating the speed of their predecessor, keeping the first one.
    ///
    /// # Returns
    /// - The number of dropped levels.
    pub fn dedup_by_speed(&mut self) -> usize {
        let kept = self
            .as_slice()
            .iter()
            .copied()
            .dedup_by(|a, b| a.configured_speed().total_cmp(&b.configured_speed()).is_eq())
            .collect_vec();
        let dropped = self.len - kept.len();
        *self = Self::from_levels(&kept);
        dropped
    }

    /// Checks the strictly descending speed order.
    pub fn is_sorted_by_speed(&self) -> bool {
        self.as_slice()
            .iter()
            .tuple_windows()
            .all(|(a, b)| a.configured_speed() > b.configured_speed())
    }

    /// Derives ballast corrected speeds and interpolation deltas.
    ///
    /// # Arguments
    /// - `ballast_pct`: Current overweight in percent.
    ///
    /// # Returns
    /// - A [`PreparedTable`] with one entry per level. The last level repeats the deltas
    ///   of the last pair so lookups can extrapolate past it; a single level gets zero
    ///   deltas.
    pub fn prepare(&self, ballast_pct: f32) -> PreparedTable {
        let lf = loading_factor(ballast_pct);
        let mut prepared = [PreparedLevel::default(); MAX_POSITIONS];
        for (dst, level) in prepared.iter_mut().zip(self.as_slice()) {
            *dst = PreparedLevel::new(*level, level.configured_speed() * lf);
        }

        let levels = &mut prepared[..self.len];
        let sensor_descending = match (levels.first(), levels.last()) {
            (Some(first), Some(last)) => {
                first.level().sensor_calibration() > last.level().sensor_calibration()
            }
            _ => false,
        };

        let mut deltas = (0, 0.0);
        for i in 1..levels.len() {
            let (prev, next) = (&levels[i - 1], &levels[i]);
            let mut sensor_delta =
                next.level().sensor_calibration().saturating_sub(prev.level().sensor_calibration());
            if sensor_delta == 0 {
                sensor_delta = if sensor_descending { -1 } else { 1 };
            }
            let speed_delta = (next.prepared_speed() - prev.prepared_speed()).min(-1.0);
            deltas = (sensor_delta, speed_delta);
            levels[i - 1].set_deltas(sensor_delta, speed_delta);
        }
        if let Some(last) = levels.last_mut() {
            last.set_deltas(deltas.0, deltas.1);
        }
        PreparedTable::new(prepared, self.len, sensor_descending)
    }
}
