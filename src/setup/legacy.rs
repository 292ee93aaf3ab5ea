//! One-shot import of the flat key layout older firmware used for flap settings.
//!
//! The old layout addressed flap positions by their offset from neutral (`-3..=+3`)
//! with one key per value and kept labels as an index into a fixed label list.
//! Nothing here is used after startup.

use super::tuning::AdvisorTuning;
use crate::flap::{FlapLabel, FlapLevel, MAX_POSITIONS};
use crate::{info, log};
use num::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key of the lowest configured flap offset.
pub const KEY_RANGE_START: &str = "FL_NEG_M";
/// Key of the highest configured flap offset.
pub const KEY_RANGE_END: &str = "FL_POS_M";

/// Offset of the neutral position in the per-position key lists.
const NEUTRAL_OFFSET: i32 = 3;

/// The 7th position never had a speed key, it falls back to the general minimum speed.
const SPEED_KEYS: [Option<&str>; MAX_POSITIONS] = [
    Some("FLAP_MINUS_3"),
    Some("FLAP_MINUS_2"),
    Some("FLAP_MINUS_1"),
    Some("FLAP_0"),
    Some("FLAP_PLUS_1"),
    Some("FLAP_PLUS_2"),
    None,
];
const LABEL_KEYS: [&str; MAX_POSITIONS] = ["WKLM3", "WKLM2", "WKLM1", "WKL0", "WKLP1", "WKLP2", "WKLP3"];
const SENSOR_KEYS: [&str; MAX_POSITIONS] = ["WKSM3", "WKSM2", "WKSM1", "WKSP0", "WKSP1", "WKSP2", "WKSP3"];

/// Label list the old label indices point into.
pub const LEGACY_LABELS: [&str; 55] = [
    "-9", "-8", "-7", "-6", "-5", "-4", "-3", "-2", "-1", "+0",
    "+1", "+2", "+3", "+4", "+5", "+6", "+7", "+8", "+9",
    " 0", " 1", " 2", " 3", " 4", " 5", " 6", " 7", " 8", " 9", "10",
    "11", "12", "13", "14", "15", "16", "17", "18", "19", "20",
    " N", " L", " S", "3a", "3b", " A", "21", "22", "23", "24", "25", "26", "27", "T", "",
];

/// Read access to the old flat key/value configuration.
pub trait LegacyStore {
    fn old_float(&self, key: &str) -> Option<f32>;
    fn old_int(&self, key: &str) -> Option<i32>;
}

/// Plain map backed [`LegacyStore`], e.g. filled from an exported settings dump.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyValues {
    pub floats: HashMap<String, f32>,
    pub ints: HashMap<String, i32>,
}

impl LegacyStore for LegacyValues {
    fn old_float(&self, key: &str) -> Option<f32> { self.floats.get(key).copied() }

    fn old_int(&self, key: &str) -> Option<i32> { self.ints.get(key).copied() }
}

/// Converts the old flat layout into flap levels in the old slot order.
///
/// Positions with a missing value or an unknown label index are skipped. The result is
/// neither sorted nor prepared, callers hand it to the flap table mutation protocol.
///
/// # Arguments
/// - `old`: The legacy key/value source.
///
/// # Returns
/// - The migrated levels, empty if the old range keys are missing.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn migrate_legacy_flaps(old: &dyn LegacyStore) -> Vec<FlapLevel> {
    let mut levels = Vec::new();
    let (Some(range_start), Some(range_end)) =
        (old.old_float(KEY_RANGE_START), old.old_float(KEY_RANGE_END))
    else {
        log!("No legacy flap range found, nothing to migrate");
        return levels;
    };
    let count = (range_end - range_start + 1.0).to_i32().unwrap_or(0).clamp(0, MAX_POSITIONS as i32);
    info!("Found legacy flap range {range_start:.1} to {range_end:.1}, levels {count}");

    let first = (range_start as i32).saturating_add(NEUTRAL_OFFSET);
    for (i, raw_idx) in (first..first.saturating_add(count)).enumerate() {
        let Ok(old_idx) = usize::try_from(raw_idx) else { continue };
        if old_idx >= MAX_POSITIONS {
            break;
        }
        let speed_value = match SPEED_KEYS[old_idx] {
            Some(key) => old.old_float(key),
            None => Some(AdvisorTuning::GENERAL_V_MIN),
        };
        let label_text = old
            .old_int(LABEL_KEYS[old_idx])
            .and_then(|idx| usize::try_from(idx).ok())
            .and_then(|idx| LEGACY_LABELS.get(idx));
        let sensor_value = old.old_int(SENSOR_KEYS[old_idx]);
        if let (Some(speed), Some(text), Some(sensor)) = (speed_value, label_text, sensor_value) {
            let label = FlapLabel::new(text);
            info!("Migrated legacy flap level {i} {label}: {speed:.1} ({sensor})");
            levels.push(FlapLevel::new(speed, label, sensor));
        }
    }
    levels
}
