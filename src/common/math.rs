/// Conversion factor between m/s and km/h.
pub const KMH_PER_MS: f32 = 3.6;

/// Lowest load factor the performance models accept, in g.
pub const MIN_G_LOAD: f32 = 0.3;

/// Lowest wingloading ratio accepted by [`loading_factor`].
const MIN_LOADING_RATIO: f32 = 0.01;

/// Converts an airspeed from km/h to m/s.
pub fn kmh_to_ms(kmh: f32) -> f32 { kmh / KMH_PER_MS }

/// Converts an airspeed from m/s to km/h.
pub fn ms_to_kmh(ms: f32) -> f32 { ms * KMH_PER_MS }

/// Wingloading correction for a ballast overweight in percent.
///
/// # Arguments
/// - `ballast_pct`: Overweight relative to the polar reference mass, in percent.
///
/// # Returns
/// - `sqrt((ballast_pct + 100) / 100)`, with the ratio floored at `0.01` so nonsense
///   ballast values never produce a NaN.
pub fn loading_factor(ballast_pct: f32) -> f32 {
    ((ballast_pct + 100.0) / 100.0).max(MIN_LOADING_RATIO).sqrt()
}

/// Floors a vertical load factor at [`MIN_G_LOAD`]. NaN readings map to the floor as well.
pub fn floor_g_load(g: f32) -> f32 { g.max(MIN_G_LOAD) }

/// Single step of an exponential moving average.
///
/// # Arguments
/// - `current`: The current filter state.
/// - `sample`: The new raw sample.
/// - `factor`: Weight of the new sample in `[0.0, 1.0]`.
pub fn exp_smooth(current: f32, sample: f32, factor: f32) -> f32 {
    current + (sample - current) * factor
}

/// Clamps a computed value into `[lo, hi]`, mapping NaN to `lo` and `+Inf` to `hi`.
///
/// # Arguments
/// - `value`: The value to clamp, possibly NaN or infinite.
/// - `lo`: The lower bound, returned for NaN and for values below it.
/// - `hi`: The upper bound, returned for `+Inf` and for values above it.
pub fn clamp_or_bound(value: f32, lo: f32, hi: f32) -> f32 {
    if value.is_nan() || value < lo {
        lo
    } else if value.is_infinite() || value > hi {
        hi
    } else {
        value
    }
}

/// Rounds a fractional table position to the nearest valid index.
///
/// # Arguments
/// - `frac`: The fractional position.
/// - `len`: The number of entries in the table.
///
/// # Returns
/// - `None` for an empty table, otherwise the rounded index clamped into `[0, len - 1]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn round_index(frac: f32, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let rounded = frac.round().max(0.0);
    if rounded.is_nan() {
        return Some(0);
    }
    Some((rounded as usize).min(len - 1))
}

/// Extends a linear segment from `base` by `offset` steps of `delta`.
pub fn extend_linear(base: f32, offset: f32, delta: f32) -> f32 { base + offset * delta }

/// Inverse of [`extend_linear`]: the number of `delta` steps between `base` and `value`.
///
/// Returns `0.0` for a zero `delta`.
pub fn steps_between(base: f32, value: f32, delta: f32) -> f32 {
    if delta == 0.0 { 0.0 } else { (value - base) / delta }
}
