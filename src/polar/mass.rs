//! Mass bookkeeping that feeds the wingloading correction.

/// Pilot mass assumed when deriving a default empty weight from a polar, in kg.
pub const REFERENCE_CREW_KG: f32 = 80.0;

/// Water ballast capacity assumed when a polar does not state one, in liters.
pub const DEFAULT_MAX_BALLAST: f32 = 100.0;

const GRAVITY: f32 = 9.81;
const SEA_LEVEL_DENSITY: f32 = 1.225;
const CL_MAX: f32 = 1.4;
const STALL_MARGIN_FACTOR: f32 = 1.05;

/// Total flying mass in kg.
pub fn gross_weight(empty_kg: f32, crew_kg: f32, ballast_kg: f32) -> f32 {
    empty_kg + crew_kg + ballast_kg
}

/// Overweight of `gross_kg` relative to the polar reference mass, in percent.
///
/// # Arguments
/// - `gross_kg`: Current flying mass.
/// - `wingload`: Reference wingload of the polar in kg/m².
/// - `wingarea`: Wing area in m².
///
/// # Returns
/// - `100 * gross / (wingload * wingarea) - 100`, or `0.0` without a reference mass.
pub fn overweight_pct(gross_kg: f32, wingload: f32, wingarea: f32) -> f32 {
    let reference = wingload * wingarea;
    if reference <= 0.0 {
        return 0.0;
    }
    (100.0 * gross_kg) / reference - 100.0
}

/// Empty weight assumed for a polar that flies its reference wingload with one pilot.
pub fn default_empty_weight(wingload: f32, wingarea: f32) -> f32 {
    wingload * wingarea - REFERENCE_CREW_KG
}

/// Stall speed estimate in m/s for a wingload in kg/m², 5% above `sqrt(2 W/S g / (rho Clmax))`.
pub fn estimate_stall_speed(wingload: f32) -> f32 {
    ((2.0 * wingload.max(0.0) * GRAVITY) / (SEA_LEVEL_DENSITY * CL_MAX)).sqrt() * STALL_MARGIN_FACTOR
}

/// Ballast capacity to plan with, falling back to [`DEFAULT_MAX_BALLAST`].
pub fn effective_max_ballast(max_ballast: f32) -> f32 {
    if max_ballast.abs() < 1.0 { DEFAULT_MAX_BALLAST } else { max_ballast }
}
