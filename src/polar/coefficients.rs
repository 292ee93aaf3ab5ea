use super::polar_points::PolarPoints;
use crate::common::math::{kmh_to_ms, loading_factor};

/// Coefficients of the quadratic sink polar `w(v) = a0 + a1 * v + a2 * v²`, `v` in m/s.
///
/// Already corrected for ballast and bugs when produced by [`fit_polar`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolarCoefficients {
    a0: f32,
    a1: f32,
    a2: f32,
}

impl PolarCoefficients {
    pub const fn new(a0: f32, a1: f32, a2: f32) -> Self { Self { a0, a1, a2 } }

    /// Fits the polar through stored calibration points.
    pub fn fit(points: &PolarPoints, ballast_pct: f32, bugs_pct: f32) -> Self {
        let [p1, p2, p3] = *points.points();
        fit_polar(p1.speed, p1.sink, p2.speed, p2.sink, p3.speed, p3.sink, ballast_pct, bugs_pct)
    }

    pub fn a0(&self) -> f32 { self.a0 }
    pub fn a1(&self) -> f32 { self.a1 }
    pub fn a2(&self) -> f32 { self.a2 }

    /// A usable polar is a downward opening parabola with its vertex at positive speed
    /// and a negative offset.
    pub fn is_valid(&self) -> bool { self.a2 < 0.0 && self.a1 > 0.0 && self.a0 < 0.0 }

    /// Sink at `v` m/s for load factor `n`. Callers floor `n` before.
    pub fn sink_at(&self, v: f32, n: f32) -> f32 {
        let sqn = n.sqrt();
        self.a0 * n * sqn + self.a1 * v * n + self.a2 * v * v * sqn
    }

    /// Speed of minimum sink in m/s, the vertex of the parabola.
    pub fn vertex_speed(&self) -> f32 { -self.a1 / (2.0 * self.a2) }
}

/// Fits the unique quadratic through three `(km/h, m/s)` points and applies wingloading
/// and bug degradation.
///
/// Degenerate input (equal speeds, no curvature) yields zero coefficients that fail
/// [`PolarCoefficients::is_valid`].
///
/// # Arguments
/// - `v1`, `v2`, `v3`: Calibration airspeeds in km/h.
/// - `w1`, `w2`, `w3`: Sink rates at those airspeeds in m/s.
/// - `ballast_pct`: Overweight relative to the polar reference mass in percent.
/// - `bugs_pct`: Performance degradation in percent.
#[allow(
    clippy::too_many_arguments,
    clippy::many_single_char_names,
    clippy::float_cmp,
    clippy::shadow_reuse
)]
pub fn fit_polar(
    v1: f32,
    w1: f32,
    v2: f32,
    w2: f32,
    v3: f32,
    w3: f32,
    ballast_pct: f32,
    bugs_pct: f32,
) -> PolarCoefficients {
    let (v1, v2, v3) = (kmh_to_ms(v1), kmh_to_ms(v2), kmh_to_ms(v3));
    let d = v1 * v1 * (v2 - v3) + v2 * v2 * (v3 - v1) + v3 * v3 * (v1 - v2);
    let a2 = if d == 0.0 { 0.0 } else { ((v2 - v3) * (w1 - w3) + (v3 - v1) * (w2 - w3)) / d };
    let dv = v2 - v3;
    let a1 = if dv == 0.0 { 0.0 } else { (w2 - w3 - a2 * (v2 * v2 - v3 * v3)) / dv };
    let a0 = w3 - a2 * v3 * v3 - a1 * v3;

    // heavier wing: higher sink at a proportionally higher speed
    let lf = loading_factor(ballast_pct);
    let bugs = (bugs_pct + 100.0) / 100.0;
    let coeffs = PolarCoefficients::new(a0 * lf * bugs, a1 * bugs, a2 / lf * bugs);
    if coeffs.a0.is_finite() && coeffs.a1.is_finite() && coeffs.a2.is_finite() {
        coeffs
    } else {
        PolarCoefficients::default()
    }
}
