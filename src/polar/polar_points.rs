use serde::{Deserialize, Serialize};

/// Relative tolerance used when comparing stored polar values.
const POLAR_EQ_TOLERANCE: f32 = 1e-4;

/// A single measured point of the sink polar.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolarPoint {
    /// Airspeed in km/h.
    pub speed: f32,
    /// Sink rate in m/s at that airspeed.
    pub sink: f32,
}

impl PolarPoint {
    pub const fn new(speed: f32, sink: f32) -> Self { Self { speed, sink } }
}

/// The three calibration points the quadratic polar is fitted through.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolarPoints([PolarPoint; 3]);

impl PolarPoints {
    pub const fn new(points: [PolarPoint; 3]) -> Self { Self(points) }

    pub fn points(&self) -> &[PolarPoint; 3] { &self.0 }

    fn approx_eq(&self, other: &Self) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| {
            float_equal(a.speed, b.speed) && float_equal(a.sink, b.sink)
        })
    }
}

/// A complete glider polar record as shipped with a type catalogue or entered by the pilot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GliderPolar {
    pub points: PolarPoints,
    /// Reference wingload in kg/m².
    pub wingload: f32,
    /// Maximum water ballast in liters.
    pub max_ballast: f32,
    /// Wing area in m².
    pub wingarea: f32,
}

impl GliderPolar {
    /// Compares two polars field by field with a relative tolerance.
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.points.approx_eq(&other.points)
            && float_equal(self.wingload, other.wingload)
            && float_equal(self.max_ballast, other.max_ballast)
            && float_equal(self.wingarea, other.wingarea)
    }
}

fn float_equal(a: f32, b: f32) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= POLAR_EQ_TOLERANCE * scale
}
