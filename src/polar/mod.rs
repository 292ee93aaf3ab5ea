//! Quadratic polar model: curve fit, load and ballast correction and speed-to-fly.

mod coefficients;
pub mod mass;
mod polar_model;
mod polar_points;
#[cfg(test)]
mod tests;

pub use coefficients::{fit_polar, PolarCoefficients};
pub use polar_model::PolarModel;
pub use polar_points::{GliderPolar, PolarPoint, PolarPoints};
