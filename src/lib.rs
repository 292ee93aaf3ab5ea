#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
//! Speed-to-fly and flap advisory core of a glider flight instrument.
//!
//! [`polar`] models the glider's sink polar, [`flap`] recommends and measures flap
//! positions, [`setup`] is the configuration seam and [`control`] runs both models
//! against live sensor data.

pub mod common;
pub mod control;
pub mod flap;
pub mod logger;
pub mod polar;
pub mod setup;
