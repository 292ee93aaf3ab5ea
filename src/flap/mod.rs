//! Flap advisory engine.
//!
//! A [`LevelTable`] holds the configured flap positions. Whenever it changes a
//! [`PreparedTable`] with ballast corrected speeds and interpolation deltas is derived
//! from it, all lookups go through the prepared table only.

mod flap_advisor;
mod flap_level;
mod flap_sensor;
mod level_table;
mod prepared_table;

pub use flap_advisor::{FlapAdvisor, FlapTableError, LevelEdit};
pub use flap_level::{FlapLabel, FlapLevel, PreparedLevel};
pub use flap_sensor::{sensor_available, FlapSensor, SENSOR_RAW_MAX};
pub use level_table::LevelTable;
pub use prepared_table::PreparedTable;

/// Maximum number of configurable flap positions.
pub const MAX_POSITIONS: usize = 7;
