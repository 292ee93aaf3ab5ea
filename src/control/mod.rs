//! Runtime wiring of the advisor: shared model state, configuration events and the
//! periodic sensor loop.

mod config_event;
mod context;
mod outputs;
mod sensor_feed;
mod supervisor;
#[cfg(test)]
mod tests;

pub use config_event::ConfigEvent;
pub use context::AdvisorContext;
pub use outputs::AdvisoryOutputs;
pub use sensor_feed::{SensorFeed, SensorSample};
pub use supervisor::Supervisor;
