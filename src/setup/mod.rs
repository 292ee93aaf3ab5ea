//! Configuration seam of the advisor.
//!
//! The advisor never owns persistent storage. Everything it needs is read through the
//! [`SetupStore`] accessors and the flap table is written back through the same trait.

pub mod legacy;
mod memory_store;
mod setup_store;
mod tuning;

pub use memory_store::{MemorySetupStore, SetupValues};
pub use setup_store::{FlapSlot, SetupError, SetupStore};
pub use tuning::AdvisorTuning;
