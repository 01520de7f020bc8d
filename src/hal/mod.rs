// src/hal/mod.rs
//! Acquisition sources for the blink session

pub mod channel;
pub mod memory;
pub mod simulator;
pub mod traits;
pub mod types;

mod queue;

pub use channel::{ChannelFeeder, ChannelSource};
pub use memory::MemorySource;
pub use simulator::{BlinkSchedule, SimulatedEogSource, SimulatorConfig};
pub use traits::*;
pub use types::*;
