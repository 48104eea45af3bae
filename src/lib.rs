pub mod advance;
pub mod burst;
pub mod color;
pub mod config;
pub mod counter;
pub mod engine;
pub mod frame;
pub mod gift;
pub mod particle;
pub mod render;
pub mod simulation;
pub mod surface;

pub use config::{ConfigError, FireworksConfig};
pub use engine::{EngineError, FireworksEngine};
pub use frame::{FrameHandle, FrameQueue, FrameScheduler};
