//! Lumen Engine - the particle simulation loop
//!
//! Ties the other Lumen crates together:
//! - `Engine` owns the particle pool, steps physics, hands the live set to
//!   the batch renderer and dispatches `EngineEvent`s to subscribers
//! - `FrameClock` and `TimeSource` turn host timestamps into clamped steps
//! - `EngineConfig` / `EngineParameters` configure it from TOML or at runtime

pub mod clock;
pub mod config;
pub mod engine;
pub mod events;
pub mod spawn;
pub mod stats;

pub use clock::{FrameClock, FrameDelta, ManualClock, SystemClock, TimeSource, MAX_FRAME_DELTA};
pub use config::{EngineConfig, EngineParameters, EngineState};
pub use engine::{Engine, FrameOutcome, FrameToken, RunState, UpdateHook};
pub use events::{EngineEvent, EventBus, Subscriber, SubscriberId};
pub use spawn::SpawnOptions;
pub use stats::{PerformanceMonitor, PerformanceStats};
