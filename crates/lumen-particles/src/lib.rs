//! Lumen Particles - pooled 2D particle simulation
//!
//! Provides:
//! - `Particle` state with a bounded, fading trail
//! - `ParticlePool`: capped, swap-remove pool with O(1) release by id
//! - `PhysicsSolver` trait and the default `ForceFieldPhysics`
//! - `InputSource` trait and `PointerInput` for mouse/touch/wheel forces

pub mod input;
pub mod particle;
pub mod physics;
pub mod pool;

pub use input::{InputSource, NoInput, PointerButton, PointerConfig, PointerInput};
pub use particle::{Particle, ParticleOptions, TrailPoint, UserData};
pub use physics::{
    hash_noise, ForceField, ForceFieldPhysics, ForceKind, PhysicsParameters, PhysicsSolver,
    PhysicsSummary,
};
pub use pool::{ParticleId, ParticlePool};
