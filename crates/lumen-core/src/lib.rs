//! Lumen Core - Foundational types for the Lumen particle engine
//!
//! This crate provides the types that all other Lumen crates depend on:
//! - `Vec2`, `Bounds`, `Rect` - 2D spatial types
//! - `Color` - RGBA color with CSS-style parsing and HSL helpers
//! - `Rng` - small deterministic xorshift generator
//! - Error types and Result alias

mod color;
mod error;
mod rand;
mod types;

pub use color::Color;
pub use error::{LumenError, Result};
pub use rand::Rng;
pub use types::{Bounds, Rect, Vec2};
