//! Options for bulk particle creation from sampled points

use lumen_core::{Color, Vec2};
use lumen_geometry::{DelayMode, SampledPoint};
use lumen_particles::{ParticleOptions, UserData};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnOptions {
    /// Used when the point carries no merged size
    pub size: f32,
    /// Fixed color; a random saturated color per particle when absent
    pub color: Option<Color>,
    pub glow: f32,
    pub mass: f32,
    pub friction: f32,
    pub bounce: f32,
    pub life: f32,
    pub decay: f32,
    pub trail_length: usize,
    pub velocity: Vec2,
    /// Center the new particles on the canvas
    pub center: bool,
    /// Scale SVG artwork so it fills this fraction of the canvas
    pub fit: Option<f32>,
    pub delay: Option<DelayMode>,
}

impl Default for SpawnOptions {
    fn default() -> Self {
        Self {
            size: 3.0,
            color: None,
            glow: 0.0,
            mass: 1.0,
            friction: 0.99,
            bounce: 0.8,
            life: 1.0,
            decay: 0.0,
            trail_length: 10,
            velocity: Vec2::ZERO,
            center: true,
            fit: None,
            delay: None,
        }
    }
}

impl SpawnOptions {
    pub fn particle_options(&self, point: &SampledPoint, color: Color) -> ParticleOptions {
        ParticleOptions {
            velocity: self.velocity,
            size: point.size.unwrap_or(self.size),
            color,
            alpha: point.alpha,
            glow: self.glow,
            mass: self.mass,
            friction: self.friction,
            bounce: self.bounce,
            life: self.life,
            max_life: self.life,
            decay: self.decay,
            max_trail_length: self.trail_length,
            user_data: Some(UserData {
                origin: point.original.unwrap_or(point.position),
                shape_index: Some(point.shape_index),
                delay: point.delay,
            }),
            ..Default::default()
        }
    }
}
