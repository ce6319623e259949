//! Force-field physics: global forces, radial fields, Euler integration

use crate::particle::Particle;
use lumen_core::{Bounds, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceKind {
    Attraction,
    Repulsion,
    Vortex,
    Noise,
}

/// A circular force field. Strength falls off linearly to zero at `radius`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceField {
    pub x: f32,
    pub y: f32,
    pub kind: ForceKind,
    pub strength: f32,
    pub radius: f32,
}

impl ForceField {
    pub fn new(kind: ForceKind, x: f32, y: f32, strength: f32, radius: f32) -> Self {
        Self {
            x,
            y,
            kind,
            strength,
            radius,
        }
    }

    pub fn attraction(x: f32, y: f32, strength: f32, radius: f32) -> Self {
        Self::new(ForceKind::Attraction, x, y, strength, radius)
    }

    pub fn repulsion(x: f32, y: f32, strength: f32, radius: f32) -> Self {
        Self::new(ForceKind::Repulsion, x, y, strength, radius)
    }

    pub fn vortex(x: f32, y: f32, strength: f32, radius: f32) -> Self {
        Self::new(ForceKind::Vortex, x, y, strength, radius)
    }

    pub fn noise(x: f32, y: f32, strength: f32, radius: f32) -> Self {
        Self::new(ForceKind::Noise, x, y, strength, radius)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Force exerted on a particle at `position`; zero outside the radius
    /// and at the exact center.
    pub fn force_at(&self, position: Vec2) -> Vec2 {
        let offset = self.center() - position;
        let distance = offset.length();
        if distance == 0.0 || distance >= self.radius {
            return Vec2::ZERO;
        }

        let falloff = self.strength * (1.0 - distance / self.radius);
        let toward = offset * (1.0 / distance);
        match self.kind {
            ForceKind::Attraction => toward * falloff,
            ForceKind::Repulsion => -toward * falloff,
            ForceKind::Vortex => toward.perp() * falloff,
            ForceKind::Noise => {
                let p = position * 0.01;
                Vec2::new(
                    hash_noise(p.x, p.y) * self.strength,
                    hash_noise(p.x + 100.0, p.y + 100.0) * self.strength,
                )
            }
        }
    }
}

/// Cheap deterministic noise in [-1, 1)
pub fn hash_noise(x: f32, y: f32) -> f32 {
    let n = (x * 12.9898 + y * 78.233).sin() * 43758.5453;
    (n - n.floor()) * 2.0 - 1.0
}

/// Partial update for solver settings; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParameters {
    pub gravity: Option<Vec2>,
    pub wind: Option<Vec2>,
    pub friction: Option<f32>,
    pub bounce: Option<f32>,
    pub time_scale: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhysicsSummary {
    pub gravity: Vec2,
    pub wind: Vec2,
    pub friction: f32,
    pub bounce: f32,
    pub time_scale: f32,
    pub force_fields: usize,
    pub input_forces: usize,
}

/// Advances particle motion. The engine calls `update` once per frame with
/// the clamped frame delta in milliseconds.
pub trait PhysicsSolver {
    fn update(&mut self, particles: &mut [Particle], delta_ms: f32, bounds: Bounds);
    fn add_force_field(&mut self, field: ForceField);
    fn clear_force_fields(&mut self);
    fn set_parameters(&mut self, params: &PhysicsParameters);
    /// Replace last frame's input-driven forces
    fn set_input_forces(&mut self, forces: Vec<ForceField>);
    fn summary(&self) -> PhysicsSummary;
}

/// Default solver. Integrates in seconds; velocities are px/s and forces px/s².
pub struct ForceFieldPhysics {
    pub gravity: Vec2,
    pub wind: Vec2,
    /// Multiplies each particle's own friction
    pub friction: f32,
    /// Multiplies each particle's own bounce
    pub bounce: f32,
    pub time_scale: f32,
    fields: Vec<ForceField>,
    input_forces: Vec<ForceField>,
}

impl ForceFieldPhysics {
    pub fn new() -> Self {
        Self {
            gravity: Vec2::new(0.0, 9.8),
            wind: Vec2::ZERO,
            friction: 1.0,
            bounce: 1.0,
            time_scale: 1.0,
            fields: Vec::new(),
            input_forces: Vec::new(),
        }
    }

    pub fn force_fields(&self) -> &[ForceField] {
        &self.fields
    }

    fn step(&self, p: &mut Particle, dt: f32, bounds: Bounds) {
        p.prev_position = p.position;

        p.apply_force(self.gravity + self.wind);
        for field in self.fields.iter().chain(&self.input_forces) {
            p.apply_force(field.force_at(p.position));
        }

        // Semi-implicit Euler
        p.velocity += p.acceleration * dt;
        p.velocity = p.velocity * (p.friction * self.friction);
        p.position += p.velocity * dt;
        p.acceleration = Vec2::ZERO;

        let bounce = p.bounce * self.bounce;
        if p.position.x < 0.0 {
            p.position.x = 0.0;
            p.velocity.x *= -bounce;
        } else if p.position.x > bounds.width {
            p.position.x = bounds.width;
            p.velocity.x *= -bounce;
        }
        if p.position.y < 0.0 {
            p.position.y = 0.0;
            p.velocity.y *= -bounce;
        } else if p.position.y > bounds.height {
            p.position.y = bounds.height;
            p.velocity.y *= -bounce;
        }

        p.record_trail();

        p.rotation += p.rotation_speed * dt;
        p.scale = (p.scale + p.scale_speed * dt).clamp(0.1, 5.0);

        if p.decay > 0.0 {
            p.life -= p.decay * dt;
            if p.life <= 0.0 {
                p.active = false;
            }
            if p.max_life > 0.0 {
                p.alpha = p.life_ratio();
            }
        }
    }
}

impl Default for ForceFieldPhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsSolver for ForceFieldPhysics {
    fn update(&mut self, particles: &mut [Particle], delta_ms: f32, bounds: Bounds) {
        let dt = delta_ms / 1000.0 * self.time_scale;
        if dt <= 0.0 {
            return;
        }
        for p in particles.iter_mut().filter(|p| p.active) {
            self.step(p, dt, bounds);
        }
    }

    fn add_force_field(&mut self, field: ForceField) {
        self.fields.push(field);
    }

    fn clear_force_fields(&mut self) {
        self.fields.clear();
    }

    fn set_parameters(&mut self, params: &PhysicsParameters) {
        if let Some(gravity) = params.gravity {
            self.gravity = gravity;
        }
        if let Some(wind) = params.wind {
            self.wind = wind;
        }
        if let Some(friction) = params.friction {
            self.friction = friction;
        }
        if let Some(bounce) = params.bounce {
            self.bounce = bounce;
        }
        if let Some(time_scale) = params.time_scale {
            self.time_scale = time_scale.max(0.0);
        }
    }

    fn set_input_forces(&mut self, forces: Vec<ForceField>) {
        self.input_forces = forces;
    }

    fn summary(&self) -> PhysicsSummary {
        PhysicsSummary {
            gravity: self.gravity,
            wind: self.wind,
            friction: self.friction,
            bounce: self.bounce,
            time_scale: self.time_scale,
            force_fields: self.fields.len(),
            input_forces: self.input_forces.len(),
        }
    }
}
