//! Particle state, spawn options and the bounded trail buffer

use lumen_core::{Color, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One recorded trail position with its faded alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrailPoint {
    pub position: Vec2,
    pub alpha: f32,
}

/// Where a particle came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    /// Outline position the particle belongs to (pre-jitter when known)
    pub origin: Vec2,
    /// Source shape in document order
    pub shape_index: Option<usize>,
    /// Reveal delay in seconds
    pub delay: Option<f32>,
}

/// Initial values for a newly acquired particle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleOptions {
    pub velocity: Vec2,
    pub size: f32,
    pub color: Color,
    pub alpha: f32,
    pub glow: f32,
    pub mass: f32,
    /// Velocity multiplier applied every physics step
    pub friction: f32,
    /// Velocity retained (and reflected) on a boundary hit
    pub bounce: f32,
    pub life: f32,
    pub max_life: f32,
    /// Life lost per second; 0 means immortal
    pub decay: f32,
    pub max_trail_length: usize,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub scale: f32,
    pub scale_speed: f32,
    /// Defaults to the spawn position as origin
    pub user_data: Option<UserData>,
}

impl Default for ParticleOptions {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            size: 3.0,
            color: Color::WHITE,
            alpha: 1.0,
            glow: 0.0,
            mass: 1.0,
            friction: 0.99,
            bounce: 0.8,
            life: 1.0,
            max_life: 1.0,
            decay: 0.0,
            max_trail_length: 10,
            rotation: 0.0,
            rotation_speed: 0.0,
            scale: 1.0,
            scale_speed: 0.0,
            user_data: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub prev_position: Vec2,
    pub velocity: Vec2,
    /// Accumulated force / mass; cleared after each integration step
    pub acceleration: Vec2,
    pub size: f32,
    pub color: Color,
    pub alpha: f32,
    pub glow: f32,
    pub mass: f32,
    pub friction: f32,
    pub bounce: f32,
    pub life: f32,
    pub max_life: f32,
    pub decay: f32,
    pub trail: VecDeque<TrailPoint>,
    pub max_trail_length: usize,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub scale: f32,
    pub scale_speed: f32,
    pub user_data: UserData,
    /// Cleared by physics on death; the engine sweeps inactive particles
    pub active: bool,
    pub visible: bool,
}

impl Particle {
    /// A free-pool particle: inactive, invisible, empty trail
    pub fn inert() -> Self {
        let mut p = Self::spawned(Vec2::ZERO, &ParticleOptions::default());
        p.active = false;
        p.visible = false;
        p
    }

    pub fn spawned(position: Vec2, options: &ParticleOptions) -> Self {
        let mut p = Self {
            position,
            prev_position: position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            size: 0.0,
            color: Color::WHITE,
            alpha: 1.0,
            glow: 0.0,
            mass: 1.0,
            friction: 1.0,
            bounce: 0.0,
            life: 1.0,
            max_life: 1.0,
            decay: 0.0,
            trail: VecDeque::new(),
            max_trail_length: 0,
            rotation: 0.0,
            rotation_speed: 0.0,
            scale: 1.0,
            scale_speed: 0.0,
            user_data: UserData::default(),
            active: true,
            visible: true,
        };
        p.reset(position, options);
        p
    }

    /// Reinitialize in place, keeping the trail allocation
    pub fn reset(&mut self, position: Vec2, options: &ParticleOptions) {
        self.position = position;
        self.prev_position = position;
        self.velocity = options.velocity;
        self.acceleration = Vec2::ZERO;
        self.size = options.size;
        self.color = options.color;
        self.alpha = options.alpha;
        self.glow = options.glow;
        self.mass = if options.mass > 0.0 { options.mass } else { 1.0 };
        self.friction = options.friction;
        self.bounce = options.bounce;
        self.life = options.life;
        self.max_life = options.max_life;
        self.decay = options.decay;
        self.trail.clear();
        self.max_trail_length = options.max_trail_length;
        self.rotation = options.rotation;
        self.rotation_speed = options.rotation_speed;
        self.scale = options.scale;
        self.scale_speed = options.scale_speed;
        self.user_data = options.user_data.unwrap_or(UserData {
            origin: position,
            ..UserData::default()
        });
        self.active = true;
        self.visible = true;
    }

    /// Return to the inert free-pool state
    pub fn retire(&mut self) {
        self.active = false;
        self.visible = false;
        self.trail.clear();
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
    }

    /// Accumulate a force for the next integration step
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force * (1.0 / self.mass);
    }

    /// Push the previous position and refade the whole trail
    pub fn record_trail(&mut self) {
        if self.max_trail_length == 0 {
            return;
        }
        self.trail.push_back(TrailPoint {
            position: self.prev_position,
            alpha: self.alpha,
        });
        while self.trail.len() > self.max_trail_length {
            self.trail.pop_front();
        }
        let len = self.trail.len() as f32;
        for (i, point) in self.trail.iter_mut().enumerate() {
            point.alpha = (i as f32 / len) * self.alpha * 0.5;
        }
    }

    /// Life remaining in [0, 1]
    pub fn life_ratio(&self) -> f32 {
        if self.max_life <= 0.0 {
            1.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}
