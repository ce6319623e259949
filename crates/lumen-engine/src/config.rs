//! Engine configuration, runtime parameter updates and state snapshots

use crate::stats::PerformanceStats;
use lumen_core::{Color, LumenError, Result};
use lumen_geometry::SamplerConfig;
use lumen_particles::{PhysicsParameters, PhysicsSummary, PointerConfig};
use lumen_render::{BlendMode, RenderOptions, RenderQuality, RenderStats};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine construction settings. Every field has a default, so a TOML file
/// only needs the keys it changes.
///
/// ```toml
/// max_particles = 2000
/// background = "#101018"
/// quality = "medium"
///
/// [physics]
/// gravity = { x = 0.0, y = 0.0 }
///
/// [sampler]
/// spacing = 4.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_particles: usize,
    pub target_fps: u32,
    /// Start running as soon as the engine is built
    pub auto_start: bool,
    pub background: Color,
    /// Overrides the quality-dependent fields of `render`
    pub quality: Option<RenderQuality>,
    pub render: RenderOptions,
    pub physics: PhysicsParameters,
    pub pointer: PointerConfig,
    pub sampler: SamplerConfig,
    /// Seed for colors, jitter and delays; time-based when absent
    pub seed: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_particles: 10_000,
            target_fps: 60,
            auto_start: false,
            background: Color::BLACK,
            quality: None,
            render: RenderOptions::default(),
            physics: PhysicsParameters::default(),
            pointer: PointerConfig::default(),
            sampler: SamplerConfig::default(),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            LumenError::TomlParse(msg) => {
                LumenError::Config(format!("Failed to parse {}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_fps == 0 {
            return Err(LumenError::Config("target_fps must be positive".into()));
        }
        if !self.sampler.spacing.is_finite() || self.sampler.spacing <= 0.0 {
            return Err(LumenError::Config(format!(
                "sampler.spacing must be positive, got {}",
                self.sampler.spacing
            )));
        }
        if self.sampler.quality == 0 {
            return Err(LumenError::Config("sampler.quality must be at least 1".into()));
        }
        if let Some(scale) = self.physics.time_scale {
            if scale < 0.0 {
                return Err(LumenError::Config(format!(
                    "physics.time_scale must not be negative, got {scale}"
                )));
            }
        }
        Ok(())
    }

    /// Render options with `quality` folded in
    pub fn effective_render_options(&self) -> RenderOptions {
        let mut options = self.render.clone();
        if let Some(quality) = self.quality {
            options.apply_quality(quality);
        }
        options
    }
}

/// Partial runtime update; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParameters {
    pub max_particles: Option<usize>,
    pub target_fps: Option<u32>,
    pub physics: Option<PhysicsParameters>,
    pub quality: Option<RenderQuality>,
    pub show_glow: Option<bool>,
    pub show_trail: Option<bool>,
    pub sort_by_depth: Option<bool>,
    pub blend_mode: Option<BlendMode>,
    pub background: Option<Color>,
}

/// Serializable snapshot for diagnostics and host UIs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineState {
    pub running: bool,
    pub paused: bool,
    pub particle_count: usize,
    pub max_particles: usize,
    pub frame_count: u64,
    pub target_fps: u32,
    pub performance: PerformanceStats,
    pub physics: PhysicsSummary,
    pub render: RenderStats,
}
