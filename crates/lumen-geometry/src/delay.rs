//! Reveal-animation delay stamping

use crate::sampler::SampledPoint;
use lumen_core::{LumenError, Rng, Vec2};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How reveal delays are assigned across a sampled point sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DelayMode {
    /// `index * step`
    Sequential { step: f32 },
    /// Uniform in `[0, max)`
    Random { max: f32 },
    /// `sin(x / width) * amplitude`
    Wave { width: f32, amplitude: f32 },
    /// Distance from `center` (or the centroid) divided by `speed`
    Radial { center: Option<Vec2>, speed: f32 },
}

impl DelayMode {
    pub fn sequential() -> Self {
        Self::Sequential { step: 0.01 }
    }

    pub fn random() -> Self {
        Self::Random { max: 1.0 }
    }

    pub fn wave() -> Self {
        Self::Wave {
            width: 100.0,
            amplitude: 0.5,
        }
    }

    pub fn radial() -> Self {
        Self::Radial {
            center: None,
            speed: 200.0,
        }
    }
}

impl FromStr for DelayMode {
    type Err = LumenError;

    /// Mode names with default parameters
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::sequential()),
            "random" | "simultaneous" => Ok(Self::random()),
            "wave" => Ok(Self::wave()),
            "radial" => Ok(Self::radial()),
            other => Err(LumenError::InvalidParameter(format!(
                "unknown delay mode '{other}' (expected sequential, random, wave or radial)"
            ))),
        }
    }
}

/// Stamp `delay` on every point. Geometry is untouched.
pub fn assign_delays(points: &mut [SampledPoint], mode: DelayMode, rng: &mut Rng) {
    match mode {
        DelayMode::Sequential { step } => {
            for (i, p) in points.iter_mut().enumerate() {
                p.delay = Some(i as f32 * step);
            }
        }
        DelayMode::Random { max } => {
            for p in points.iter_mut() {
                p.delay = Some(rng.range(0.0, max));
            }
        }
        DelayMode::Wave { width, amplitude } => {
            let width = if width == 0.0 { 1.0 } else { width };
            for p in points.iter_mut() {
                p.delay = Some((p.position.x / width).sin() * amplitude);
            }
        }
        DelayMode::Radial { center, speed } => {
            if points.is_empty() {
                return;
            }
            let center = center.unwrap_or_else(|| centroid(points));
            let speed = if speed == 0.0 { 1.0 } else { speed };
            for p in points.iter_mut() {
                p.delay = Some(p.position.distance(center) / speed);
            }
        }
    }
}

fn centroid(points: &[SampledPoint]) -> Vec2 {
    let mut sum = Vec2::ZERO;
    for p in points {
        sum += p.position;
    }
    sum * (1.0 / points.len() as f32)
}
