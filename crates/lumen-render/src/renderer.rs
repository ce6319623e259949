//! Style-batched particle renderer

use crate::canvas::{BlendMode, Canvas, Paint, RadialGradient};
use lumen_core::{Color, LumenError, Vec2};
use lumen_particles::Particle;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Instant;

/// Particles smaller than this are stamped as a single pixel
const PIXEL_SIZE_LIMIT: f32 = 2.0;
/// Particles glowing more than this get a radial-gradient stamp
const GRADIENT_GLOW_LIMIT: f32 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderQuality {
    Low,
    Medium,
    #[default]
    High,
}

impl FromStr for RenderQuality {
    type Err = LumenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(LumenError::InvalidParameter(format!(
                "unknown render quality '{other}'"
            ))),
        }
    }
}

/// Per-frame drawing switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub show_trail: bool,
    pub show_glow: bool,
    /// Stable sort by ascending alpha before grouping
    pub sort_by_depth: bool,
    pub blend_mode: BlendMode,
    pub smoothing: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::for_quality(RenderQuality::High)
    }
}

impl RenderOptions {
    pub fn for_quality(quality: RenderQuality) -> Self {
        let mut options = Self {
            show_trail: true,
            show_glow: true,
            sort_by_depth: false,
            blend_mode: BlendMode::SourceOver,
            smoothing: true,
        };
        options.apply_quality(quality);
        options
    }

    /// Overwrite the glow/trail/smoothing switches with a preset
    pub fn apply_quality(&mut self, quality: RenderQuality) {
        let (glow, trail, smoothing) = match quality {
            RenderQuality::Low => (false, false, false),
            RenderQuality::Medium => (true, false, true),
            RenderQuality::High => (true, true, true),
        };
        self.show_glow = glow;
        self.show_trail = trail;
        self.smoothing = smoothing;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderStats {
    pub fps: f32,
    pub render_time_ms: f32,
    pub width: u32,
    pub height: u32,
    pub pixel_count: u64,
}

/// Batch key: particles sharing it share fill and shadow state.
/// Floats compare by bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleKey {
    pub color: Color,
    glow: u32,
    size: u32,
}

impl StyleKey {
    pub fn of(particle: &Particle) -> Self {
        Self {
            color: particle.color,
            glow: particle.glow.to_bits(),
            size: particle.size.to_bits(),
        }
    }

    pub fn glow(&self) -> f32 {
        f32::from_bits(self.glow)
    }

    pub fn size(&self) -> f32 {
        f32::from_bits(self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stamp {
    Pixel,
    Gradient,
    Circle,
}

fn stamp_for(size: f32, glow: f32) -> Stamp {
    if size < PIXEL_SIZE_LIMIT {
        Stamp::Pixel
    } else if glow > GRADIENT_GLOW_LIMIT {
        Stamp::Gradient
    } else {
        Stamp::Circle
    }
}

/// Draws particle sets onto an owned canvas, one state application per
/// style group. Group order is first-seen order.
pub struct BatchRenderer<C: Canvas> {
    canvas: C,
    background: Color,
    // Reused across frames
    group_index: HashMap<StyleKey, usize>,
    groups: Vec<(StyleKey, Vec<usize>)>,
    order: Vec<usize>,
    last_group_count: usize,
    state_changes: usize,
    shadow_set: bool,
    // FPS window
    frames_in_window: u32,
    window_start: Instant,
    stats: RenderStats,
}

impl<C: Canvas> BatchRenderer<C> {
    pub fn new(canvas: C, background: Color) -> Self {
        let stats = RenderStats {
            width: canvas.width(),
            height: canvas.height(),
            pixel_count: canvas.width() as u64 * canvas.height() as u64,
            ..Default::default()
        };
        Self {
            canvas,
            background,
            group_index: HashMap::new(),
            groups: Vec::new(),
            order: Vec::new(),
            last_group_count: 0,
            state_changes: 0,
            shadow_set: false,
            frames_in_window: 0,
            window_start: Instant::now(),
            stats,
        }
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Fill with the background (transparent background clears to
    /// transparent). Leaves the blend mode as it was.
    pub fn clear(&mut self) {
        self.canvas.save();
        self.canvas.set_blend_mode(BlendMode::SourceOver);
        self.canvas.clear(self.background);
        self.canvas.restore();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.resize(width, height);
        self.stats.width = width;
        self.stats.height = height;
        self.stats.pixel_count = width as u64 * height as u64;
    }

    /// Style groups drawn by the last `render_frame`
    pub fn last_group_count(&self) -> usize {
        self.last_group_count
    }

    /// Fill/shadow changes issued by the last `render_frame`
    pub fn state_changes(&self) -> usize {
        self.state_changes
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    pub fn render_frame(&mut self, particles: &[Particle], options: &RenderOptions) {
        let started = Instant::now();
        self.state_changes = 0;

        self.order.clear();
        self.order.extend(
            particles
                .iter()
                .enumerate()
                .filter(|(_, p)| p.visible && p.alpha > 0.0)
                .map(|(i, _)| i),
        );
        if options.sort_by_depth {
            // sort_by is stable: equal alphas keep caller order
            self.order
                .sort_by(|&a, &b| particles[a].alpha.total_cmp(&particles[b].alpha));
        }

        self.group_index.clear();
        for (_, members) in &mut self.groups {
            members.clear();
        }
        let mut used = 0;
        for &i in &self.order {
            let key = StyleKey::of(&particles[i]);
            let slot = *self.group_index.entry(key).or_insert_with(|| {
                used += 1;
                used - 1
            });
            if slot == self.groups.len() {
                self.groups.push((key, Vec::new()));
            }
            self.groups[slot].0 = key;
            self.groups[slot].1.push(i);
        }
        self.last_group_count = used;

        self.canvas.set_blend_mode(options.blend_mode);
        self.canvas.set_smoothing(options.smoothing);

        let groups = std::mem::take(&mut self.groups);
        for (key, members) in groups.iter().take(used) {
            self.draw_group(*key, members, particles, options);
        }
        self.groups = groups;

        self.canvas.set_blend_mode(BlendMode::SourceOver);
        self.finish_frame(started);
    }

    fn draw_group(
        &mut self,
        key: StyleKey,
        members: &[usize],
        particles: &[Particle],
        options: &RenderOptions,
    ) {
        // The stamp tier follows the particle's glow; show_glow only gates the shadow
        let glow = key.glow();
        let size = key.size();

        if options.show_glow && glow > 0.0 {
            self.canvas.set_shadow(key.color, glow);
            self.state_changes += 1;
            self.shadow_set = true;
        } else if self.shadow_set {
            self.canvas.set_shadow(Color::TRANSPARENT, 0.0);
            self.state_changes += 1;
            self.shadow_set = false;
        }

        let solid = Paint::Solid(key.color);
        let mut fill_is_solid = false;

        if options.show_trail && members.iter().any(|&i| !particles[i].trail.is_empty()) {
            self.canvas.set_fill(solid.clone());
            self.state_changes += 1;
            fill_is_solid = true;
            for &i in members {
                self.draw_trail(&particles[i]);
            }
        }

        let stamp = stamp_for(size, glow);
        match stamp {
            Stamp::Gradient => {
                let reach = size + glow;
                let gradient = RadialGradient::new(Vec2::ZERO, reach)
                    .add_stop(0.0, key.color)
                    .add_stop(0.7, key.color)
                    .add_stop(1.0, key.color.with_alpha(0.0));
                self.canvas.set_fill(Paint::Radial(gradient));
                self.state_changes += 1;
            }
            Stamp::Pixel | Stamp::Circle if !fill_is_solid => {
                self.canvas.set_fill(solid);
                self.state_changes += 1;
            }
            _ => {}
        }

        for &i in members {
            let p = &particles[i];
            self.canvas.save();
            self.place(p);
            match stamp {
                Stamp::Pixel => self.canvas.fill_rect(-0.5, -0.5, 1.0, 1.0),
                Stamp::Gradient => self.canvas.fill_circle(Vec2::ZERO, size + glow),
                Stamp::Circle => self.canvas.fill_circle(Vec2::ZERO, size),
            }
            self.canvas.restore();
        }

        if self.shadow_set {
            self.canvas.set_shadow(Color::TRANSPARENT, 0.0);
            self.state_changes += 1;
            self.shadow_set = false;
        }
    }

    /// Translate, rotate, scale into particle space; alpha = particle alpha
    fn place(&mut self, p: &Particle) {
        self.canvas.set_global_alpha(p.alpha);
        self.canvas.translate(p.position.x, p.position.y);
        self.canvas.rotate(p.rotation);
        self.canvas.scale(p.scale);
    }

    fn draw_trail(&mut self, p: &Particle) {
        if p.trail.is_empty() {
            return;
        }
        let len = p.trail.len() as f32;
        self.canvas.save();
        self.place(p);
        for (i, point) in p.trail.iter().enumerate() {
            let radius = p.size * (i as f32 / len) * 0.5;
            if radius <= 0.0 || point.alpha <= 0.0 {
                continue;
            }
            self.canvas.set_global_alpha(point.alpha * 0.3);
            self.canvas.fill_circle(point.position - p.position, radius);
        }
        self.canvas.restore();
    }

    fn finish_frame(&mut self, started: Instant) {
        self.stats.render_time_ms = started.elapsed().as_secs_f32() * 1000.0;
        self.frames_in_window += 1;
        let window = self.window_start.elapsed().as_secs_f32();
        if window >= 1.0 {
            self.stats.fps = self.frames_in_window as f32 / window;
            self.frames_in_window = 0;
            self.window_start = Instant::now();
        }
        tracing::trace!(
            groups = self.last_group_count,
            state_changes = self.state_changes,
            ms = self.stats.render_time_ms,
            "frame rendered"
        );
    }
}
