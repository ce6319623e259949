//! Drawing surface abstraction used by the batch renderer

use lumen_core::{Color, Vec2};
use serde::{Deserialize, Serialize};

/// Compositing operator for particle fills
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    SourceOver,
    /// Additive
    Lighter,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

/// Radial gradient from `center` (t = 0) out to `radius` (t = 1), in the
/// coordinate space current when the fill is used
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub radius: f32,
    stops: Vec<GradientStop>,
}

impl RadialGradient {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius,
            stops: Vec::new(),
        }
    }

    /// Stops are kept sorted by offset; offsets are clamped to [0, 1]
    pub fn add_stop(mut self, offset: f32, color: Color) -> Self {
        let offset = offset.clamp(0.0, 1.0);
        let at = self.stops.partition_point(|s| s.offset <= offset);
        self.stops.insert(at, GradientStop { offset, color });
        self
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Linearly interpolated color at `t`
    pub fn color_at(&self, t: f32) -> Color {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Color::TRANSPARENT,
        };
        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = b.offset - a.offset;
                let k = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
                return lerp_color(a.color, b.color, k);
            }
        }
        last.color
    }
}

fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color::rgba(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Radial(RadialGradient),
}

/// Immediate-mode 2D surface with a saveable state stack, in the manner of
/// an HTML canvas context. Coordinates are pixels, y down.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Resize, discarding the current contents
    fn resize(&mut self, width: u32, height: u32);

    /// Overwrite every pixel with `color`, ignoring blend mode and transform
    fn clear(&mut self, color: Color);

    /// Push the full drawing state (transform, alpha, fill, shadow, blend)
    fn save(&mut self);
    /// Pop the drawing state; unbalanced calls are ignored
    fn restore(&mut self);

    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, factor: f32);

    fn set_global_alpha(&mut self, alpha: f32);
    fn set_blend_mode(&mut self, mode: BlendMode);
    fn set_smoothing(&mut self, enabled: bool);
    fn set_fill(&mut self, paint: Paint);
    /// Blur radius 0 disables the shadow
    fn set_shadow(&mut self, color: Color, blur: f32);

    fn fill_circle(&mut self, center: Vec2, radius: f32);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
}
