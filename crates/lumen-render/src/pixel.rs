//! Software rasterizer over an `image::RgbaImage`

use crate::canvas::{BlendMode, Canvas, Paint};
use image::{Rgba, RgbaImage};
use lumen_core::{Color, LumenError, Result, Vec2};
use std::path::Path;

/// 2D affine transform: `x' = a*x + c*y + e`, `y' = b*x + d*y + f`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Affine {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Affine {
    const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// `self * other`: apply `other` first
    fn then(&self, o: &Affine) -> Self {
        Self {
            a: self.a * o.a + self.c * o.b,
            b: self.b * o.a + self.d * o.b,
            c: self.a * o.c + self.c * o.d,
            d: self.b * o.c + self.d * o.d,
            e: self.a * o.e + self.c * o.f + self.e,
            f: self.b * o.e + self.d * o.f + self.f,
        }
    }

    fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Length scale for radii; exact for uniform scale + rotation
    fn radius_scale(&self) -> f32 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }
}

#[derive(Debug, Clone)]
struct DrawState {
    transform: Affine,
    alpha: f32,
    fill: Paint,
    shadow_color: Color,
    shadow_blur: f32,
    blend: BlendMode,
    smoothing: bool,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            fill: Paint::Solid(Color::BLACK),
            shadow_color: Color::TRANSPARENT,
            shadow_blur: 0.0,
            blend: BlendMode::SourceOver,
            smoothing: true,
        }
    }
}

/// CPU canvas. Colors are stored straight (not premultiplied).
pub struct PixelCanvas {
    image: RgbaImage,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            state: DrawState::default(),
            stack: Vec::new(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.image.width() || y >= self.image.height() {
            return None;
        }
        let Rgba([r, g, b, a]) = *self.image.get_pixel(x, y);
        Some(Color::rgba(r, g, b, a))
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| {
                LumenError::Image(format!("failed to save PNG {}: {e}", path.display()))
            })?;
        tracing::debug!(path = %path.display(), "saved canvas");
        Ok(())
    }

    fn assert_sized(&self) {
        assert!(
            self.image.width() > 0 && self.image.height() > 0,
            "PixelCanvas drawn before it was given a size"
        );
    }

    fn paint_color(&self, device: Vec2) -> Color {
        match &self.state.fill {
            Paint::Solid(color) => *color,
            Paint::Radial(gradient) => {
                let t = &self.state.transform;
                let center = t.apply(gradient.center);
                let radius = gradient.radius * t.radius_scale();
                if radius <= 0.0 {
                    return gradient.color_at(1.0);
                }
                gradient.color_at(device.distance(center) / radius)
            }
        }
    }

    /// Composite `color` at pixel (x, y) with extra opacity `coverage`
    fn blend_pixel(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        let [sr, sg, sb, sa] = color.to_f32();
        let src_a = sa * self.state.alpha * coverage;
        if src_a <= 0.0 {
            return;
        }

        let px = self.image.get_pixel_mut(x as u32, y as u32);
        let [dr, dg, db, da] = px.0.map(|v| v as f32 / 255.0);

        let (out, out_a) = match self.state.blend {
            BlendMode::SourceOver => {
                let out_a = src_a + da * (1.0 - src_a);
                let mix = |s: f32, d: f32| {
                    if out_a > 0.0 {
                        (s * src_a + d * da * (1.0 - src_a)) / out_a
                    } else {
                        0.0
                    }
                };
                ([mix(sr, dr), mix(sg, dg), mix(sb, db)], out_a)
            }
            BlendMode::Lighter => {
                let add = |s: f32, d: f32| (s * src_a + d * da).min(1.0);
                ([add(sr, dr), add(sg, dg), add(sb, db)], (src_a + da).min(1.0))
            }
        };

        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        *px = Rgba([to_u8(out[0]), to_u8(out[1]), to_u8(out[2]), to_u8(out_a)]);
    }

    /// Coverage of a pixel whose center is `distance` from the circle center
    fn circle_coverage(&self, distance: f32, radius: f32) -> f32 {
        if self.state.smoothing {
            (radius + 0.5 - distance).clamp(0.0, 1.0)
        } else if distance <= radius {
            1.0
        } else {
            0.0
        }
    }

    fn shadow_halo(&mut self, center: Vec2, radius: f32) {
        let blur = self.state.shadow_blur * self.state.transform.radius_scale();
        let color = self.state.shadow_color;
        if blur <= 0.0 || color.is_transparent() {
            return;
        }
        let outer = radius + blur;
        let Some((x0, y0, x1, y1)) = self.clip_span(center, outer) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = p.distance(center);
                if d > radius && d < outer {
                    let falloff = 1.0 - (d - radius) / blur;
                    self.blend_pixel(x, y, color, falloff * 0.5);
                }
            }
        }
    }

    /// Inclusive pixel bounds of a circle's box, clipped to the image
    fn clip_span(&self, center: Vec2, radius: f32) -> Option<(i64, i64, i64, i64)> {
        clip_box(
            (center.x - radius).floor(),
            (center.y - radius).floor(),
            (center.x + radius).ceil(),
            (center.y + radius).ceil(),
            self.image.width(),
            self.image.height(),
        )
    }
}

/// Clamp an inclusive pixel box to `[0, width) x [0, height)`; `None` when
/// nothing remains
fn clip_box(
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    width: u32,
    height: u32,
) -> Option<(i64, i64, i64, i64)> {
    if [x0, y0, x1, y1].iter().any(|v| v.is_nan()) {
        return None;
    }
    let x0 = (x0 as i64).max(0);
    let y0 = (y0 as i64).max(0);
    let x1 = (x1 as i64).min(width as i64 - 1);
    let y1 = (y1 as i64).min(height as i64 - 1);
    (x0 <= x1 && y0 <= y1).then_some((x0, y0, x1, y1))
}

impl Canvas for PixelCanvas {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width, height);
    }

    fn clear(&mut self, color: Color) {
        let fill = Rgba([color.r, color.g, color.b, color.a]);
        for px in self.image.pixels_mut() {
            *px = fill;
        }
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        let t = Affine {
            e: x,
            f: y,
            ..Affine::IDENTITY
        };
        self.state.transform = self.state.transform.then(&t);
    }

    fn rotate(&mut self, radians: f32) {
        if radians == 0.0 {
            return;
        }
        let (sin, cos) = radians.sin_cos();
        let r = Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        };
        self.state.transform = self.state.transform.then(&r);
    }

    fn scale(&mut self, factor: f32) {
        let s = Affine {
            a: factor,
            d: factor,
            ..Affine::IDENTITY
        };
        self.state.transform = self.state.transform.then(&s);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    fn set_smoothing(&mut self, enabled: bool) {
        self.state.smoothing = enabled;
    }

    fn set_fill(&mut self, paint: Paint) {
        self.state.fill = paint;
    }

    fn set_shadow(&mut self, color: Color, blur: f32) {
        self.state.shadow_color = color;
        self.state.shadow_blur = blur.max(0.0);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32) {
        self.assert_sized();
        if radius <= 0.0 {
            return;
        }
        let c = self.state.transform.apply(center);
        let r = radius * self.state.transform.radius_scale();

        self.shadow_halo(c, r);

        let Some((x0, y0, x1, y1)) = self.clip_span(c, r + 1.0) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = self.circle_coverage(p.distance(c), r);
                if coverage > 0.0 {
                    let color = self.paint_color(p);
                    self.blend_pixel(x, y, color, coverage);
                }
            }
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.assert_sized();
        let t = self.state.transform;
        let corners = [
            t.apply(Vec2::new(x, y)),
            t.apply(Vec2::new(x + width, y)),
            t.apply(Vec2::new(x, y + height)),
            t.apply(Vec2::new(x + width, y + height)),
        ];
        let min_x = corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let min_y = corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let max_y = corners.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);

        // Pixels whose centers fall inside the device-space bounding box
        let Some((x0, y0, x1, y1)) = clip_box(
            (min_x - 0.5).ceil(),
            (min_y - 0.5).ceil(),
            (max_x - 0.5).ceil() - 1.0,
            (max_y - 0.5).ceil() - 1.0,
            self.image.width(),
            self.image.height(),
        ) else {
            return;
        };
        for py in y0..=y1 {
            for px in x0..=x1 {
                let color = self.paint_color(Vec2::new(px as f32 + 0.5, py as f32 + 0.5));
                self.blend_pixel(px, py, color, 1.0);
            }
        }
    }
}
