//! Outline sampling: shapes → evenly spaced points with jittered quality copies

use crate::merge::merge_points;
use crate::path::{parse_path_data, trace_segments};
use crate::shape::Shape;
use crate::svg::SvgDocument;
use lumen_core::{LumenError, Result, Rng, Vec2};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Minimum samples on a closed outline (circle, ellipse, rect)
const MIN_CLOSED_POINTS: usize = 8;
/// Minimum interpolation steps for a line/polyline segment
const MIN_SEGMENT_STEPS: usize = 2;

/// A point produced by the sampler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledPoint {
    pub position: Vec2,
    pub alpha: f32,
    /// Outline position before quality jitter
    pub original: Option<Vec2>,
    /// Index of the source shape in document order
    pub shape_index: usize,
    /// Visual size set by the merge pass
    pub size: Option<f32>,
    /// Reveal delay in seconds, set by `assign_delays`
    pub delay: Option<f32>,
}

impl SampledPoint {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            alpha: 1.0,
            original: None,
            shape_index: 0,
            size: None,
            delay: None,
        }
    }
}

/// Sampler settings, loadable from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Target arc length between consecutive samples
    pub spacing: f32,
    /// Jittered copies per geometric point
    pub quality: u32,
    /// Multiplier applied to all document coordinates
    pub scale: f32,
    /// Merge nearby points when the raw count reaches `merge_threshold`
    pub merge: bool,
    pub merge_distance: f32,
    pub merge_threshold: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            spacing: 5.0,
            quality: 1,
            scale: 1.0,
            merge: true,
            merge_distance: 3.0,
            merge_threshold: 100,
        }
    }
}

pub struct GeometrySampler {
    pub config: SamplerConfig,
    rng: Rng,
}

impl GeometrySampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self::with_rng(config, Rng::from_time())
    }

    /// Deterministic jitter for tests and reproducible renders
    pub fn with_rng(config: SamplerConfig, rng: Rng) -> Self {
        Self { config, rng }
    }

    /// Sample a parsed document using the configured spacing, quality and scale
    pub fn sample_document(&mut self, document: &SvgDocument) -> Result<Vec<SampledPoint>> {
        let SamplerConfig {
            spacing,
            quality,
            scale,
            ..
        } = self.config;
        self.sample(&document.shapes, spacing, quality, scale)
    }

    /// Sample every shape in order, then apply the merge pass if enabled
    pub fn sample(
        &mut self,
        shapes: &[Shape],
        spacing: f32,
        quality: u32,
        scale: f32,
    ) -> Result<Vec<SampledPoint>> {
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(LumenError::InvalidParameter(format!(
                "sampling spacing must be a positive number, got {spacing}"
            )));
        }
        let quality = quality.max(1);

        let mut points = Vec::new();
        for (shape_index, shape) in shapes.iter().enumerate() {
            let outline = match outline_points(shape, spacing, scale) {
                Ok(outline) => outline,
                Err(err) => {
                    tracing::debug!(shape = shape.tag(), shape_index, %err, "skipping shape");
                    continue;
                }
            };
            if outline.is_empty() {
                tracing::debug!(shape = shape.tag(), shape_index, "degenerate shape skipped");
                continue;
            }
            self.push_quality_copies(&mut points, &outline, quality, shape_index);
        }

        let raw_count = points.len();
        if self.config.merge && raw_count >= self.config.merge_threshold {
            points = merge_points(&points, self.config.merge_distance);
            tracing::debug!(raw_count, merged_count = points.len(), "merged nearby points");
        }
        Ok(points)
    }

    fn push_quality_copies(
        &mut self,
        out: &mut Vec<SampledPoint>,
        outline: &[Vec2],
        quality: u32,
        shape_index: usize,
    ) {
        out.reserve(outline.len() * quality as usize);
        for &base in outline {
            for q in 0..quality {
                let offset = q as f32 * 0.5;
                let jitter = if offset > 0.0 {
                    Vec2::new(
                        self.rng.range(-offset, offset),
                        self.rng.range(-offset, offset),
                    )
                } else {
                    Vec2::ZERO
                };
                out.push(SampledPoint {
                    position: base + jitter,
                    alpha: 1.0,
                    original: Some(base),
                    shape_index,
                    size: None,
                    delay: None,
                });
            }
        }
    }
}

impl Default for GeometrySampler {
    fn default() -> Self {
        Self::new(SamplerConfig::default())
    }
}

/// Base outline points for one shape (before quality copies).
/// Degenerate shapes yield an empty list; malformed path data is an error.
pub fn outline_points(shape: &Shape, spacing: f32, scale: f32) -> Result<Vec<Vec2>> {
    let points = match shape {
        Shape::Circle { cx, cy, r } => {
            let r = r * scale;
            if r <= 0.0 {
                return Ok(Vec::new());
            }
            ellipse_points(Vec2::new(cx * scale, cy * scale), r, r, TAU * r, spacing)
        }
        Shape::Ellipse { cx, cy, rx, ry } => {
            let (a, b) = (rx * scale, ry * scale);
            if a <= 0.0 || b <= 0.0 {
                return Ok(Vec::new());
            }
            let circumference = ramanujan_circumference(a, b);
            ellipse_points(Vec2::new(cx * scale, cy * scale), a, b, circumference, spacing)
        }
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => {
            let (w, h) = (width * scale, height * scale);
            if w <= 0.0 || h <= 0.0 {
                return Ok(Vec::new());
            }
            rect_points(Vec2::new(x * scale, y * scale), w, h, spacing)
        }
        Shape::Line { x1, y1, x2, y2 } => segment_points(
            Vec2::new(x1 * scale, y1 * scale),
            Vec2::new(x2 * scale, y2 * scale),
            spacing,
        ),
        Shape::Polyline { points } => polyline_points(points, scale, spacing, false),
        Shape::Polygon { points } => polyline_points(points, scale, spacing, true),
        Shape::Path { d } => {
            let commands = parse_path_data(d)?;
            let mut out = Vec::new();
            for segment in trace_segments(&commands, scale) {
                let len = segment.from.distance(segment.to);
                let steps = ((len / spacing).floor() as usize).max(1);
                for i in 1..=steps {
                    out.push(segment.from.lerp(segment.to, i as f32 / steps as f32));
                }
            }
            out
        }
    };
    Ok(points)
}

/// Ramanujan's first approximation of an ellipse perimeter
pub fn ramanujan_circumference(a: f32, b: f32) -> f32 {
    PI * (3.0 * (a + b) - ((3.0 * a + b) * (a + 3.0 * b)).sqrt())
}

fn closed_count(perimeter: f32, spacing: f32) -> usize {
    ((perimeter / spacing).floor() as usize).max(MIN_CLOSED_POINTS)
}

fn ellipse_points(center: Vec2, rx: f32, ry: f32, circumference: f32, spacing: f32) -> Vec<Vec2> {
    let n = closed_count(circumference, spacing);
    (0..n)
        .map(|i| {
            let angle = i as f32 / n as f32 * TAU;
            Vec2::new(center.x + angle.cos() * rx, center.y + angle.sin() * ry)
        })
        .collect()
}

/// Equal steps along the perimeter, clockwise from the top-left corner
fn rect_points(origin: Vec2, w: f32, h: f32, spacing: f32) -> Vec<Vec2> {
    let perimeter = 2.0 * (w + h);
    let n = closed_count(perimeter, spacing);
    let step = perimeter / n as f32;

    (0..n)
        .map(|i| {
            let d = i as f32 * step;
            if d < w {
                Vec2::new(origin.x + d, origin.y)
            } else if d < w + h {
                Vec2::new(origin.x + w, origin.y + (d - w))
            } else if d < 2.0 * w + h {
                Vec2::new(origin.x + w - (d - w - h), origin.y + h)
            } else {
                Vec2::new(origin.x, origin.y + h - (d - 2.0 * w - h))
            }
        })
        .collect()
}

/// Both endpoints included: `steps + 1` points
fn segment_points(from: Vec2, to: Vec2, spacing: f32) -> Vec<Vec2> {
    let steps = ((from.distance(to) / spacing).floor() as usize).max(MIN_SEGMENT_STEPS);
    (0..=steps)
        .map(|i| from.lerp(to, i as f32 / steps as f32))
        .collect()
}

fn polyline_points(vertices: &[Vec2], scale: f32, spacing: f32, closed: bool) -> Vec<Vec2> {
    let scaled: Vec<Vec2> = vertices.iter().map(|&v| v * scale).collect();
    let mut out = Vec::new();
    for pair in scaled.windows(2) {
        out.extend(segment_points(pair[0], pair[1], spacing));
    }
    if closed && scaled.len() > 2 {
        out.extend(segment_points(scaled[scaled.len() - 1], scaled[0], spacing));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler() -> GeometrySampler {
        GeometrySampler::with_rng(
            SamplerConfig {
                merge: false,
                ..Default::default()
            },
            Rng::new(42),
        )
    }

    #[test]
    fn circle_count_and_radius() {
        let shapes = [Shape::Circle { cx: 50.0, cy: 40.0, r: 20.0 }];
        let points = sampler().sample(&shapes, 3.0, 1, 1.0).unwrap();
        let expected = ((TAU * 20.0 / 3.0).floor() as usize).max(8);
        assert_eq!(points.len(), expected);
        for p in &points {
            let d = p.position.distance(Vec2::new(50.0, 40.0));
            assert!((d - 20.0).abs() < 1e-3, "distance {d}");
        }
    }

    #[test]
    fn small_circle_gets_minimum_points() {
        let shapes = [Shape::Circle { cx: 0.0, cy: 0.0, r: 1.0 }];
        let points = sampler().sample(&shapes, 5.0, 1, 1.0).unwrap();
        assert_eq!(points.len(), 8);
    }

    #[test]
    fn ellipse_uses_ramanujan() {
        let c = ramanujan_circumference(10.0, 10.0);
        assert!((c - TAU * 10.0).abs() < 1e-3);
        let shapes = [Shape::Ellipse { cx: 0.0, cy: 0.0, rx: 40.0, ry: 10.0 }];
        let points = sampler().sample(&shapes, 2.0, 1, 1.0).unwrap();
        let expected = (ramanujan_circumference(40.0, 10.0) / 2.0).floor() as usize;
        assert_eq!(points.len(), expected);
    }

    #[test]
    fn rect_perimeter_walk() {
        let shapes = [Shape::Rect { x: 0.0, y: 0.0, width: 40.0, height: 20.0 }];
        let points = sampler().sample(&shapes, 10.0, 1, 1.0).unwrap();
        assert_eq!(points.len(), 12);
        for i in 0..points.len() {
            let a = points[i].position;
            let b = points[(i + 1) % points.len()].position;
            assert!(a.distance(b) <= 10.0 + 1e-4);
            let on_edge = a.x.abs() < 1e-4
                || (a.x - 40.0).abs() < 1e-4
                || a.y.abs() < 1e-4
                || (a.y - 20.0).abs() < 1e-4;
            assert!(on_edge, "{a:?} is not on the perimeter");
        }
        assert_eq!(points[0].position, Vec2::new(0.0, 0.0));
        assert_eq!(points[4].position, Vec2::new(40.0, 0.0));
        assert_eq!(points[6].position, Vec2::new(40.0, 20.0));
    }

    #[test]
    fn degenerate_shapes_are_skipped() {
        let shapes = [
            Shape::Circle { cx: 0.0, cy: 0.0, r: 0.0 },
            Shape::Rect { x: 0.0, y: 0.0, width: -5.0, height: 10.0 },
            Shape::Ellipse { cx: 0.0, cy: 0.0, rx: 5.0, ry: 0.0 },
            Shape::Polyline { points: vec![Vec2::new(1.0, 1.0)] },
            Shape::Circle { cx: 0.0, cy: 0.0, r: 10.0 },
        ];
        let points = sampler().sample(&shapes, 5.0, 1, 1.0).unwrap();
        assert_eq!(points.len(), 12);
        assert!(points.iter().all(|p| p.shape_index == 4));
    }

    #[test]
    fn malformed_path_is_skipped_not_fatal() {
        let shapes = [
            Shape::Path { d: "M 0 0 L".to_string() },
            Shape::Line { x1: 0.0, y1: 0.0, x2: 10.0, y2: 0.0 },
        ];
        let points = sampler().sample(&shapes, 5.0, 1, 1.0).unwrap();
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn moveto_starts_a_new_subpath_without_bridging() {
        let shapes = [Shape::Path {
            d: "M0 0 L10 0 M20 0 L30 0".to_string(),
        }];
        let points = sampler().sample(&shapes, 5.0, 1, 1.0).unwrap();
        let xs: Vec<f32> = points.iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![5.0, 10.0, 25.0, 30.0]);
    }

    #[test]
    fn line_includes_both_endpoints() {
        let shapes = [Shape::Line { x1: 0.0, y1: 0.0, x2: 30.0, y2: 0.0 }];
        let points = sampler().sample(&shapes, 10.0, 1, 1.0).unwrap();
        let xs: Vec<f32> = points.iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![0.0, 10.0, 20.0, 30.0]);
    }

    #[test]
    fn polygon_closes_the_loop() {
        let tri = vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)];
        let open = sampler()
            .sample(&[Shape::Polyline { points: tri.clone() }], 5.0, 1, 1.0)
            .unwrap();
        let closed = sampler()
            .sample(&[Shape::Polygon { points: tri }], 5.0, 1, 1.0)
            .unwrap();
        assert!(closed.len() > open.len());
        assert_eq!(closed.last().unwrap().position, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn path_segments_skip_start_points() {
        let shapes = [Shape::Path { d: "M0 0 H20 V10".to_string() }];
        let points = sampler().sample(&shapes, 10.0, 1, 1.0).unwrap();
        let pos: Vec<Vec2> = points.iter().map(|p| p.position).collect();
        assert_eq!(
            pos,
            vec![Vec2::new(10.0, 0.0), Vec2::new(20.0, 0.0), Vec2::new(20.0, 10.0)]
        );
    }

    #[test]
    fn quality_copies_keep_original_and_bounded_jitter() {
        let shapes = [Shape::Circle { cx: 0.0, cy: 0.0, r: 10.0 }];
        let points = sampler().sample(&shapes, 5.0, 3, 1.0).unwrap();
        assert_eq!(points.len(), 12 * 3);
        for (i, p) in points.iter().enumerate() {
            let q = (i % 3) as f32;
            let original = p.original.unwrap();
            assert!((p.position.x - original.x).abs() <= 0.5 * q);
            assert!((p.position.y - original.y).abs() <= 0.5 * q);
            if q == 0.0 {
                assert_eq!(p.position, original);
            }
        }
    }

    #[test]
    fn scale_multiplies_coordinates() {
        let shapes = [Shape::Line { x1: 1.0, y1: 1.0, x2: 2.0, y2: 1.0 }];
        let points = sampler().sample(&shapes, 1.0, 1, 10.0).unwrap();
        assert_eq!(points.first().unwrap().position, Vec2::new(10.0, 10.0));
        assert_eq!(points.last().unwrap().position, Vec2::new(20.0, 10.0));
    }

    #[test]
    fn invalid_spacing_is_rejected() {
        let shapes = [Shape::Circle { cx: 0.0, cy: 0.0, r: 10.0 }];
        assert!(sampler().sample(&shapes, 0.0, 1, 1.0).is_err());
        assert!(sampler().sample(&shapes, f32::NAN, 1, 1.0).is_err());
    }

    #[test]
    fn merge_only_above_threshold() {
        // 10 identical points stay unmerged below the threshold of 100
        let shapes = [Shape::Circle { cx: 0.0, cy: 0.0, r: 0.5 }];
        let mut s = GeometrySampler::with_rng(SamplerConfig::default(), Rng::new(1));
        let below = s.sample(&shapes, 5.0, 1, 1.0).unwrap();
        assert_eq!(below.len(), 8);
        assert!(below.iter().all(|p| p.size.is_none()));

        // 13 circles of 8 points each (104 points) collapse to one point per circle
        let many: Vec<Shape> = (0..13)
            .map(|i| Shape::Circle { cx: i as f32 * 100.0, cy: 0.0, r: 0.5 })
            .collect();
        let merged = s.sample(&many, 5.0, 1, 1.0).unwrap();
        assert_eq!(merged.len(), 13);
        for p in &merged {
            assert!((p.size.unwrap() - (8.0f32).sqrt() * 2.0).abs() < 1e-5);
        }
    }
}
