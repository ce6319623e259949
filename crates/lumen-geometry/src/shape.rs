//! Typed SVG primitives

use lumen_core::Vec2;
use serde::Serialize;

/// One supported SVG primitive with its geometry attributes already read.
/// Missing numeric attributes default to 0, matching browser behavior.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Path { d: String },
    Circle { cx: f32, cy: f32, r: f32 },
    Ellipse { cx: f32, cy: f32, rx: f32, ry: f32 },
    Rect { x: f32, y: f32, width: f32, height: f32 },
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    Polyline { points: Vec<Vec2> },
    Polygon { points: Vec<Vec2> },
}

impl Shape {
    /// SVG element name this shape came from
    pub fn tag(&self) -> &'static str {
        match self {
            Shape::Path { .. } => "path",
            Shape::Circle { .. } => "circle",
            Shape::Ellipse { .. } => "ellipse",
            Shape::Rect { .. } => "rect",
            Shape::Line { .. } => "line",
            Shape::Polyline { .. } => "polyline",
            Shape::Polygon { .. } => "polygon",
        }
    }
}

/// Parse a `points` attribute. Accepts `x,y x,y` pairs as well as flat
/// comma/whitespace separated lists; an odd trailing coordinate is dropped.
pub fn parse_points(raw: &str) -> Vec<Vec2> {
    let numbers: Vec<f32> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .filter_map(|t| t.parse::<f32>().ok())
        .collect();
    numbers
        .chunks_exact(2)
        .map(|pair| Vec2::new(pair[0], pair[1]))
        .collect()
}

/// Numeric prefix of a length attribute (`"10px"` → 10, `"2.5e1"` → 25)
pub fn parse_length(raw: &str) -> Option<f32> {
    let raw = raw.trim();
    let mut end = 0;
    let bytes = raw.as_bytes();
    let mut seen_exp = false;
    while end < bytes.len() {
        let c = bytes[end] as char;
        let sign_ok = (c == '-' || c == '+')
            && (end == 0 || matches!(bytes[end - 1] as char, 'e' | 'E'));
        let exp_ok = (c == 'e' || c == 'E') && !seen_exp && end > 0;
        if c.is_ascii_digit() || c == '.' || sign_ok || exp_ok {
            seen_exp |= exp_ok;
            end += 1;
        } else {
            break;
        }
    }
    // "3e" or "1e-" prefixes of unit suffixes like "3em" need backing off
    while end > 0 {
        if let Ok(v) = raw[..end].parse::<f32>() {
            return Some(v);
        }
        end -= 1;
    }
    None
}
