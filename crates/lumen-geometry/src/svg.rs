//! SVG document parsing into a shape list

use crate::shape::{parse_length, parse_points, Shape};
use lumen_core::{LumenError, Rect, Result};
use serde::Serialize;

const DEFAULT_SIZE: f32 = 100.0;

/// A parsed SVG document: size information plus supported shapes in
/// document order
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    /// `width` attribute, or 100 when absent/unparseable
    pub width: f32,
    /// `height` attribute, or 100 when absent/unparseable
    pub height: f32,
    pub view_box: Option<Rect>,
    pub shapes: Vec<Shape>,
}

/// Summary of a document, for the CLI `info` command and hosts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SvgMetadata {
    pub bounds: Rect,
    pub shape_count: usize,
    pub has_view_box: bool,
    pub width: f32,
    pub height: f32,
}

impl SvgDocument {
    pub fn parse(text: &str) -> Result<Self> {
        let mut options = roxmltree::ParsingOptions::default();
        options.allow_dtd = true;
        let doc = roxmltree::Document::parse_with_options(text, options)
            .map_err(|e| LumenError::Parse(format!("invalid SVG: {e}")))?;

        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return Err(LumenError::Parse(format!(
                "expected <svg> root element, found <{}>",
                root.tag_name().name()
            )));
        }

        let width = root
            .attribute("width")
            .and_then(parse_length)
            .unwrap_or(DEFAULT_SIZE);
        let height = root
            .attribute("height")
            .and_then(parse_length)
            .unwrap_or(DEFAULT_SIZE);
        let view_box = root.attribute("viewBox").and_then(parse_view_box);

        let mut shapes = Vec::new();
        for node in root.descendants().filter(|n| n.is_element()) {
            if let Some(shape) = read_shape(&node) {
                shapes.push(shape);
            }
        }

        Ok(Self {
            width,
            height,
            view_box,
            shapes,
        })
    }

    /// Coordinate-space size: the viewBox when present, else width/height
    pub fn size(&self) -> (f32, f32) {
        match self.view_box {
            Some(vb) => (vb.width, vb.height),
            None => (self.width, self.height),
        }
    }

    pub fn metadata(&self) -> SvgMetadata {
        let (width, height) = self.size();
        SvgMetadata {
            bounds: self
                .view_box
                .unwrap_or(Rect::new(0.0, 0.0, DEFAULT_SIZE, DEFAULT_SIZE)),
            shape_count: self.shapes.len(),
            has_view_box: self.view_box.is_some(),
            width,
            height,
        }
    }
}

fn parse_view_box(raw: &str) -> Option<Rect> {
    let values: Vec<f32> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match values.as_slice() {
        [x, y, w, h] => Some(Rect::new(*x, *y, *w, *h)),
        _ => None,
    }
}

fn read_shape(node: &roxmltree::Node) -> Option<Shape> {
    let num = |name: &str| node.attribute(name).and_then(parse_length).unwrap_or(0.0);

    let shape = match node.tag_name().name() {
        "path" => Shape::Path {
            d: node.attribute("d").unwrap_or_default().to_string(),
        },
        "circle" => Shape::Circle {
            cx: num("cx"),
            cy: num("cy"),
            r: num("r"),
        },
        "ellipse" => Shape::Ellipse {
            cx: num("cx"),
            cy: num("cy"),
            rx: num("rx"),
            ry: num("ry"),
        },
        "rect" => Shape::Rect {
            x: num("x"),
            y: num("y"),
            width: num("width"),
            height: num("height"),
        },
        "line" => Shape::Line {
            x1: num("x1"),
            y1: num("y1"),
            x2: num("x2"),
            y2: num("y2"),
        },
        "polyline" => Shape::Polyline {
            points: parse_points(node.attribute("points").unwrap_or_default()),
        },
        "polygon" => Shape::Polygon {
            points: parse_points(node.attribute("points").unwrap_or_default()),
        },
        _ => return None,
    };
    Some(shape)
}
