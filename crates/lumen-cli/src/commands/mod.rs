//! CLI command implementations

pub mod info;
pub mod render;
pub mod sample;

use anyhow::{Context, Result};
use lumen_geometry::SvgDocument;

fn load_svg(path: &str) -> Result<(String, SvgDocument)> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let document = SvgDocument::parse(&text).with_context(|| format!("Failed to parse {path}"))?;
    Ok((text, document))
}
