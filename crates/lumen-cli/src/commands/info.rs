//! SVG inspection command

use super::load_svg;
use anyhow::{bail, Result};
use lumen_geometry::{GeometrySampler, SamplerConfig};
use serde::Serialize;

#[derive(Serialize)]
struct InfoReport {
    #[serde(flatten)]
    metadata: lumen_geometry::SvgMetadata,
    spacing: f32,
    point_count: usize,
}

pub fn run(path: &str, spacing: f32, format: &str) -> Result<()> {
    let (_, document) = load_svg(path)?;
    let metadata = document.metadata();

    let mut sampler = GeometrySampler::new(SamplerConfig {
        spacing,
        merge: false,
        ..Default::default()
    });
    let point_count = sampler.sample_document(&document)?.len();

    match format {
        "json" => {
            let report = InfoReport {
                metadata,
                spacing,
                point_count,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "text" => {
            println!("SVG: {path}");
            println!("  Size: {} x {}", metadata.width, metadata.height);
            println!("  viewBox: {}", if metadata.has_view_box { "yes" } else { "no" });
            println!("  Shapes: {}", metadata.shape_count);
            println!(
                "  Bounds: ({}, {}) {} x {}",
                metadata.bounds.x, metadata.bounds.y, metadata.bounds.width, metadata.bounds.height
            );
            println!("  Points at spacing {spacing}: {point_count}");
        }
        other => bail!("unknown format '{other}'; valid values: text, json"),
    }
    Ok(())
}
