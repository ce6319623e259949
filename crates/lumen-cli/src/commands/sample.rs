//! SVG-to-points sampling command

use super::load_svg;
use anyhow::{Context, Result};
use lumen_core::Rng;
use lumen_geometry::{assign_delays, DelayMode, GeometrySampler, SamplerConfig};

pub struct SampleArgs {
    pub svg: String,
    pub spacing: f32,
    pub quality: u32,
    pub scale: f32,
    pub merge: bool,
    pub delay: Option<String>,
    pub seed: Option<u32>,
    pub output: Option<String>,
}

pub fn run(args: SampleArgs) -> Result<()> {
    let (_, document) = load_svg(&args.svg)?;

    let config = SamplerConfig {
        spacing: args.spacing,
        quality: args.quality,
        scale: args.scale,
        merge: args.merge,
        ..Default::default()
    };
    let mut rng = match args.seed {
        Some(seed) => Rng::new(seed),
        None => Rng::from_time(),
    };
    let mut sampler = GeometrySampler::with_rng(config, rng.clone());
    let mut points = sampler
        .sample_document(&document)
        .context("Failed to sample SVG")?;

    if let Some(name) = &args.delay {
        let mode: DelayMode = name.parse()?;
        assign_delays(&mut points, mode, &mut rng);
    }

    let json = serde_json::to_string_pretty(&points)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {path}"))?;
            eprintln!("[sample] {} point(s) written to {}", points.len(), path);
        }
        None => println!("{json}"),
    }
    Ok(())
}
