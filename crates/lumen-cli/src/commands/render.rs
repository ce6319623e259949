//! Headless reveal-to-PNG render command

use super::load_svg;
use anyhow::{Context, Result};
use lumen_core::Color;
use lumen_engine::{Engine, EngineConfig, ManualClock, SpawnOptions};
use lumen_render::{PixelCanvas, RenderQuality};
use std::path::Path;

pub struct RenderArgs {
    pub svg: String,
    pub output: String,
    pub width: u32,
    pub height: u32,
    pub frames: u32,
    pub config: Option<String>,
    pub quality: Option<String>,
    pub color: Option<String>,
    pub glow: Option<f32>,
    pub fit: f32,
    pub seed: Option<u32>,
    pub state: bool,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config {path}"))?,
        None => EngineConfig::default(),
    };
    if let Some(quality) = &args.quality {
        config.quality = Some(quality.parse::<RenderQuality>()?);
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.auto_start = false;

    let color = args
        .color
        .as_deref()
        .map(Color::parse)
        .transpose()
        .context("Invalid --color")?;

    let (text, _) = load_svg(&args.svg)?;

    let clock = ManualClock::new();
    let mut engine = Engine::new(PixelCanvas::new(args.width, args.height), config)
        .with_time_source(clock.clone());

    let spawn = SpawnOptions {
        color,
        glow: args.glow.unwrap_or(0.0),
        fit: Some(args.fit),
        ..Default::default()
    };
    let created = engine
        .create_from_svg(&text, &spawn)
        .context("Failed to create particles")?;
    println!("[render] {} particle(s) from {}", created.len(), args.svg);

    let interval = engine.frame_interval().as_secs_f64();
    engine.start();
    for _ in 0..args.frames {
        clock.advance(interval);
        engine.step();
    }
    engine.stop();
    tracing::debug!(
        frames = args.frames,
        fps = engine.performance().fps,
        "simulation finished"
    );

    let state = engine.state();
    if args.state {
        println!("{}", serde_json::to_string_pretty(&state)?);
    }

    engine
        .canvas()
        .save_png(&args.output)
        .with_context(|| format!("Failed to save {}", args.output))?;
    println!(
        "[render] {} frame(s), {} particle(s) -> {}",
        state.frame_count, state.particle_count, args.output
    );
    Ok(())
}
