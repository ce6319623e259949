//! Lumen CLI - sample, inspect and render SVG particle reveals

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{info, render, sample};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "Particle logo reveal engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample an SVG into particle seed points (JSON)
    Sample {
        /// Path to SVG file
        svg: String,

        /// Target distance between points
        #[arg(long, default_value = "5")]
        spacing: f32,

        /// Jittered copies per point
        #[arg(long, default_value = "1")]
        quality: u32,

        /// Coordinate scale factor
        #[arg(long, default_value = "1")]
        scale: f32,

        /// Disable merging of nearby points
        #[arg(long)]
        no_merge: bool,

        /// Animation delay mode (sequential, random, wave, radial)
        #[arg(long)]
        delay: Option<String>,

        /// RNG seed for jitter and delays
        #[arg(long)]
        seed: Option<u32>,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show SVG metadata and sampling statistics
    Info {
        /// Path to SVG file
        svg: String,

        /// Sampling spacing used for the point count
        #[arg(long, default_value = "5")]
        spacing: f32,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Simulate a reveal and save the final frame as PNG (headless)
    Render {
        /// Path to SVG file
        svg: String,

        /// Output image path
        #[arg(short, long, default_value = "reveal.png")]
        output: String,

        /// Image width in pixels
        #[arg(long, default_value = "800", value_parser = clap::value_parser!(u32).range(1..))]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value = "600", value_parser = clap::value_parser!(u32).range(1..))]
        height: u32,

        /// Number of frames to simulate before saving
        #[arg(long, default_value = "60")]
        frames: u32,

        /// Engine config file (TOML)
        #[arg(long)]
        config: Option<String>,

        /// Render quality (low, medium, high)
        #[arg(long)]
        quality: Option<String>,

        /// Particle color; random per particle when omitted
        #[arg(long)]
        color: Option<String>,

        /// Glow radius
        #[arg(long)]
        glow: Option<f32>,

        /// Fraction of the canvas the artwork should fill
        #[arg(long, default_value = "0.8")]
        fit: f32,

        /// RNG seed
        #[arg(long)]
        seed: Option<u32>,

        /// Print the final engine state as JSON
        #[arg(long)]
        state: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sample {
            svg,
            spacing,
            quality,
            scale,
            no_merge,
            delay,
            seed,
            output,
        } => sample::run(sample::SampleArgs {
            svg,
            spacing,
            quality,
            scale,
            merge: !no_merge,
            delay,
            seed,
            output,
        }),
        Commands::Info {
            svg,
            spacing,
            format,
        } => info::run(&svg, spacing, &format),
        Commands::Render {
            svg,
            output,
            width,
            height,
            frames,
            config,
            quality,
            color,
            glow,
            fit,
            seed,
            state,
        } => render::run(render::RenderArgs {
            svg,
            output,
            width,
            height,
            frames,
            config,
            quality,
            color,
            glow,
            fit,
            seed,
            state,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_rejects_zero_sized_canvas() {
        assert!(Cli::try_parse_from(["lumen", "render", "logo.svg", "--width", "0"]).is_err());
        assert!(Cli::try_parse_from(["lumen", "render", "logo.svg", "--height", "0"]).is_err());
    }

    #[test]
    fn render_accepts_explicit_size() {
        let cli = Cli::try_parse_from(["lumen", "render", "logo.svg", "--width", "1", "--height", "2"])
            .unwrap();
        match cli.command {
            Commands::Render { width, height, .. } => assert_eq!((width, height), (1, 2)),
            _ => panic!("expected render command"),
        }
    }
}
