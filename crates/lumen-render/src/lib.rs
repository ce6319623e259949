//! Lumen Render - batched 2D particle drawing
//!
//! - `Canvas`: immediate-mode surface trait (state stack, fills, shadows)
//! - `PixelCanvas`: software rasterizer backed by `image::RgbaImage`
//! - `BatchRenderer`: groups particles by `StyleKey` to minimize state changes

pub mod canvas;
pub mod pixel;
pub mod renderer;

pub use canvas::{BlendMode, Canvas, GradientStop, Paint, RadialGradient};
pub use pixel::PixelCanvas;
pub use renderer::{BatchRenderer, RenderOptions, RenderQuality, RenderStats, StyleKey};
