//! Lumen Geometry - vector artwork to particle seed points
//!
//! Converts SVG documents into point clouds:
//! - `SvgDocument` - parses the supported primitives into a typed `Shape` list
//! - `GeometrySampler` - walks shape outlines at a target spacing, with
//!   jittered quality copies and an optional nearby-point merge pass
//! - `assign_delays` - stamps reveal-animation delays onto sampled points
//!
//! Curves in `<path>` data are not flattened: the pen jumps to the curve's end
//! point without emitting samples.

pub mod delay;
pub mod merge;
pub mod path;
pub mod sampler;
pub mod shape;
pub mod svg;

pub use delay::{assign_delays, DelayMode};
pub use merge::merge_points;
pub use sampler::{GeometrySampler, SampledPoint, SamplerConfig};
pub use shape::Shape;
pub use svg::{SvgDocument, SvgMetadata};
