//! Heat layers.
//!
//! Both layers implement [`HeatmapSink`](crate::render::HeatmapSink) and
//! rasterize to a transparent [`Framebuffer`](crate::framebuffer::Framebuffer)
//! that is composited under the axes.

mod binned;
mod heatmap;

pub use binned::{BinnedConfig, BinnedLayer};
pub use heatmap::{DensityLayer, HeatmapPalette, SplatConfig};
