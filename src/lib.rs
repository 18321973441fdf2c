//! # heatmap-overlay
//!
//! Point-sample heatmaps drawn over a padded surface with hand-drawn axes.
//!
//! Samples (`x`, `y`, optional weight) are mapped from physical coordinates to
//! pixels by a vertically flipped linear transform, handed to a heat layer, and
//! framed by axes whose ticks use the same bounds and surface.
//!
//! ## Pipeline
//!
//! 1. [`bounds::resolve_bounds`]: fixed, data-driven, pinned, minimum-span and
//!    enlarged bounds.
//! 2. [`scale::Transform`]: physical to pixel (and back, for hit-testing).
//! 3. [`axis::generate_ticks`]: lazy, restartable tick iterators.
//! 4. [`overlay::Overlay`]: one render pass into a [`render::HeatmapSink`] and
//!    a [`render::AxisCanvas`].
//! 5. [`session::Session`]: fetch-and-render cycles where the latest request
//!    wins.
//!
//! ## Quick Start
//!
//! ```rust
//! use heatmap_overlay::prelude::*;
//!
//! let config = RenderConfig {
//!     surface: Surface::new(100, 100, 10)?,
//!     ..RenderConfig::default()
//! };
//! let samples = [Sample::new(0.0, 0.0), Sample::new(10.0, 10.0)];
//!
//! let frame = Overlay::new().render_frame(&samples, &config, &HeatmapSettings::default())?;
//! let pixels: Vec<_> = frame.report().points.iter().map(|p| (p.x, p.y)).collect();
//! assert_eq!(pixels, [(10, 90), (90, 10)]);
//! # Ok::<(), heatmap_overlay::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `http`: [`source::HttpSource`] via reqwest
//! - `cli`: the `heatmap-overlay` binary (implies `http`)
//!
//! ## References
//!
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."
//! - Porter, T., & Duff, T. (1984). "Compositing Digital Images." SIGGRAPH '84.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types.
pub mod color;

/// SIMD-aligned RGBA framebuffer.
pub mod framebuffer;

/// Samples, surfaces and pixel-space primitives.
pub mod geometry;

/// Bounds and their resolution policy.
pub mod bounds;

/// Linear, affine and color scales.
pub mod scale;

/// Axis tick generation.
pub mod axis;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Rendering collaborators and rasterization.
pub mod render;

/// Heat layers.
pub mod plots;

/// Output encoders and axis canvases.
pub mod output;

/// Render orchestration and frames.
pub mod overlay;

// ============================================================================
// Data & Runtime
// ============================================================================

/// Sample sources.
pub mod source;

/// Event-driven fetch-and-render sessions.
pub mod session;

/// YAML configuration.
pub mod config;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for heatmap-overlay operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use heatmap_overlay::prelude::*;
/// ```
pub mod prelude {
    pub use crate::axis::{generate_ticks, LabelFormat, Tick, TickIter};
    pub use crate::bounds::{resolve_bounds, Bounds, BoundsPolicy, MinimumSpan, PinnedEdges};
    pub use crate::color::Rgba;
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Axis, PixelPoint, Point, Sample, Surface};
    pub use crate::overlay::{
        AxisStyle, Frame, HeatmapSettings, HeatmapStyle, Overlay, RenderConfig, RenderReport,
    };
    pub use crate::plots::{BinnedConfig, DensityLayer, SplatConfig};
    pub use crate::render::{AxisCanvas, HeatmapSink, LabelStyle, LineStyle};
    pub use crate::scale::Transform;
    pub use crate::session::{FetchFailurePolicy, Outcome, Session, Trigger};
    #[cfg(feature = "http")]
    pub use crate::source::HttpSource;
    pub use crate::source::{Mode, SampleSource, StaticSource};
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
