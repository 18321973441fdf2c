//! Rendering collaborators and rasterization.
//!
//! The overlay core never talks to a concrete backend. It hands mapped points
//! to a [`HeatmapSink`] and axis geometry to an [`AxisCanvas`]; the crate ships
//! raster and SVG implementations of both, and tests use recording fakes.
//!
//! # References
//!
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."

mod primitives;

pub use primitives::{draw_line, draw_thick_line};

use crate::color::Rgba;
use crate::geometry::{PixelPoint, Point, Surface};
use serde::{Deserialize, Serialize};

/// Receives the mapped points of one render pass.
pub trait HeatmapSink {
    /// Drop everything from the previous pass and size the layer for `surface`.
    fn reset(&mut self, surface: &Surface);

    /// Replace the layer's points. `max_intensity` is the value that maps to
    /// full heat.
    fn set_points(&mut self, max_intensity: f64, points: &[PixelPoint]);
}

/// Receives axis lines and labels in pixel coordinates.
pub trait AxisCanvas {
    /// Drop everything from the previous pass and size the canvas for `surface`.
    fn reset(&mut self, surface: &Surface);

    /// Draw a straight segment.
    fn draw_line(&mut self, from: Point, to: Point, style: &LineStyle);

    /// Draw a text label anchored at `at`.
    fn draw_label(&mut self, at: Point, text: &str, style: &LabelStyle);
}

/// Fan-out: every call goes to both canvases, first then second.
impl<A: AxisCanvas, B: AxisCanvas> AxisCanvas for (A, B) {
    fn reset(&mut self, surface: &Surface) {
        self.0.reset(surface);
        self.1.reset(surface);
    }

    fn draw_line(&mut self, from: Point, to: Point, style: &LineStyle) {
        self.0.draw_line(from, to, style);
        self.1.draw_line(from, to, style);
    }

    fn draw_label(&mut self, at: Point, text: &str, style: &LabelStyle) {
        self.0.draw_label(at, text, style);
        self.1.draw_label(at, text, style);
    }
}

/// Stroke settings for axis lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    /// Stroke color.
    pub color: Rgba,
    /// Stroke width in pixels.
    pub width: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            width: 3.0,
        }
    }
}

/// Horizontal text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    /// Text starts at the anchor.
    #[default]
    Start,
    /// Text is centered on the anchor.
    Middle,
    /// Text ends at the anchor.
    End,
}

/// Font settings for axis labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
    /// Fill color.
    pub color: Rgba,
    /// Font size in pixels.
    pub font_size: f32,
    /// Alignment.
    #[serde(default)]
    pub anchor: TextAnchor,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            font_size: 16.0,
            anchor: TextAnchor::Start,
        }
    }
}
