//! Raster axis canvas.

use crate::color::Rgba;
use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Point, Surface};
use crate::render::{draw_thick_line, AxisCanvas, LabelStyle, LineStyle};

/// A label the raster canvas could not draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedLabel {
    /// Anchor point in pixels.
    pub at: Point,
    /// Label text.
    pub text: String,
    /// Requested style.
    pub style: LabelStyle,
}

/// Axis canvas backed by a transparent [`Framebuffer`].
///
/// Lines are rasterized with a square brush. There is no font engine, so
/// labels are recorded for the caller (and for SVG output) instead of drawn.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    fb: Option<Framebuffer>,
    labels: Vec<RecordedLabel>,
    error: Option<String>,
}

impl Default for RasterCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterCanvas {
    /// Create a canvas with no surface yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fb: None,
            labels: Vec::new(),
            error: None,
        }
    }

    /// Labels requested in the current pass.
    #[must_use]
    pub fn labels(&self) -> &[RecordedLabel] {
        &self.labels
    }

    /// The axis layer of the current pass.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Rendering`] if the canvas was never reset or the
    /// last reset could not allocate a framebuffer.
    pub fn framebuffer(&self) -> Result<&Framebuffer> {
        match (&self.fb, &self.error) {
            (_, Some(message)) => Err(crate::Error::Rendering(message.clone())),
            (Some(fb), None) => Ok(fb),
            (None, None) => Err(crate::Error::Rendering(
                "raster canvas has no surface".to_string(),
            )),
        }
    }

    /// Composite the axis layer over `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas has no framebuffer or sizes differ.
    pub fn composite_onto(&self, base: &mut Framebuffer) -> Result<()> {
        base.composite(self.framebuffer()?)
    }
}

impl AxisCanvas for RasterCanvas {
    fn reset(&mut self, surface: &Surface) {
        self.labels.clear();
        match Framebuffer::new(surface.width, surface.height) {
            Ok(fb) => {
                self.fb = Some(fb);
                self.error = None;
            }
            Err(e) => {
                self.fb = None;
                self.error = Some(e.to_string());
            }
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, style: &LineStyle) {
        if let Some(fb) = self.fb.as_mut() {
            let width = style.width.round().max(1.0) as u32;
            draw_thick_line(
                fb,
                (from.x.floor() as i32, from.y.floor() as i32),
                (to.x.floor() as i32, to.y.floor() as i32),
                width,
                style.color,
            );
        }
    }

    fn draw_label(&mut self, at: Point, text: &str, style: &LabelStyle) {
        self.labels.push(RecordedLabel {
            at,
            text: text.to_string(),
            style: *style,
        });
    }
}

/// White, opaque base for PNG output.
pub(crate) fn white_background(surface: &Surface) -> Result<Framebuffer> {
    let mut fb = Framebuffer::new(surface.width, surface.height)?;
    fb.clear(Rgba::WHITE);
    Ok(fb)
}
