//! Render orchestration.
//!
//! [`Overlay::render`] runs one pass: pick the data (or the fallback set),
//! resolve bounds, map every sample to pixels, generate ticks, then hand the
//! results to a [`HeatmapSink`] and an [`AxisCanvas`]. All fallible work
//! happens before either collaborator is touched, so a failed pass leaves the
//! previous picture in place.
//!
//! [`Overlay::render_frame`] wires the crate's own collaborators together and
//! returns a [`Frame`] that can be written as SVG or PNG.

use crate::axis::{generate_ticks, LabelFormat, Tick};
use crate::bounds::{resolve_bounds, Bounds, BoundsPolicy};
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::geometry::{Axis, PixelPoint, Point, Sample, Surface};
use crate::output::{white_background, PngEncoder, RasterCanvas, SvgCanvas};
use crate::plots::{BinnedConfig, BinnedLayer, DensityLayer, SplatConfig};
use crate::render::{AxisCanvas, HeatmapSink, LabelStyle, LineStyle, TextAnchor};
use crate::scale::Transform;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Pixel offsets of titles and labels relative to the axis lines.
const X_TITLE_OFFSET: (f32, f32) = (20.0, 0.0);
const Y_TITLE_OFFSET: (f32, f32) = (-30.0, -10.0);
const X_LABEL_DROP: f32 = 20.0;
const Y_LABEL_INSET: f32 = -40.0;

/// Look of the axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisStyle {
    /// Axis line width in pixels.
    pub line_width: f32,
    /// Label font size in pixels.
    pub font_size: f32,
    /// Line and text color.
    pub color: Rgba,
    /// Draw the "X" and "Y" titles.
    pub titles: bool,
    /// Length of tick marks in pixels; 0 draws none.
    pub tick_length: f32,
}

impl Default for AxisStyle {
    fn default() -> Self {
        Self {
            line_width: 3.0,
            font_size: 16.0,
            color: Rgba::BLACK,
            titles: true,
            tick_length: 0.0,
        }
    }
}

impl AxisStyle {
    fn line(&self) -> LineStyle {
        LineStyle {
            color: self.color,
            width: self.line_width,
        }
    }

    fn label(&self) -> LabelStyle {
        LabelStyle {
            color: self.color,
            font_size: self.font_size,
            anchor: TextAnchor::Start,
        }
    }
}

/// Everything one render pass needs besides the samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Target surface.
    pub surface: Surface,
    /// How bounds are derived.
    pub bounds: BoundsPolicy,
    /// Tick intervals per axis.
    pub divisions: usize,
    /// Tick label formatting.
    pub label_format: LabelFormat,
    /// Axis look.
    pub axis_style: AxisStyle,
    /// Sample value rendered as full heat.
    pub max_intensity: f64,
    /// Rendered instead of an empty sample set.
    pub fallback: Vec<Sample>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            surface: Surface::default(),
            bounds: BoundsPolicy::dynamic(),
            divisions: 5,
            label_format: LabelFormat::Rounded,
            axis_style: AxisStyle::default(),
            max_intensity: 10.0,
            fallback: vec![Sample::weighted(0.1, 2.0, 1.0), Sample::weighted(1.0, 2.0, 1.0)],
        }
    }
}

impl RenderConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid surface or bounds policy, zero
    /// divisions, or a non-positive maximum intensity.
    pub fn validate(&self) -> Result<()> {
        self.surface.validate()?;
        self.bounds.validate()?;
        if self.divisions == 0 {
            return Err(Error::InvalidConfig(
                "axis divisions must be at least 1".to_string(),
            ));
        }
        if !(self.max_intensity > 0.0 && self.max_intensity.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "max_intensity must be positive, got {}",
                self.max_intensity
            )));
        }
        Ok(())
    }
}

/// What a render pass produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    /// Bounds used for the transform and ticks.
    pub bounds: Bounds,
    /// Mapped points handed to the heat layer.
    pub points: Vec<PixelPoint>,
    /// X axis ticks, left to right.
    pub x_ticks: Vec<Tick>,
    /// Y axis ticks, bottom to top.
    pub y_ticks: Vec<Tick>,
    /// The fallback set replaced an empty input.
    pub used_fallback: bool,
}

/// Render orchestrator.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    passes: u64,
    transform: Option<Transform>,
}

impl Overlay {
    /// Create an orchestrator that has not rendered yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed passes.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// Transform of the last completed pass, for hit-testing.
    #[must_use]
    pub const fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    /// Run one render pass.
    ///
    /// Both collaborators are reset before drawing, so nothing from a previous
    /// pass survives. Non-finite samples are left out of the mapped points.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyData`] if `samples` and the fallback set are both empty.
    /// - [`Error::DegenerateRange`] if the resolved bounds collapse.
    /// - [`Error::InvalidConfig`] / [`Error::InvalidDimensions`] for a bad config.
    pub fn render<H, C>(
        &mut self,
        samples: &[Sample],
        config: &RenderConfig,
        heatmap: &mut H,
        canvas: &mut C,
    ) -> Result<RenderReport>
    where
        H: HeatmapSink + ?Sized,
        C: AxisCanvas + ?Sized,
    {
        config.validate()?;

        let used_fallback = samples.is_empty();
        let data = if used_fallback {
            if config.fallback.is_empty() {
                return Err(Error::EmptyData);
            }
            warn!(fallback = config.fallback.len(), "no samples, rendering fallback set");
            config.fallback.as_slice()
        } else {
            samples
        };

        let bounds = if used_fallback {
            resolve_bounds(data, &config.bounds.for_fallback(data))?
        } else {
            resolve_bounds(data, &config.bounds)?
        };
        let transform = Transform::new(&bounds, &config.surface)?;
        let points: Vec<PixelPoint> = data
            .iter()
            .filter(|s| s.x.is_finite() && s.y.is_finite())
            .map(|s| transform.to_pixel(s))
            .collect();
        debug!(?bounds, points = points.len(), "samples mapped");

        let surface = &config.surface;
        let x_ticks: Vec<Tick> =
            generate_ticks(Axis::X, &bounds, surface, config.divisions, config.label_format)?
                .collect();
        let y_ticks: Vec<Tick> =
            generate_ticks(Axis::Y, &bounds, surface, config.divisions, config.label_format)?
                .collect();

        heatmap.reset(surface);
        heatmap.set_points(config.max_intensity, &points);

        canvas.reset(surface);
        draw_axes(canvas, surface, &x_ticks, &y_ticks, &config.axis_style);

        self.passes += 1;
        self.transform = Some(transform);
        info!(pass = self.passes, points = points.len(), used_fallback, "overlay rendered");

        Ok(RenderReport {
            bounds,
            points,
            x_ticks,
            y_ticks,
            used_fallback,
        })
    }

    /// Render with the built-in heat layer and both axis canvases.
    ///
    /// # Errors
    ///
    /// Same as [`Self::render`], plus layer configuration and rasterization
    /// errors.
    pub fn render_frame(
        &mut self,
        samples: &[Sample],
        config: &RenderConfig,
        heat: &HeatmapSettings,
    ) -> Result<Frame> {
        let mut layer = HeatLayer::new(heat);
        let mut canvas = (SvgCanvas::new(), RasterCanvas::new());
        let report = self.render(samples, config, &mut layer, &mut canvas)?;
        let heat = layer.rasterize()?;
        let (svg, raster) = canvas;

        Ok(Frame {
            report,
            heat,
            svg,
            raster,
        })
    }
}

/// Axis lines meet at the bottom-left corner of the padded plot area.
fn draw_axes<C: AxisCanvas + ?Sized>(
    canvas: &mut C,
    surface: &Surface,
    x_ticks: &[Tick],
    y_ticks: &[Tick],
    style: &AxisStyle,
) {
    let plot = surface.plot_area();
    let origin = plot.origin();
    let right = Point::new(plot.x + plot.width, origin.y);
    let top = Point::new(origin.x, plot.y);
    let line = style.line();
    let label = style.label();

    canvas.draw_line(origin, right, &line);
    canvas.draw_line(origin, top, &line);

    if style.titles {
        let (dx, dy) = X_TITLE_OFFSET;
        canvas.draw_label(Point::new(right.x + dx, right.y + dy), "X", &label);
        let (dx, dy) = Y_TITLE_OFFSET;
        canvas.draw_label(Point::new(top.x + dx, top.y + dy), "Y", &label);
    }

    for tick in x_ticks {
        let x = tick.pixel as f32;
        if style.tick_length > 0.0 {
            canvas.draw_line(
                Point::new(x, origin.y),
                Point::new(x, origin.y + style.tick_length),
                &line,
            );
        }
        canvas.draw_label(Point::new(x, origin.y + X_LABEL_DROP), &tick.label, &label);
    }

    for tick in y_ticks {
        let y = tick.pixel as f32;
        if style.tick_length > 0.0 {
            canvas.draw_line(
                Point::new(origin.x, y),
                Point::new(origin.x - style.tick_length, y),
                &line,
            );
        }
        canvas.draw_label(Point::new(origin.x + Y_LABEL_INSET, y), &tick.label, &label);
    }
}

/// Which built-in heat layer to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum HeatmapStyle {
    /// Radial kernels per point ([`DensityLayer`]).
    #[default]
    Splat,
    /// Smoothed 2D histogram ([`BinnedLayer`]).
    Binned,
}

/// Heat layer selection plus the settings of both layers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapSettings {
    /// Active layer.
    pub style: HeatmapStyle,
    /// Settings for [`HeatmapStyle::Splat`].
    pub splat: SplatConfig,
    /// Settings for [`HeatmapStyle::Binned`].
    pub binned: BinnedConfig,
}

/// One of the built-in heat layers.
#[derive(Debug, Clone)]
pub enum HeatLayer {
    /// Kernel splats.
    Splat(DensityLayer),
    /// Smoothed histogram.
    Binned(BinnedLayer),
}

impl HeatLayer {
    /// Build the layer selected by `settings`.
    #[must_use]
    pub fn new(settings: &HeatmapSettings) -> Self {
        match settings.style {
            HeatmapStyle::Splat => Self::Splat(DensityLayer::new(settings.splat)),
            HeatmapStyle::Binned => Self::Binned(BinnedLayer::new(settings.binned)),
        }
    }

    /// Rasterize the current pass.
    ///
    /// # Errors
    ///
    /// Returns the underlying layer's error.
    pub fn rasterize(&self) -> Result<Framebuffer> {
        match self {
            Self::Splat(layer) => layer.rasterize(),
            Self::Binned(layer) => layer.rasterize(),
        }
    }
}

impl HeatmapSink for HeatLayer {
    fn reset(&mut self, surface: &Surface) {
        match self {
            Self::Splat(layer) => layer.reset(surface),
            Self::Binned(layer) => layer.reset(surface),
        }
    }

    fn set_points(&mut self, max_intensity: f64, points: &[PixelPoint]) {
        match self {
            Self::Splat(layer) => layer.set_points(max_intensity, points),
            Self::Binned(layer) => layer.set_points(max_intensity, points),
        }
    }
}

/// A finished pass: the raster heat layer plus both axis renditions.
#[derive(Debug, Clone)]
pub struct Frame {
    report: RenderReport,
    heat: Framebuffer,
    svg: SvgCanvas,
    raster: RasterCanvas,
}

impl Frame {
    /// What the pass computed.
    #[must_use]
    pub const fn report(&self) -> &RenderReport {
        &self.report
    }

    /// The transparent heat layer.
    #[must_use]
    pub const fn heat(&self) -> &Framebuffer {
        &self.heat
    }

    /// SVG document: heat layer as embedded PNG, axes and labels as vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if the heat layer cannot be PNG-encoded.
    pub fn to_svg(&self) -> Result<String> {
        Ok(self.svg.to_encoder(Some(&self.heat))?.render())
    }

    /// Flattened image: white background, heat layer, axis lines.
    ///
    /// Labels are not rasterized.
    ///
    /// # Errors
    ///
    /// Returns an error if compositing or encoding fails.
    pub fn to_framebuffer(&self) -> Result<Framebuffer> {
        let mut base = white_background(&self.svg.surface())?;
        base.composite(&self.heat)?;
        self.raster.composite_onto(&mut base)?;
        Ok(base)
    }

    /// PNG bytes of [`Self::to_framebuffer`].
    ///
    /// # Errors
    ///
    /// Returns an error if compositing or encoding fails.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        PngEncoder::to_bytes(&self.to_framebuffer()?)
    }

    /// Write as SVG or PNG, chosen by the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for other extensions, or an I/O or
    /// encoding error.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("svg") => std::fs::write(path, self.to_svg()?)?,
            Some("png") => PngEncoder::write_to_file(&self.to_framebuffer()?, path)?,
            _ => {
                return Err(Error::InvalidConfig(format!(
                    "unsupported output format: {}",
                    path.display()
                )))
            }
        }
        info!(path = %path.display(), "frame written");
        Ok(())
    }
}
