//! Point-splat heat layer.
//!
//! Every mapped point stamps a radial kernel into an intensity field. Kernels
//! stack with the "over" rule, so overlapping points saturate toward 1 instead
//! of overflowing. The field is then colored through a gradient and its alpha
//! clamped into the configured opacity band, which is how browser heat layers
//! draw over a page.

use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::geometry::{PixelPoint, Surface};
use crate::render::HeatmapSink;
use crate::scale::{ColorScale, Scale};
use serde::{Deserialize, Serialize};
use tracing::debug;
use trueno::Vector;

/// Gradient used to color intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapPalette {
    /// Blue through red.
    #[default]
    Spectral,
    /// Yellow-orange-red.
    YlOrRd,
}

impl HeatmapPalette {
    pub(crate) fn color_scale(self, domain: (f32, f32)) -> Result<ColorScale> {
        let scale = match self {
            Self::Spectral => ColorScale::spectral_heat(domain),
            Self::YlOrRd => ColorScale::yl_or_rd(domain),
        };
        scale.ok_or_else(|| {
            Error::InvalidConfig(format!("palette domain [{}, {}] is empty", domain.0, domain.1))
        })
    }
}

/// Kernel and opacity settings for [`DensityLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplatConfig {
    /// Kernel radius in pixels.
    pub radius: u32,
    /// Fraction of the radius over which the kernel fades out (0..=1).
    pub blur: f32,
    /// Upper alpha bound for colored pixels.
    pub max_opacity: f32,
    /// Lower alpha bound for colored pixels.
    pub min_opacity: f32,
    /// Gradient.
    pub palette: HeatmapPalette,
}

impl Default for SplatConfig {
    fn default() -> Self {
        Self {
            radius: 35,
            blur: 0.75,
            max_opacity: 0.6,
            min_opacity: 0.1,
            palette: HeatmapPalette::Spectral,
        }
    }
}

impl SplatConfig {
    /// Check ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a zero radius, a blur outside
    /// `0..=1`, or an inverted/out-of-range opacity band.
    pub fn validate(&self) -> Result<()> {
        if self.radius == 0 {
            return Err(Error::InvalidConfig("splat radius must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.blur) {
            return Err(Error::InvalidConfig(format!(
                "blur must be within 0..=1, got {}",
                self.blur
            )));
        }
        let band = 0.0..=1.0;
        if !band.contains(&self.min_opacity)
            || !band.contains(&self.max_opacity)
            || self.min_opacity > self.max_opacity
        {
            return Err(Error::InvalidConfig(format!(
                "opacity band [{}, {}] must be ordered within 0..=1",
                self.min_opacity, self.max_opacity
            )));
        }
        Ok(())
    }
}

/// Raster heat layer built from splatted points.
#[derive(Debug, Clone)]
pub struct DensityLayer {
    config: SplatConfig,
    surface: Option<Surface>,
    max_intensity: f64,
    points: Vec<PixelPoint>,
}

impl DensityLayer {
    /// Create an empty layer.
    #[must_use]
    pub fn new(config: SplatConfig) -> Self {
        Self {
            config,
            surface: None,
            max_intensity: 1.0,
            points: Vec::new(),
        }
    }

    /// Points of the current pass.
    #[must_use]
    pub fn points(&self) -> &[PixelPoint] {
        &self.points
    }

    /// Intensity treated as full heat in the current pass.
    #[must_use]
    pub const fn max_intensity(&self) -> f64 {
        self.max_intensity
    }

    /// Radial falloff at distance `d`: 1 inside the solid core, linear fade to
    /// 0 at the radius.
    fn falloff(&self, d: f32) -> f32 {
        let radius = self.config.radius as f32;
        if d > radius {
            return 0.0;
        }
        let core = radius * (1.0 - self.config.blur);
        if d <= core {
            1.0
        } else {
            1.0 - (d - core) / (radius - core)
        }
    }

    /// Accumulated intensity field, row-major, values in `0..=1`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rendering`] if the layer was never reset to a surface.
    pub fn intensity_field(&self) -> Result<(Surface, Vec<f32>)> {
        let surface = self
            .surface
            .ok_or_else(|| Error::Rendering("density layer has no surface".to_string()))?;
        let (w, h) = (i64::from(surface.width), i64::from(surface.height));
        let mut field = vec![0.0f32; (w as usize) * (h as usize)];

        // Window math in i64: pixels far outside fixed bounds sit near i32::MAX.
        let r = i64::from(self.config.radius);
        let max = self.max_intensity.max(f64::EPSILON);

        for p in &self.points {
            let strength = (p.value / max).clamp(0.0, 1.0) as f32;
            if strength == 0.0 {
                continue;
            }
            let (px, py) = (i64::from(p.x), i64::from(p.y));
            let (x0, x1) = ((px - r).max(0), (px + r).min(w - 1));
            let (y0, y1) = ((py - r).max(0), (py + r).min(h - 1));
            if x0 > x1 || y0 > y1 {
                continue;
            }
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let d = (((x - px).pow(2) + (y - py).pow(2)) as f32).sqrt();
                    let k = self.falloff(d) * strength;
                    if k > 0.0 {
                        let cell = &mut field[(y * w + x) as usize];
                        *cell = k + *cell * (1.0 - k);
                    }
                }
            }
        }

        Ok((surface, field))
    }

    /// Highest intensity in the field.
    ///
    /// # Errors
    ///
    /// Same as [`Self::intensity_field`].
    pub fn peak(&self) -> Result<f32> {
        let (_, field) = self.intensity_field()?;
        Ok(Vector::from_vec(field).max().unwrap_or(0.0))
    }

    /// Rasterize the layer onto a transparent framebuffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer has no surface or the config is invalid.
    pub fn rasterize(&self) -> Result<Framebuffer> {
        self.config.validate()?;
        let (surface, field) = self.intensity_field()?;
        let colors = self.config.palette.color_scale((0.0, 1.0))?;
        let mut fb = Framebuffer::new(surface.width, surface.height)?;

        let (lo, hi) = (self.config.min_opacity, self.config.max_opacity);
        let mut lit = 0usize;
        for (i, &a) in field.iter().enumerate() {
            if a <= 0.0 {
                continue;
            }
            lit += 1;
            let alpha = a.clamp(lo, hi);
            let color = colors.scale(a).with_alpha((alpha * 255.0).round() as u8);
            let x = (i % surface.width as usize) as u32;
            let y = (i / surface.width as usize) as u32;
            fb.set_pixel(x, y, color);
        }
        debug!(points = self.points.len(), lit, "density layer rasterized");

        Ok(fb)
    }
}

impl Default for DensityLayer {
    fn default() -> Self {
        Self::new(SplatConfig::default())
    }
}

impl HeatmapSink for DensityLayer {
    fn reset(&mut self, surface: &Surface) {
        self.surface = Some(*surface);
        self.points.clear();
        self.max_intensity = 1.0;
    }

    fn set_points(&mut self, max_intensity: f64, points: &[PixelPoint]) {
        self.max_intensity = max_intensity;
        self.points = points.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    fn layer_with(points: &[PixelPoint], max: f64) -> DensityLayer {
        let mut layer = DensityLayer::new(SplatConfig {
            radius: 10,
            ..SplatConfig::default()
        });
        layer.reset(&Surface::new(100, 100, 10).unwrap());
        layer.set_points(max, points);
        layer
    }

    fn pt(x: i32, y: i32, value: f64) -> PixelPoint {
        PixelPoint { x, y, value }
    }

    #[test]
    fn test_unreset_layer_fails() {
        let layer = DensityLayer::default();
        assert!(matches!(layer.rasterize(), Err(Error::Rendering(_))));
    }

    #[test]
    fn test_kernel_peaks_at_center() {
        let layer = layer_with(&[pt(50, 50, 10.0)], 10.0);
        let (surface, field) = layer.intensity_field().unwrap();
        let at = |x: usize, y: usize| field[y * surface.width as usize + x];
        assert_eq!(at(50, 50), 1.0);
        assert!(at(57, 50) < at(53, 50));
        assert_eq!(at(61, 50), 0.0);
    }

    #[test]
    fn test_intensity_normalized_by_max() {
        let layer = layer_with(&[pt(50, 50, 1.0)], 10.0);
        let peak = layer.peak().unwrap();
        assert!((peak - 0.1).abs() < 1e-6, "peak = {peak}");
    }

    #[test]
    fn test_overlap_saturates_below_one() {
        let points = vec![pt(50, 50, 5.0); 20];
        let layer = layer_with(&points, 10.0);
        let peak = layer.peak().unwrap();
        assert!(peak <= 1.0);
        assert!(peak > 0.99);
    }

    #[test]
    fn test_rasterize_alpha_band() {
        let layer = layer_with(&[pt(50, 50, 10.0)], 10.0);
        let fb = layer.rasterize().unwrap();

        let center = fb.get_pixel(50, 50).unwrap();
        assert_eq!(center.a, (0.6f32 * 255.0).round() as u8);
        assert_eq!(center.r, 255);

        let far = fb.get_pixel(5, 5).unwrap();
        assert_eq!(far, Rgba::TRANSPARENT);
    }

    #[test]
    fn test_points_outside_surface_are_clipped() {
        let layer = layer_with(&[pt(-30, 50, 10.0), pt(105, 105, 10.0)], 10.0);
        let fb = layer.rasterize().unwrap();
        // The second kernel reaches back inside the corner.
        assert!(fb.get_pixel(99, 99).unwrap().a > 0);
        assert_eq!(fb.get_pixel(0, 50), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_extreme_pixel_coordinates_are_skipped() {
        let far = [
            pt(i32::MAX, 50, 10.0),
            pt(i32::MIN, 50, 10.0),
            pt(50, i32::MAX, 10.0),
            pt(50, i32::MIN, 10.0),
        ];
        let layer = layer_with(&far, 10.0);
        assert_eq!(layer.peak().unwrap(), 0.0);

        let mut mixed = far.to_vec();
        mixed.push(pt(50, 50, 10.0));
        let layer = layer_with(&mixed, 10.0);
        assert_eq!(layer.peak().unwrap(), 1.0);
    }

    #[test]
    fn test_reset_discards_previous_points() {
        let mut layer = layer_with(&[pt(50, 50, 10.0)], 10.0);
        layer.reset(&Surface::new(60, 40, 5).unwrap());
        assert!(layer.points().is_empty());
        let fb = layer.rasterize().unwrap();
        assert_eq!(fb.width(), 60);
        assert_eq!(fb.get_pixel(30, 20), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_config_validation() {
        assert!(SplatConfig::default().validate().is_ok());
        let bad = SplatConfig {
            min_opacity: 0.8,
            max_opacity: 0.2,
            ..SplatConfig::default()
        };
        assert!(bad.validate().is_err());
        let zero = SplatConfig {
            radius: 0,
            ..SplatConfig::default()
        };
        assert!(zero.validate().is_err());
    }
}
