//! Grid-binned heat layer.
//!
//! Points are accumulated into a coarse 2D histogram over the surface, the
//! histogram is smoothed with a separable Gaussian, and every non-empty cell is
//! painted as a block colored on a scale clamped at `z_max`.

use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::geometry::{PixelPoint, Surface};
use crate::plots::HeatmapPalette;
use crate::render::HeatmapSink;
use crate::scale::Scale;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Grid and smoothing settings for [`BinnedLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinnedConfig {
    /// Number of columns.
    pub cols: usize,
    /// Number of rows.
    pub rows: usize,
    /// Gaussian sigma in cells; 0 disables smoothing.
    pub sigma: f32,
    /// Smoothed value that maps to the top of the color scale.
    pub z_max: f32,
    /// Uniform alpha of painted cells.
    pub opacity: f32,
    /// Gradient.
    pub palette: HeatmapPalette,
}

impl Default for BinnedConfig {
    fn default() -> Self {
        Self {
            cols: 150,
            rows: 150,
            sigma: 2.0,
            z_max: 2.0,
            opacity: 0.75,
            palette: HeatmapPalette::YlOrRd,
        }
    }
}

impl BinnedConfig {
    /// Check ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an empty grid, a negative sigma, a
    /// non-positive `z_max`, or an opacity outside `0..=1`.
    pub fn validate(&self) -> Result<()> {
        if self.cols == 0 || self.rows == 0 {
            return Err(Error::InvalidConfig(format!(
                "binning grid {}x{} is empty",
                self.cols, self.rows
            )));
        }
        if !(self.sigma >= 0.0) {
            return Err(Error::InvalidConfig(format!("sigma must be >= 0, got {}", self.sigma)));
        }
        if !(self.z_max > 0.0) {
            return Err(Error::InvalidConfig(format!("z_max must be > 0, got {}", self.z_max)));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(Error::InvalidConfig(format!(
                "opacity must be within 0..=1, got {}",
                self.opacity
            )));
        }
        Ok(())
    }
}

/// Raster heat layer built from a smoothed 2D histogram.
#[derive(Debug, Clone, Default)]
pub struct BinnedLayer {
    config: BinnedConfig,
    surface: Option<Surface>,
    points: Vec<PixelPoint>,
}

impl BinnedLayer {
    /// Create an empty layer.
    #[must_use]
    pub fn new(config: BinnedConfig) -> Self {
        Self {
            config,
            surface: None,
            points: Vec::new(),
        }
    }

    /// Weighted histogram of the current points, row-major `rows x cols`.
    ///
    /// Points outside the surface are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer has no surface or the config is invalid.
    pub fn histogram(&self) -> Result<Vec<f32>> {
        self.config.validate()?;
        let surface = self
            .surface
            .ok_or_else(|| Error::Rendering("binned layer has no surface".to_string()))?;
        let BinnedConfig { cols, rows, .. } = self.config;
        let mut grid = vec![0.0f32; cols * rows];

        let (w, h) = (f64::from(surface.width), f64::from(surface.height));
        for p in &self.points {
            let (x, y) = (f64::from(p.x), f64::from(p.y));
            if x < 0.0 || y < 0.0 || x >= w || y >= h {
                continue;
            }
            let col = ((x / w * cols as f64) as usize).min(cols - 1);
            let row = ((y / h * rows as f64) as usize).min(rows - 1);
            grid[row * cols + col] += p.value as f32;
        }
        Ok(grid)
    }

    /// Histogram after Gaussian smoothing.
    ///
    /// # Errors
    ///
    /// Same as [`Self::histogram`].
    pub fn smoothed(&self) -> Result<Vec<f32>> {
        let grid = self.histogram()?;
        Ok(gaussian_blur(&grid, self.config.cols, self.config.rows, self.config.sigma))
    }

    /// Rasterize the layer onto a transparent framebuffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer has no surface or the config is invalid.
    pub fn rasterize(&self) -> Result<Framebuffer> {
        let smoothed = self.smoothed()?;
        let surface = self
            .surface
            .ok_or_else(|| Error::Rendering("binned layer has no surface".to_string()))?;
        let colors = self.config.palette.color_scale((0.0, self.config.z_max))?;
        let alpha = (self.config.opacity * 255.0).round() as u8;
        let BinnedConfig { cols, rows, .. } = self.config;

        let mut fb = Framebuffer::new(surface.width, surface.height)?;
        let edge = |i: usize, n: usize, len: u32| (i as u64 * u64::from(len) / n as u64) as u32;

        let mut painted = 0usize;
        for row in 0..rows {
            let (y0, y1) = (edge(row, rows, surface.height), edge(row + 1, rows, surface.height));
            for col in 0..cols {
                let z = smoothed[row * cols + col];
                if z <= 0.0 {
                    continue;
                }
                painted += 1;
                let (x0, x1) = (edge(col, cols, surface.width), edge(col + 1, cols, surface.width));
                fb.fill_rect(x0, y0, x1 - x0, y1 - y0, colors.scale(z).with_alpha(alpha));
            }
        }
        debug!(points = self.points.len(), painted, "binned layer rasterized");

        Ok(fb)
    }
}

impl HeatmapSink for BinnedLayer {
    fn reset(&mut self, surface: &Surface) {
        self.surface = Some(*surface);
        self.points.clear();
    }

    // Absolute weights are binned; the color scale's `z_max` plays the role of
    // the maximum intensity.
    fn set_points(&mut self, _max_intensity: f64, points: &[PixelPoint]) {
        self.points = points.to_vec();
    }
}

/// Normalized 1D Gaussian kernel truncated at four sigma.
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (4.0 * sigma + 0.5) as i32;
    let weights: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Mirror an out-of-range index back into `0..n` (edge sample repeated).
fn reflect(i: i32, n: i32) -> usize {
    let period = 2 * n;
    let m = i.rem_euclid(period);
    (if m < n { m } else { period - 1 - m }) as usize
}

/// Separable Gaussian blur with reflected edges.
fn gaussian_blur(grid: &[f32], cols: usize, rows: usize, sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return grid.to_vec();
    }
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as i32;

    let mut horizontal = vec![0.0f32; grid.len()];
    for row in 0..rows {
        for col in 0..cols {
            horizontal[row * cols + col] = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| {
                    let c = reflect(col as i32 + k as i32 - radius, cols as i32);
                    w * grid[row * cols + c]
                })
                .sum();
        }
    }

    let mut out = vec![0.0f32; grid.len()];
    for row in 0..rows {
        for col in 0..cols {
            out[row * cols + col] = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| {
                    let r = reflect(row as i32 + k as i32 - radius, rows as i32);
                    w * horizontal[r * cols + col]
                })
                .sum();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use approx::assert_relative_eq;

    fn layer(config: BinnedConfig, points: &[PixelPoint]) -> BinnedLayer {
        let mut layer = BinnedLayer::new(config);
        layer.reset(&Surface::new(100, 100, 0).unwrap());
        layer.set_points(10.0, points);
        layer
    }

    fn pt(x: i32, y: i32) -> PixelPoint {
        PixelPoint { x, y, value: 1.0 }
    }

    fn grid(cols: usize, rows: usize, sigma: f32) -> BinnedConfig {
        BinnedConfig {
            cols,
            rows,
            sigma,
            ..BinnedConfig::default()
        }
    }

    #[test]
    fn test_histogram_bins_and_clips() {
        let l = layer(grid(10, 10, 0.0), &[pt(5, 5), pt(9, 9), pt(95, 15), pt(-1, 5), pt(100, 5)]);
        let h = l.histogram().unwrap();
        assert_eq!(h[0], 2.0);
        assert_eq!(h[10 + 9], 1.0);
        assert_relative_eq!(h.iter().sum::<f32>(), 3.0);
    }

    #[test]
    fn test_histogram_drops_saturated_pixels() {
        let far = [pt(i32::MAX, 5), pt(i32::MIN, 5), pt(5, i32::MAX), pt(5, i32::MIN)];
        let l = layer(grid(10, 10, 2.0), &far);
        assert_eq!(l.histogram().unwrap().iter().sum::<f32>(), 0.0);
        assert!(l.rasterize().is_ok());
    }

    #[test]
    fn test_blur_preserves_mass_and_spreads() {
        let l = layer(grid(20, 20, 2.0), &[pt(50, 50)]);
        let raw = l.histogram().unwrap();
        let smooth = l.smoothed().unwrap();
        assert_relative_eq!(
            smooth.iter().sum::<f32>(),
            raw.iter().sum::<f32>(),
            epsilon = 1e-4
        );
        let center = 10 * 20 + 10;
        assert!(smooth[center] < 1.0);
        assert!(smooth[center + 1] > 0.0);
        // Beyond the truncated kernel nothing is lit.
        assert_eq!(smooth[0], 0.0);
    }

    #[test]
    fn test_rasterize_paints_only_nonempty_cells() {
        let l = layer(grid(10, 10, 0.0), &[pt(55, 55)]);
        let fb = l.rasterize().unwrap();
        let lit = fb.get_pixel(52, 57).unwrap();
        assert_eq!(lit.a, (0.75f32 * 255.0).round() as u8);
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::TRANSPARENT));
        assert_eq!(fb.get_pixel(60, 55), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_reflect_indices() {
        assert_eq!(reflect(-1, 5), 0);
        assert_eq!(reflect(-2, 5), 1);
        assert_eq!(reflect(5, 5), 4);
        assert_eq!(reflect(6, 5), 3);
        assert_eq!(reflect(2, 5), 2);
    }

    #[test]
    fn test_config_validation() {
        assert!(BinnedConfig::default().validate().is_ok());
        assert!(grid(0, 10, 1.0).validate().is_err());
        assert!(grid(10, 10, -1.0).validate().is_err());
    }

    #[test]
    fn test_unreset_layer_fails() {
        assert!(BinnedLayer::default().rasterize().is_err());
    }
}
