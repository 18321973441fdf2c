//! Scale functions for physical-to-visual mappings.
//!
//! [`LinearScale`] maps one continuous interval onto another, [`Transform`]
//! pairs two of them into the flipped physical-to-pixel mapping used by the
//! overlay, and [`ColorScale`] maps normalized intensity to a gradient color.

use crate::bounds::Bounds;
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::geometry::{Axis, PixelPoint, Sample, Surface};

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the domain extent.
    fn domain(&self) -> (D, D);

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale for continuous-to-continuous mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl LinearScale {
    /// Create a new linear scale. The range may be inverted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateRange`] unless `domain.1 > domain.0`.
    pub fn new(axis: Axis, domain: (f64, f64), range: (f64, f64)) -> Result<Self> {
        if !(domain.1 > domain.0) || !(domain.1 - domain.0).is_finite() {
            return Err(Error::DegenerateRange {
                axis,
                min: domain.0,
                max: domain.1,
            });
        }

        Ok(Self {
            domain_min: domain.0,
            domain_max: domain.1,
            range_min: range.0,
            range_max: range.1,
        })
    }

    /// Invert the scale (range to domain).
    #[must_use]
    pub fn invert(&self, value: f64) -> f64 {
        let t = (value - self.range_min) / (self.range_max - self.range_min);
        self.domain_min + t * (self.domain_max - self.domain_min)
    }
}

impl Scale<f64, f64> for LinearScale {
    fn scale(&self, value: f64) -> f64 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f64, f64) {
        (self.range_min, self.range_max)
    }
}

/// Physical-to-pixel mapping for one bounds/surface pair.
///
/// The y axis is flipped: `min_y` lands on the bottom edge of the plot area.
/// Outputs are floored to whole pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    x: LinearScale,
    y: LinearScale,
}

impl Transform {
    /// Build the transform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateRange`] for zero-width bounds and
    /// [`Error::InvalidDimensions`] if the surface has no plot area.
    pub fn new(bounds: &Bounds, surface: &Surface) -> Result<Self> {
        surface.validate()?;
        let pad = f64::from(surface.padding);
        let width = f64::from(surface.width);
        let height = f64::from(surface.height);

        let x = LinearScale::new(Axis::X, bounds.range(Axis::X), (pad, width - pad))?;
        let y = LinearScale::new(Axis::Y, bounds.range(Axis::Y), (height - pad, pad))?;
        Ok(Self { x, y })
    }

    /// Unfloored pixel position of a physical coordinate pair.
    #[must_use]
    pub fn project(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x.scale(x), self.y.scale(y))
    }

    /// Map a sample to pixel space.
    #[must_use]
    pub fn to_pixel(&self, sample: &Sample) -> PixelPoint {
        let (px, py) = self.project(sample.x, sample.y);
        PixelPoint {
            x: px.floor() as i32,
            y: py.floor() as i32,
            value: sample.weight(),
        }
    }

    /// Map a pixel position back to physical coordinates.
    #[must_use]
    pub fn to_physical(&self, px: f64, py: f64) -> (f64, f64) {
        (self.x.invert(px), self.y.invert(py))
    }

    /// Scale for one axis.
    #[must_use]
    pub const fn axis(&self, axis: Axis) -> &LinearScale {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }
}

/// Color scale for mapping values to colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    colors: Vec<Rgba>,
    domain_min: f32,
    domain_max: f32,
}

impl ColorScale {
    /// Create a new color scale with evenly spaced stops.
    ///
    /// # Errors
    ///
    /// Returns an error if colors is empty or domain is invalid.
    pub fn new(colors: Vec<Rgba>, domain: (f32, f32)) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::InvalidConfig(
                "color scale requires at least one color".to_string(),
            ));
        }

        if !(domain.1 > domain.0) {
            return Err(Error::InvalidConfig(format!(
                "color scale domain [{}, {}] is empty",
                domain.0, domain.1
            )));
        }

        Ok(Self {
            colors,
            domain_min: domain.0,
            domain_max: domain.1,
        })
    }

    /// Blue-cyan-lime-yellow-red gradient used by browser heat layers.
    #[must_use]
    pub fn spectral_heat(domain: (f32, f32)) -> Option<Self> {
        Self::new(
            vec![
                Rgba::rgb(0, 0, 255),
                Rgba::rgb(0, 255, 255),
                Rgba::rgb(0, 255, 0),
                Rgba::rgb(255, 255, 0),
                Rgba::rgb(255, 0, 0),
            ],
            domain,
        )
        .ok()
    }

    /// Yellow-orange-red sequential scale without dark tones.
    #[must_use]
    pub fn yl_or_rd(domain: (f32, f32)) -> Option<Self> {
        Self::new(
            vec![
                Rgba::rgb(255, 255, 204),
                Rgba::rgb(254, 217, 118),
                Rgba::rgb(253, 141, 60),
                Rgba::rgb(227, 26, 28),
                Rgba::rgb(128, 0, 38),
            ],
            domain,
        )
        .ok()
    }
}

impl Scale<f32, Rgba> for ColorScale {
    fn scale(&self, value: f32) -> Rgba {
        let t = ((value - self.domain_min) / (self.domain_max - self.domain_min)).clamp(0.0, 1.0);

        if self.colors.len() == 1 {
            return self.colors[0];
        }

        let segment_count = self.colors.len() - 1;
        let segment = (t * segment_count as f32).floor() as usize;
        let segment = segment.min(segment_count - 1);

        let local_t = t * segment_count as f32 - segment as f32;

        self.colors[segment].lerp(self.colors[segment + 1], local_t)
    }

    fn domain(&self) -> (f32, f32) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (Rgba, Rgba) {
        (
            *self.colors.first().unwrap_or(&Rgba::BLACK),
            *self.colors.last().unwrap_or(&Rgba::WHITE),
        )
    }
}
