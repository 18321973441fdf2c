//! Geometric types shared by the mapper and the renderers.
//!
//! Physical-space samples, pixel-space points, and the drawing surface they are
//! mapped onto.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two plot axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

/// A physical-space point with an optional intensity weight.
///
/// Deserializes from the `{ "x": .., "y": .., "value"?: .. }` objects served by
/// the heatmap endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Physical x coordinate.
    pub x: f64,
    /// Physical y coordinate.
    pub y: f64,
    /// Intensity weight; `None` counts as 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl Sample {
    /// Create a sample with the default weight.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, value: None }
    }

    /// Create a sample with an explicit weight.
    #[must_use]
    pub const fn weighted(x: f64, y: f64, value: f64) -> Self {
        Self {
            x,
            y,
            value: Some(value),
        }
    }

    /// Weight used for rendering.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.value.unwrap_or(1.0)
    }

    /// Coordinate along one axis.
    #[must_use]
    pub const fn coord(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

/// A sample mapped into pixel space (origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelPoint {
    /// Pixel column.
    pub x: i32,
    /// Pixel row.
    pub y: i32,
    /// Intensity weight carried over from the sample.
    pub value: f64,
}

/// Target drawing rectangle with an inset reserved for axes and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Inset on every side, excluded from the plot area.
    #[serde(default)]
    pub padding: u32,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            padding: 60,
        }
    }
}

impl Surface {
    /// Create a validated surface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if the padding leaves no plot area.
    pub fn new(width: u32, height: u32, padding: u32) -> Result<Self> {
        let surface = Self {
            width,
            height,
            padding,
        };
        surface.validate()?;
        Ok(surface)
    }

    /// Check that the padded plot area is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `2 * padding` consumes either side.
    pub fn validate(&self) -> Result<()> {
        let inset = u64::from(self.padding) * 2;
        if u64::from(self.width) <= inset || u64::from(self.height) <= inset {
            return Err(Error::InvalidDimensions {
                width: self.width,
                height: self.height,
                padding: self.padding,
            });
        }
        Ok(())
    }

    /// Width of the plot area in pixels.
    #[must_use]
    pub fn plot_width(&self) -> f64 {
        f64::from(self.width) - 2.0 * f64::from(self.padding)
    }

    /// Height of the plot area in pixels.
    #[must_use]
    pub fn plot_height(&self) -> f64 {
        f64::from(self.height) - 2.0 * f64::from(self.padding)
    }

    /// The padded plot area.
    #[must_use]
    pub fn plot_area(&self) -> Rect {
        Rect::new(
            self.padding as f32,
            self.padding as f32,
            self.plot_width() as f32,
            self.plot_height() as f32,
        )
    }
}

/// A 2D point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<PixelPoint> for Point {
    fn from(p: PixelPoint) -> Self {
        Self::new(p.x as f32, p.y as f32)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Bottom-left corner, where the two axes meet.
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y + self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_weight_defaults_to_one() {
        assert_eq!(Sample::new(1.0, 2.0).weight(), 1.0);
        assert_eq!(Sample::weighted(1.0, 2.0, 4.5).weight(), 4.5);
    }

    #[test]
    fn test_sample_deserialize_optional_value() {
        let samples: Vec<Sample> =
            serde_json::from_str(r#"[{"x": 0.1, "y": 2}, {"x": 1, "y": 2, "value": 3}]"#).unwrap();
        assert_eq!(samples[0], Sample::new(0.1, 2.0));
        assert_eq!(samples[1], Sample::weighted(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_surface_rejects_oversized_padding() {
        assert!(Surface::new(100, 100, 50).is_err());
        assert!(Surface::new(100, 20, 10).is_err());
        assert!(Surface::new(100, 100, 0).is_ok());
    }

    #[test]
    fn test_surface_plot_area() {
        let surface = Surface::new(100, 80, 10).unwrap();
        assert_eq!(surface.plot_width(), 80.0);
        assert_eq!(surface.plot_height(), 60.0);

        let area = surface.plot_area();
        assert_eq!(area.origin(), Point::new(10.0, 70.0));
        assert!(area.contains(Point::new(50.0, 40.0)));
        assert!(!area.contains(Point::new(5.0, 40.0)));
    }

    #[test]
    fn test_axis_display() {
        assert_eq!(Axis::X.to_string(), "x");
        assert_eq!(Axis::Y.to_string(), "y");
    }
}
