//! Axis tick generation.
//!
//! Ticks are evenly spaced along the padded plot edge and labelled with the
//! physical value at that position. Generation is lazy: [`TickIter`] computes
//! each tick on demand and can be cloned to restart from the same position.

use crate::bounds::Bounds;
use crate::error::{Error, Result};
use crate::geometry::{Axis, Surface};
use serde::{Deserialize, Serialize};

/// Number formatting for tick labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelFormat {
    /// Nearest integer, halves rounded up (`2.5 -> 3`, `-2.5 -> -2`).
    #[default]
    Rounded,
    /// Fixed number of decimal places.
    Fixed(usize),
}

impl LabelFormat {
    /// Format a tick value.
    #[must_use]
    pub fn format(self, value: f64) -> String {
        let text = match self {
            Self::Rounded => format!("{}", (value + 0.5).floor()),
            Self::Fixed(decimals) => format!("{value:.decimals$}"),
        };
        strip_negative_zero(text)
    }
}

/// `-0`, `-0.00` and friends print without the sign.
fn strip_negative_zero(text: String) -> String {
    match text.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => text,
    }
}

/// A single axis tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Position in `0..=divisions`.
    pub index: usize,
    /// Pixel coordinate along the axis (x for [`Axis::X`], y for [`Axis::Y`]).
    pub pixel: i32,
    /// Physical value at this tick.
    pub value: f64,
    /// Formatted label.
    pub label: String,
}

/// Lazy iterator over the `divisions + 1` ticks of one axis.
#[derive(Debug, Clone)]
pub struct TickIter {
    axis: Axis,
    min: f64,
    max: f64,
    origin: f64,
    length: f64,
    divisions: usize,
    format: LabelFormat,
    next: usize,
}

impl TickIter {
    /// Axis the ticks belong to.
    #[must_use]
    pub const fn axis(&self) -> Axis {
        self.axis
    }

    fn tick(&self, index: usize) -> Tick {
        let frac = index as f64 / self.divisions as f64;
        let step = index as f64 * self.length / self.divisions as f64;
        let pixel = match self.axis {
            Axis::X => self.origin + step,
            Axis::Y => self.origin - step,
        };
        let value = self.min + frac * (self.max - self.min);
        Tick {
            index,
            pixel: pixel.floor() as i32,
            value,
            label: self.format.format(value),
        }
    }
}

impl Iterator for TickIter {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        if self.next > self.divisions {
            return None;
        }
        let tick = self.tick(self.next);
        self.next += 1;
        Some(tick)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.divisions + 1).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TickIter {}

/// Generate the ticks for one axis.
///
/// X ticks run left to right from the left padding edge; Y ticks run bottom to
/// top from `height - padding`, mirroring the flipped data transform.
///
/// # Errors
///
/// - [`Error::InvalidConfig`] if `divisions` is zero.
/// - [`Error::DegenerateRange`] / [`Error::InvalidDimensions`] for invalid
///   bounds or surface.
pub fn generate_ticks(
    axis: Axis,
    bounds: &Bounds,
    surface: &Surface,
    divisions: usize,
    format: LabelFormat,
) -> Result<TickIter> {
    if divisions == 0 {
        return Err(Error::InvalidConfig(
            "axis divisions must be at least 1".to_string(),
        ));
    }
    bounds.validate()?;
    surface.validate()?;

    let (min, max) = bounds.range(axis);
    let pad = f64::from(surface.padding);
    let (origin, length) = match axis {
        Axis::X => (pad, surface.plot_width()),
        Axis::Y => (f64::from(surface.height) - pad, surface.plot_height()),
    };

    Ok(TickIter {
        axis,
        min,
        max,
        origin,
        length,
        divisions,
        format,
        next: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hundred() -> Bounds {
        Bounds::new(0.0, 100.0, 0.0, 100.0).unwrap()
    }

    fn labels(iter: TickIter) -> Vec<String> {
        iter.map(|t| t.label).collect()
    }

    #[test]
    fn test_five_divisions_over_hundred() {
        let surface = Surface::new(100, 100, 10).unwrap();
        let ticks = generate_ticks(Axis::X, &hundred(), &surface, 5, LabelFormat::Rounded).unwrap();
        assert_eq!(ticks.len(), 6);
        assert_eq!(labels(ticks), ["0", "20", "40", "60", "80", "100"]);
    }

    #[test]
    fn test_fixed_two_decimals() {
        let surface = Surface::new(100, 100, 10).unwrap();
        let bounds = Bounds::new(0.1, 1.0, 0.0, 1.0).unwrap();
        let ticks =
            generate_ticks(Axis::X, &bounds, &surface, 3, LabelFormat::Fixed(2)).unwrap();
        assert_eq!(labels(ticks), ["0.10", "0.40", "0.70", "1.00"]);
    }

    #[test]
    fn test_x_positions() {
        let surface = Surface::new(100, 100, 10).unwrap();
        let ticks = generate_ticks(Axis::X, &hundred(), &surface, 4, LabelFormat::Rounded).unwrap();
        let pixels: Vec<i32> = ticks.map(|t| t.pixel).collect();
        assert_eq!(pixels, [10, 30, 50, 70, 90]);
    }

    #[test]
    fn test_y_positions_flipped() {
        let surface = Surface::new(100, 100, 10).unwrap();
        let ticks = generate_ticks(Axis::Y, &hundred(), &surface, 4, LabelFormat::Rounded).unwrap();
        let pixels: Vec<i32> = ticks.map(|t| t.pixel).collect();
        assert_eq!(pixels, [90, 70, 50, 30, 10]);
    }

    #[test]
    fn test_restartable_and_idempotent() {
        let surface = Surface::default();
        let ticks = generate_ticks(Axis::Y, &hundred(), &surface, 5, LabelFormat::Rounded).unwrap();
        let restart = ticks.clone();
        let first: Vec<Tick> = ticks.collect();
        let second: Vec<Tick> = restart.collect();
        assert_eq!(first, second);

        let again: Vec<Tick> =
            generate_ticks(Axis::Y, &hundred(), &surface, 5, LabelFormat::Rounded)
                .unwrap()
                .collect();
        assert_eq!(first, again);
    }

    #[test]
    fn test_size_hint_tracks_progress() {
        let surface = Surface::default();
        let mut ticks =
            generate_ticks(Axis::X, &hundred(), &surface, 2, LabelFormat::Rounded).unwrap();
        assert_eq!(ticks.len(), 3);
        ticks.next();
        assert_eq!(ticks.len(), 2);
        ticks.by_ref().for_each(drop);
        assert_eq!(ticks.len(), 0);
        assert!(ticks.next().is_none());
    }

    #[test]
    fn test_zero_divisions_rejected() {
        let surface = Surface::default();
        let result = generate_ticks(Axis::X, &hundred(), &surface, 0, LabelFormat::Rounded);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rounding_matches_half_up() {
        assert_eq!(LabelFormat::Rounded.format(2.5), "3");
        assert_eq!(LabelFormat::Rounded.format(-2.5), "-2");
        assert_eq!(LabelFormat::Rounded.format(-0.2), "0");
        assert_eq!(LabelFormat::Fixed(2).format(-0.001), "0.00");
        assert_eq!(LabelFormat::Fixed(1).format(-1.26), "-1.3");
    }

    #[test]
    fn test_label_format_from_yaml() {
        let rounded: LabelFormat = serde_yaml_ng::from_str("rounded").unwrap();
        assert_eq!(rounded, LabelFormat::Rounded);

        let yaml = serde_yaml_ng::to_string(&LabelFormat::Fixed(2)).unwrap();
        let fixed: LabelFormat = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(fixed, LabelFormat::Fixed(2));
    }
}
