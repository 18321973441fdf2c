//! Physical-space bounds and the policies that resolve them.
//!
//! Bounds are the rectangle of physical coordinates stretched over the padded
//! plot area. They can be fixed, derived from the current samples, or a mix of
//! both (pinned edges, a minimum span per axis, an enlargement factor).

use crate::error::{Error, Result};
use crate::geometry::{Axis, Sample};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Physical-space window mapped onto the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub min_x: f64,
    /// Right edge.
    pub max_x: f64,
    /// Bottom edge.
    pub min_y: f64,
    /// Top edge.
    pub max_y: f64,
}

impl Bounds {
    /// Create validated bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateRange`] unless `max > min` on both axes.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Result<Self> {
        let bounds = Self {
            min_x,
            max_x,
            min_y,
            max_y,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Check the strict `max > min` invariant on both axes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateRange`] naming the first offending axis. NaN
    /// edges fail the check as well.
    pub fn validate(&self) -> Result<()> {
        for axis in [Axis::X, Axis::Y] {
            let (min, max) = self.range(axis);
            // Negated so NaN lands in the error branch.
            if !(max > min) || !(max - min).is_finite() {
                return Err(Error::DegenerateRange { axis, min, max });
            }
        }
        Ok(())
    }

    /// `(min, max)` along one axis.
    #[must_use]
    pub const fn range(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => (self.min_x, self.max_x),
            Axis::Y => (self.min_y, self.max_y),
        }
    }

    /// Width of the range along one axis.
    #[must_use]
    pub fn span(&self, axis: Axis) -> f64 {
        let (min, max) = self.range(axis);
        max - min
    }

    fn set_range(&mut self, axis: Axis, (min, max): (f64, f64)) {
        match axis {
            Axis::X => {
                self.min_x = min;
                self.max_x = max;
            }
            Axis::Y => {
                self.min_y = min;
                self.max_y = max;
            }
        }
    }

    /// Scale both spans around their midpoints by `factor`.
    #[must_use]
    pub fn enlarged(mut self, factor: f64) -> Self {
        for axis in [Axis::X, Axis::Y] {
            let (min, max) = self.range(axis);
            let mid = (min + max) / 2.0;
            let half = (max - min) / 2.0 * factor;
            self.set_range(axis, (mid - half, mid + half));
        }
        self
    }

    /// Min/max extent of the samples, skipping non-finite coordinates.
    ///
    /// The result is not validated: a single sample yields zero-width ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyData`] if no sample has finite coordinates.
    pub fn extent_of(samples: &[Sample]) -> Result<Self> {
        let mut extent: Option<Self> = None;
        for s in samples.iter().filter(|s| s.x.is_finite() && s.y.is_finite()) {
            extent = Some(match extent {
                None => Self {
                    min_x: s.x,
                    max_x: s.x,
                    min_y: s.y,
                    max_y: s.y,
                },
                Some(b) => Self {
                    min_x: b.min_x.min(s.x),
                    max_x: b.max_x.max(s.x),
                    min_y: b.min_y.min(s.y),
                    max_y: b.max_y.max(s.y),
                },
            });
        }
        extent.ok_or(Error::EmptyData)
    }
}

/// Edges forced to a constant while the others follow the data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PinnedEdges {
    /// Fixed left edge.
    #[serde(default)]
    pub min_x: Option<f64>,
    /// Fixed right edge.
    #[serde(default)]
    pub max_x: Option<f64>,
    /// Fixed bottom edge.
    #[serde(default)]
    pub min_y: Option<f64>,
    /// Fixed top edge.
    #[serde(default)]
    pub max_y: Option<f64>,
}

/// Default ranges used when the data covers less than their span.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MinimumSpan {
    /// Default x range.
    #[serde(default)]
    pub x: Option<(f64, f64)>,
    /// Default y range.
    #[serde(default)]
    pub y: Option<(f64, f64)>,
}

impl MinimumSpan {
    /// Range configured for one axis.
    #[must_use]
    pub const fn get(&self, axis: Axis) -> Option<(f64, f64)> {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Replace the range for one axis.
    pub fn set(&mut self, axis: Axis, range: (f64, f64)) {
        match axis {
            Axis::X => self.x = Some(range),
            Axis::Y => self.y = Some(range),
        }
    }
}

/// How bounds are derived for each render pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsPolicy {
    /// Use these bounds unconditionally.
    #[serde(default)]
    pub fixed: Option<Bounds>,
    /// Edges pinned to constants.
    #[serde(default)]
    pub pin: PinnedEdges,
    /// Per-axis fallback ranges for narrow data.
    #[serde(default)]
    pub min_span: MinimumSpan,
    /// Span multiplier around the midpoint, `>= 1`.
    #[serde(default = "default_enlarge")]
    pub enlarge: f64,
}

fn default_enlarge() -> f64 {
    1.0
}

impl Default for BoundsPolicy {
    fn default() -> Self {
        Self::dynamic()
    }
}

impl BoundsPolicy {
    /// Bounds taken from the data extent.
    #[must_use]
    pub fn dynamic() -> Self {
        Self {
            fixed: None,
            pin: PinnedEdges::default(),
            min_span: MinimumSpan::default(),
            enlarge: default_enlarge(),
        }
    }

    /// Always use `bounds`.
    #[must_use]
    pub fn fixed(bounds: Bounds) -> Self {
        Self {
            fixed: Some(bounds),
            ..Self::dynamic()
        }
    }

    /// Set per-axis minimum spans.
    #[must_use]
    pub fn with_min_span(mut self, min_span: MinimumSpan) -> Self {
        self.min_span = min_span;
        self
    }

    /// Set pinned edges.
    #[must_use]
    pub fn with_pins(mut self, pin: PinnedEdges) -> Self {
        self.pin = pin;
        self
    }

    /// Set the enlargement factor.
    #[must_use]
    pub fn with_enlarge(mut self, factor: f64) -> Self {
        self.enlarge = factor;
        self
    }

    /// Policy used when the fallback set stands in for the samples.
    ///
    /// Fallback sets are often a flat line (every sample at one `y`). An axis
    /// where the fallback has no spread and no minimum span is configured gets
    /// the default range `[v - h, v + h]` with `h = max(|v|, 1)`. Fixed bounds
    /// are returned untouched.
    #[must_use]
    pub fn for_fallback(&self, fallback: &[Sample]) -> Self {
        let mut policy = *self;
        if policy.fixed.is_some() {
            return policy;
        }
        let Ok(extent) = Bounds::extent_of(fallback) else {
            return policy;
        };
        for axis in [Axis::X, Axis::Y] {
            let (min, max) = extent.range(axis);
            if policy.min_span.get(axis).is_none() && min == max {
                let half = min.abs().max(1.0);
                debug!(%axis, value = min, "flat fallback axis, using default range");
                policy.min_span.set(axis, (min - half, min + half));
            }
        }
        policy
    }

    /// Reject settings that can never produce valid bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an enlargement below 1 or a
    /// non-increasing minimum-span range.
    pub fn validate(&self) -> Result<()> {
        if !(self.enlarge >= 1.0) || !self.enlarge.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "enlarge factor must be a finite value >= 1, got {}",
                self.enlarge
            )));
        }
        for axis in [Axis::X, Axis::Y] {
            if let Some((min, max)) = self.min_span.get(axis) {
                if !(max > min) {
                    return Err(Error::InvalidConfig(format!(
                        "minimum {axis} span [{min}, {max}] is empty"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Resolve the physical bounds for one render pass.
///
/// Order of application: fixed bounds short-circuit everything; otherwise the
/// data extent, then pinned edges, then minimum-span replacement, then
/// enlargement.
///
/// # Errors
///
/// - [`Error::EmptyData`] when there are no finite samples and no fixed bounds.
/// - [`Error::DegenerateRange`] when the result has a zero-width axis.
/// - [`Error::InvalidConfig`] when the policy itself is invalid.
pub fn resolve_bounds(samples: &[Sample], policy: &BoundsPolicy) -> Result<Bounds> {
    policy.validate()?;

    if let Some(fixed) = policy.fixed {
        fixed.validate()?;
        return Ok(fixed);
    }

    let mut bounds = Bounds::extent_of(samples)?;
    debug!(?bounds, samples = samples.len(), "data extent");

    let pin = policy.pin;
    bounds.min_x = pin.min_x.unwrap_or(bounds.min_x);
    bounds.max_x = pin.max_x.unwrap_or(bounds.max_x);
    bounds.min_y = pin.min_y.unwrap_or(bounds.min_y);
    bounds.max_y = pin.max_y.unwrap_or(bounds.max_y);

    for axis in [Axis::X, Axis::Y] {
        if let Some((min, max)) = policy.min_span.get(axis) {
            if bounds.span(axis) < max - min {
                debug!(%axis, min, max, "data span below minimum, using default range");
                bounds.set_range(axis, (min, max));
            }
        }
    }

    if policy.enlarge > 1.0 {
        bounds = bounds.enlarged(policy.enlarge);
    }

    bounds.validate()?;
    Ok(bounds)
}
