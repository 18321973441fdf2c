//! Error types for heatmap-overlay operations.

use crate::geometry::Axis;
use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, mapping, or rendering an overlay.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// Surface too small to hold the padded plot area.
    #[error("Invalid dimensions: {width}x{height} with padding {padding}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
        /// Padding value.
        padding: u32,
    },

    /// Two rasters that must line up have different sizes.
    #[error("Size mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    SizeMismatch {
        /// Width of the target raster.
        expected_width: u32,
        /// Height of the target raster.
        expected_height: u32,
        /// Width of the incoming raster.
        width: u32,
        /// Height of the incoming raster.
        height: u32,
    },

    /// No samples to derive bounds from.
    #[error("Empty data provided")]
    EmptyData,

    /// Bounds collapse to an empty, inverted or non-finite range on one axis.
    #[error("Degenerate {axis} range: empty or non-finite range [{min}, {max}]")]
    DegenerateRange {
        /// Offending axis.
        axis: Axis,
        /// Lower edge.
        min: f64,
        /// Upper edge.
        max: f64,
    },

    /// Configuration value out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// YAML configuration could not be parsed.
    #[error("Config parse error at line {line}: {message}")]
    ConfigParse {
        /// 1-based line of the failure (0 when unknown).
        line: usize,
        /// Parser message.
        message: String,
    },

    /// Sample source could not be reached.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Sample payload was not a JSON array of samples.
    #[error("Invalid sample payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Rendering error.
    #[error("Rendering error: {0}")]
    Rendering(String),
}
