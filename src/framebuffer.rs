//! Core framebuffer for raster layers.
//!
//! Provides a SIMD-aligned RGBA pixel buffer. The heat layer and the raster
//! axis canvas both draw into one, and layers are composited with trueno's
//! vector operations.

use crate::color::Rgba;
use crate::error::{Error, Result};
use trueno::Vector;

/// Alignment for SIMD operations (64 bytes for AVX-512).
const SIMD_ALIGNMENT: usize = 64;

/// SIMD-aligned framebuffer for efficient pixel operations.
///
/// Rows are padded to a 64-byte stride so whole rows can be handed to trueno
/// vectors without realignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
    /// RGBA pixels in row-major order, `stride` bytes per row.
    pixels: Vec<u8>,
    /// Stride in bytes (may include padding for alignment).
    stride: usize,
}

impl Framebuffer {
    /// Create a new transparent framebuffer with the given dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use heatmap_overlay::framebuffer::Framebuffer;
    ///
    /// let fb = Framebuffer::new(800, 600).unwrap();
    /// assert_eq!(fb.width(), 800);
    /// assert_eq!(fb.height(), 600);
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions {
                width,
                height,
                padding: 0,
            });
        }

        let row_bytes = (width as usize) * 4;
        let stride = (row_bytes + SIMD_ALIGNMENT - 1) & !(SIMD_ALIGNMENT - 1);
        let pixels = vec![0; stride * (height as usize)];

        Ok(Self {
            width,
            height,
            pixels,
            stride,
        })
    }

    /// Get the width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Get the height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Clear the framebuffer to a solid color.
    pub fn clear(&mut self, color: Rgba) {
        let rgba = color.to_array();
        let row_bytes = (self.width as usize) * 4;
        for row in self.pixels.chunks_exact_mut(self.stride) {
            for chunk in row[..row_bytes].chunks_exact_mut(4) {
                chunk.copy_from_slice(&rgba);
            }
        }
    }

    /// Fill a rectangular region with a solid color.
    ///
    /// Coordinates are clamped to framebuffer bounds.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        let x1 = x.min(self.width);
        let y1 = y.min(self.height);
        let x2 = x.saturating_add(w).min(self.width);
        let y2 = y.saturating_add(h).min(self.height);

        if x1 >= x2 || y1 >= y2 {
            return;
        }

        let rgba = color.to_array();
        let rect_width = (x2 - x1) as usize;

        for row_y in y1..y2 {
            let row_start = (row_y as usize) * self.stride + (x1 as usize) * 4;
            let row = &mut self.pixels[row_start..row_start + rect_width * 4];
            for chunk in row.chunks_exact_mut(4) {
                chunk.copy_from_slice(&rgba);
            }
        }
    }

    /// Get the color at a specific pixel coordinate.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let idx = self.pixel_index(x, y);
        Some(Rgba::from_array([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]))
    }

    /// Set the color at a specific pixel coordinate.
    ///
    /// Does nothing if the coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = self.pixel_index(x, y);
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_array());
    }

    /// Composite `layer` over this framebuffer using each layer pixel's alpha.
    ///
    /// Color channels follow `out = src * a + dst * (1 - a)`; alpha follows the
    /// "over" operator `a + dst_a * (1 - a)`. Rows are processed as trueno
    /// vectors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if the framebuffers differ in size.
    pub fn composite(&mut self, layer: &Framebuffer) -> Result<()> {
        if self.width != layer.width || self.height != layer.height {
            return Err(Error::SizeMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width: layer.width,
                height: layer.height,
            });
        }

        let row_bytes = (self.width as usize) * 4;

        for y in 0..self.height as usize {
            let row_start = y * self.stride;
            let src = &layer.pixels[row_start..row_start + row_bytes];
            let dst = &self.pixels[row_start..row_start + row_bytes];

            let alpha: Vec<f32> = src
                .chunks_exact(4)
                .flat_map(|px| [f32::from(px[3]) / 255.0; 4])
                .collect();
            let inv_alpha: Vec<f32> = alpha.iter().map(|a| 1.0 - a).collect();

            let src_vec = Vector::from_vec(src.iter().map(|&b| f32::from(b)).collect());
            let dst_vec = Vector::from_vec(dst.iter().map(|&b| f32::from(b)).collect());

            let blended = src_vec
                .mul(&Vector::from_vec(alpha.clone()))
                .and_then(|s| dst_vec.mul(&Vector::from_vec(inv_alpha)).map(|d| (s, d)))
                .and_then(|(s, d)| s.add(&d))
                .map_err(|e| Error::Rendering(format!("layer composite failed: {e:?}")))?;

            let row = &mut self.pixels[row_start..row_start + row_bytes];
            for (i, (out, &v)) in row.iter_mut().zip(blended.as_slice()).enumerate() {
                if i % 4 == 3 {
                    let a = alpha[i];
                    *out = ((a + f32::from(*out) / 255.0 * (1.0 - a)) * 255.0)
                        .round()
                        .clamp(0.0, 255.0) as u8;
                } else {
                    *out = v.round().clamp(0.0, 255.0) as u8;
                }
            }
        }

        Ok(())
    }

    /// Calculate the byte index for a pixel coordinate.
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * self.stride + (x as usize) * 4
    }

    /// Get pixel data as a compact buffer without stride padding.
    ///
    /// PNG encoding expects tightly-packed rows.
    #[must_use]
    pub fn to_compact_pixels(&self) -> Vec<u8> {
        let row_bytes = (self.width as usize) * 4;

        if self.stride == row_bytes {
            return self.pixels.clone();
        }

        let mut compact = Vec::with_capacity(row_bytes * (self.height as usize));
        for row in self.pixels.chunks_exact(self.stride) {
            compact.extend_from_slice(&row[..row_bytes]);
        }
        compact
    }
}
