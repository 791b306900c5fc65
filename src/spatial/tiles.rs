//! Pixel buffers for templates and the square patterns cut out of them
//!
//! Both are stored as `(row, col, byte)` arrays so a pixel's channels, and each
//! channel's bytes, sit contiguously. Equality is exact byte equality plus matching
//! channel count and sample depth.

use crate::io::error::{ModelError, Result};
use ndarray::{Array3, ArrayView3, s};

/// Channel count and bytes per channel shared by every pixel of an image
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    /// Number of channels per pixel (1 = gray, 2 = gray+alpha, 3 = RGB, 4 = RGBA)
    pub channels: u8,
    /// Bytes per channel sample (1 for 8-bit, 2 for 16-bit)
    pub depth: u8,
}

impl PixelFormat {
    /// Create a format description
    pub const fn new(channels: u8, depth: u8) -> Self {
        Self { channels, depth }
    }

    /// Bytes occupied by one pixel
    pub const fn bytes_per_pixel(self) -> usize {
        self.channels as usize * self.depth as usize
    }
}

/// A decoded template image in a uniform pixel layout
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    pixels: Array3<u8>,
    format: PixelFormat,
}

impl Template {
    /// Build a template from row-major pixel bytes
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidTemplate`] if the format has no channels or no depth,
    /// or if `data` does not hold exactly `width * height` pixels.
    pub fn new(width: usize, height: usize, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let bytes_per_pixel = format.bytes_per_pixel();
        if bytes_per_pixel == 0 {
            return Err(ModelError::InvalidTemplate {
                index: 0,
                reason: format!(
                    "pixel format needs at least one channel and one byte per channel, got {} x {}",
                    format.channels, format.depth
                ),
            });
        }

        let expected = width * height * bytes_per_pixel;
        if data.len() != expected {
            return Err(ModelError::InvalidTemplate {
                index: 0,
                reason: format!(
                    "expected {expected} bytes for {width}x{height} pixels, got {}",
                    data.len()
                ),
            });
        }

        let pixels = Array3::from_shape_vec((height, width, bytes_per_pixel), data).map_err(|e| {
            ModelError::InvalidTemplate {
                index: 0,
                reason: e.to_string(),
            }
        })?;

        Ok(Self { pixels, format })
    }

    /// Build an 8-bit template from rows of equally sized pixels
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidTemplate`] if the rows are ragged or the pixels
    /// have no channels.
    pub fn from_rows<const C: usize>(rows: &[Vec<[u8; C]>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return Err(ModelError::InvalidTemplate {
                index: 0,
                reason: "rows have different lengths".to_string(),
            });
        }
        let channels = u8::try_from(C).map_err(|e| ModelError::InvalidTemplate {
            index: 0,
            reason: format!("{C} channels per pixel is not supported: {e}"),
        })?;
        let data = rows.iter().flatten().flatten().copied().collect();
        Self::new(width, height, PixelFormat::new(channels, 1), data)
    }

    /// Number of pixel columns
    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    /// Number of pixel rows
    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    /// Channel count and sample depth
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// Pixel bytes indexed by `(row, col, byte)`
    pub fn pixels(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    /// Mutable pixel bytes indexed by `(row, col, byte)`
    pub fn pixels_mut(&mut self) -> &mut Array3<u8> {
        &mut self.pixels
    }

    /// Bytes of the pixel at column `col`, row `row`
    pub fn pixel(&self, col: usize, row: usize) -> Option<Vec<u8>> {
        if row >= self.height() || col >= self.width() {
            return None;
        }
        Some(self.pixels.slice(s![row, col, ..]).to_vec())
    }

    /// Row-major pixel bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.pixels.iter().copied().collect()
    }

    /// Copy the `size` x `size` window whose top-left pixel is (`col`, `row`)
    ///
    /// Returns `None` if the window does not fit inside the template.
    pub fn window(&self, col: usize, row: usize, size: usize) -> Option<Pattern> {
        if size == 0 || col + size > self.width() || row + size > self.height() {
            return None;
        }
        let pixels = self
            .pixels
            .slice(s![row..row + size, col..col + size, ..])
            .to_owned();
        Some(Pattern {
            pixels,
            format: self.format,
        })
    }
}

/// An immutable square block of pixels extracted from a template
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    pixels: Array3<u8>,
    format: PixelFormat,
}

impl Pattern {
    /// Side length in pixels
    pub fn size(&self) -> usize {
        self.pixels.dim().0
    }

    /// Channel count and sample depth
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// Pixel bytes indexed by `(row, col, byte)`
    pub fn pixels(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    /// Rotate a quarter turn counter-clockwise
    ///
    /// The top-right pixel becomes the top-left one.
    #[must_use]
    pub fn rotate_ccw(&self) -> Self {
        let (n, _, bytes) = self.pixels.dim();
        let pixels = Array3::from_shape_fn((n, n, bytes), |(i, j, k)| {
            self.pixels.get((j, n - 1 - i, k)).copied().unwrap_or(0)
        });
        Self {
            pixels,
            format: self.format,
        }
    }

    /// Rotate a half turn
    #[must_use]
    pub fn rotate_180(&self) -> Self {
        let (n, _, bytes) = self.pixels.dim();
        let pixels = Array3::from_shape_fn((n, n, bytes), |(i, j, k)| {
            self.pixels.get((n - 1 - i, n - 1 - j, k)).copied().unwrap_or(0)
        });
        Self {
            pixels,
            format: self.format,
        }
    }

    /// Rotate a quarter turn clockwise
    ///
    /// The bottom-left pixel becomes the top-left one.
    #[must_use]
    pub fn rotate_cw(&self) -> Self {
        let (n, _, bytes) = self.pixels.dim();
        let pixels = Array3::from_shape_fn((n, n, bytes), |(i, j, k)| {
            self.pixels.get((n - 1 - j, i, k)).copied().unwrap_or(0)
        });
        Self {
            pixels,
            format: self.format,
        }
    }
}
