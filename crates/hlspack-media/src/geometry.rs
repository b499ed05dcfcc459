//! Box-fitting geometry for video dimensions.

use std::fmt;

/// A width and height pair, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Create a new dimension pair.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Aspect ratio (width over height).
    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Fit into a bounding box, preserving the aspect ratio.
    ///
    /// Returns the largest area contained in `bounds` that keeps this
    /// pair's aspect ratio, with both sides rounded down to even values
    /// (4:2:0 chroma subsampling needs even dimensions).
    pub fn fit_within(&self, bounds: Dimensions) -> Dimensions {
        let ratio = self.ratio();
        let mut width = bounds.width as f64;
        let mut height = bounds.height as f64;
        if width / ratio > height {
            width = height * ratio;
        } else {
            height = width / ratio;
        }
        Dimensions {
            width: (width as u32) / 2 * 2,
            height: (height as u32) / 2 * 2,
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
