//! Frame geometry: border insets, dimensions, scale vectors and the
//! per-frame parameter snapshot consumed by the slice renderer.
//!
//! All values are `f32` and are sanitized on construction: negative,
//! NaN and infinite inputs collapse to `0.0` so that the mapping math
//! downstream never sees a value it cannot order.

/// Replace negative and non-finite values with zero.
#[inline]
fn non_negative(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

// ---------------------------------------------------------------------------
// BorderInsets
// ---------------------------------------------------------------------------

/// Fixed-size margins of the nine-slice grid, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BorderInsets {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl BorderInsets {
    pub fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top: non_negative(top),
            left: non_negative(left),
            bottom: non_negative(bottom),
            right: non_negative(right),
        }
    }

    /// Same inset on all four edges.
    pub fn uniform(v: f32) -> Self {
        Self::new(v, v, v, v)
    }

    /// Packed program layout: `(top, left, bottom, right)`.
    pub fn to_vec4(self) -> [f32; 4] {
        [self.top, self.left, self.bottom, self.right]
    }

    /// Inverse of [`BorderInsets::to_vec4`].
    pub fn from_vec4(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    /// Sum of the left and right insets.
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Sum of the top and bottom insets.
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

// ---------------------------------------------------------------------------
// Dimensions2D
// ---------------------------------------------------------------------------

/// A non-negative width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions2D {
    pub width: f32,
    pub height: f32,
}

impl Dimensions2D {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: non_negative(width),
            height: non_negative(height),
        }
    }

    /// Dimensions of an integer pixel grid.
    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    /// Multiply each axis by the matching scale component.
    pub fn scaled(self, scale: ScaleVector) -> Self {
        Self::new(self.width * scale.x, self.height * scale.y)
    }

    /// Snap to the pixel grid used for rasterization.
    pub fn raster(self) -> (u32, u32) {
        (self.width.round() as u32, self.height.round() as u32)
    }

    pub fn to_vec2(self) -> [f32; 2] {
        [self.width, self.height]
    }

    pub fn from_vec2(v: [f32; 2]) -> Self {
        Self::new(v[0], v[1])
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

// ---------------------------------------------------------------------------
// ScaleVector
// ---------------------------------------------------------------------------

/// Per-axis output scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleVector {
    pub x: f32,
    pub y: f32,
}

impl ScaleVector {
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: non_negative(x),
            y: non_negative(y),
        }
    }

    pub fn uniform(v: f32) -> Self {
        Self::new(v, v)
    }
}

impl Default for ScaleVector {
    fn default() -> Self {
        Self::ONE
    }
}

// ---------------------------------------------------------------------------
// RenderFlags / FrameParameters
// ---------------------------------------------------------------------------

/// Orthogonal rendering toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderFlags {
    /// Paint each of the nine regions with a flat debug color instead of
    /// sampling the source.
    pub show_uv_debug: bool,
    /// Bilinear sampling when set, nearest-neighbor otherwise.
    pub use_linear_filtering: bool,
}

/// Everything the slice renderer needs for one frame.
///
/// Built as a whole once per frame and never mutated afterwards, so the
/// renderer always sees a consistent snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameParameters {
    pub borders: BorderInsets,
    pub source_size: Dimensions2D,
    pub output_size: Dimensions2D,
    pub flags: RenderFlags,
}
