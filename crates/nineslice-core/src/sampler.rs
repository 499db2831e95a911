//! Source image sampling with clamp-to-edge addressing.
//!
//! Coordinates are continuous pixel-space positions: `(0.0, 0.0)` is the
//! top-left corner of the first pixel and `(w, h)` the bottom-right
//! corner of the last one, matching texture-space UVs scaled by the image
//! size.

use nineslice_types::color::Color;
use nineslice_types::geometry::RenderFlags;
use nineslice_types::image::RgbaImage;

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filtering {
    Nearest,
    Linear,
}

impl Filtering {
    pub fn from_flags(flags: &RenderFlags) -> Self {
        if flags.use_linear_filtering {
            Self::Linear
        } else {
            Self::Nearest
        }
    }
}

/// Sample `image` at continuous position `(x, y)`.
///
/// Empty images sample as transparent black.
pub fn sample(image: &RgbaImage, x: f32, y: f32, filtering: Filtering) -> Color {
    if image.is_empty() {
        return Color::TRANSPARENT;
    }
    match filtering {
        Filtering::Nearest => sample_nearest(image, x, y),
        Filtering::Linear => sample_linear(image, x, y),
    }
}

/// Clamp a (possibly negative or NaN) pixel index into `0..len`.
#[inline]
fn clamp_index(v: f32, len: u32) -> u32 {
    (v.max(0.0) as u32).min(len - 1)
}

fn sample_nearest(image: &RgbaImage, x: f32, y: f32) -> Color {
    let ix = clamp_index(x.floor(), image.width());
    let iy = clamp_index(y.floor(), image.height());
    image.pixel(ix, iy)
}

fn sample_linear(image: &RgbaImage, x: f32, y: f32) -> Color {
    // Shift so texel centers land on integer coordinates.
    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = (fx - x0).clamp(0.0, 1.0);
    let ty = (fy - y0).clamp(0.0, 1.0);

    let (w, h) = image.dimensions();
    let ix0 = clamp_index(x0, w);
    let ix1 = clamp_index(x0 + 1.0, w);
    let iy0 = clamp_index(y0, h);
    let iy1 = clamp_index(y0 + 1.0, h);

    let c00 = image.pixel(ix0, iy0).to_array();
    let c10 = image.pixel(ix1, iy0).to_array();
    let c01 = image.pixel(ix0, iy1).to_array();
    let c11 = image.pixel(ix1, iy1).to_array();

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = lerp(c00[i] as f32, c10[i] as f32, tx);
        let bottom = lerp(c01[i] as f32, c11[i] as f32, tx);
        out[i] = lerp(top, bottom, ty).round().clamp(0.0, 255.0) as u8;
    }
    Color::from(out)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
