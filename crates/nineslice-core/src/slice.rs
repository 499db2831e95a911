//! Nine-slice mapping.
//!
//! Each output axis is split into three bands: a near band
//! `[0, near)`, a stretchable middle band `[near, out - far)` and a far
//! band `[out - far, out)`. Border widths are measured in output pixels
//! and are never rescaled, so the corners keep a 1:1 pixel mapping no
//! matter how far the middle is stretched.
//!
//! The same math is implemented by `data/sliced.effect` for GPU hosts;
//! [`render`] is the CPU rasterization used by the software device.

use nineslice_types::color::Color;
use nineslice_types::geometry::FrameParameters;
use nineslice_types::image::RgbaImage;

use crate::sampler::{self, Filtering};

/// Band of one axis a coordinate falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Near,
    Middle,
    Far,
}

impl Band {
    /// 0, 1, 2 from the near edge to the far edge.
    pub fn index(self) -> usize {
        match self {
            Self::Near => 0,
            Self::Middle => 1,
            Self::Far => 2,
        }
    }
}

/// Flat colors for the UV debug overlay, indexed by [`Region::index`].
pub const DEBUG_PALETTE: [Color; 9] = [
    Color::rgb(230, 25, 75),   // top-left
    Color::rgb(60, 180, 75),   // top
    Color::rgb(255, 225, 25),  // top-right
    Color::rgb(0, 130, 200),   // left
    Color::rgb(245, 130, 48),  // center
    Color::rgb(145, 30, 180),  // right
    Color::rgb(70, 240, 240),  // bottom-left
    Color::rgb(240, 50, 230),  // bottom
    Color::rgb(128, 128, 128), // bottom-right
];

/// One of the nine slice regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub row: Band,
    pub col: Band,
}

impl Region {
    /// Row-major index, 0 (top-left) through 8 (bottom-right).
    pub fn index(self) -> usize {
        self.row.index() * 3 + self.col.index()
    }

    pub fn debug_color(self) -> Color {
        DEBUG_PALETTE[self.index()]
    }
}

// ---------------------------------------------------------------------------
// Per-axis mapping
// ---------------------------------------------------------------------------

/// Slice layout along a single axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSlice {
    near: f32,
    far: f32,
    source: f32,
    output: f32,
}

impl AxisSlice {
    pub fn new(near: f32, far: f32, source: f32, output: f32) -> Self {
        Self {
            near: near.max(0.0),
            far: far.max(0.0),
            source: source.max(0.0),
            output: output.max(0.0),
        }
    }

    /// Left/right insets against the widths.
    pub fn horizontal(params: &FrameParameters) -> Self {
        Self::new(
            params.borders.left,
            params.borders.right,
            params.source_size.width,
            params.output_size.width,
        )
    }

    /// Top/bottom insets against the heights.
    pub fn vertical(params: &FrameParameters) -> Self {
        Self::new(
            params.borders.top,
            params.borders.bottom,
            params.source_size.height,
            params.output_size.height,
        )
    }

    /// Classify an output coordinate. The near band wins when the near
    /// and far bands overlap.
    pub fn band(&self, p: f32) -> Band {
        if p < self.near {
            Band::Near
        } else if p >= self.output - self.far {
            Band::Far
        } else {
            Band::Middle
        }
    }

    /// Stretchable span in output space, clamped at zero.
    pub fn middle_output_extent(&self) -> f32 {
        (self.output - self.near - self.far).max(0.0)
    }

    /// Stretchable span in source space, clamped at zero.
    pub fn middle_source_extent(&self) -> f32 {
        (self.source - self.near - self.far).max(0.0)
    }

    /// Map an output coordinate to a source coordinate in `[0, source]`.
    pub fn source_coord(&self, p: f32) -> f32 {
        let src = match self.band(p) {
            Band::Near => p.min(self.near),
            Band::Far => self.source - (self.output - p),
            Band::Middle => {
                let span = self.output - self.near - self.far;
                let t = if span > 0.0 {
                    (p - self.near) / span
                } else {
                    0.5
                };
                self.near + t * self.middle_source_extent()
            }
        };
        if src.is_nan() {
            return 0.0;
        }
        src.clamp(0.0, self.source)
    }
}

// ---------------------------------------------------------------------------
// Two-axis mapping
// ---------------------------------------------------------------------------

/// Both axes of one frame's slice layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceMapping {
    pub x: AxisSlice,
    pub y: AxisSlice,
}

impl SliceMapping {
    pub fn new(params: &FrameParameters) -> Self {
        Self {
            x: AxisSlice::horizontal(params),
            y: AxisSlice::vertical(params),
        }
    }

    /// Region containing output position `(px, py)`.
    pub fn region_at(&self, px: f32, py: f32) -> Region {
        Region {
            row: self.y.band(py),
            col: self.x.band(px),
        }
    }

    /// Source position sampled for output position `(px, py)`.
    pub fn source_position(&self, px: f32, py: f32) -> (f32, f32) {
        (self.x.source_coord(px), self.y.source_coord(py))
    }
}

/// Rasterize one frame into a `width x height` target.
///
/// Pixel centers are mapped into `output_size` space, through the slice
/// mapping into `source_size` space, and finally scaled onto the pixel
/// grid of `source` for sampling. When `show_uv_debug` is set every pixel
/// is painted with its region's [`DEBUG_PALETTE`] entry instead.
pub fn render(params: &FrameParameters, source: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let mut out = RgbaImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    let mapping = SliceMapping::new(params);
    let filtering = Filtering::from_flags(&params.flags);

    let out_step_x = params.output_size.width / width as f32;
    let out_step_y = params.output_size.height / height as f32;
    let img_scale_x = image_scale(source.width(), params.source_size.width);
    let img_scale_y = image_scale(source.height(), params.source_size.height);

    let columns: Vec<(Band, f32)> = (0..width)
        .map(|x| {
            let px = (x as f32 + 0.5) * out_step_x;
            (mapping.x.band(px), mapping.x.source_coord(px) * img_scale_x)
        })
        .collect();

    for y in 0..height {
        let py = (y as f32 + 0.5) * out_step_y;
        let row = mapping.y.band(py);
        let sy = mapping.y.source_coord(py) * img_scale_y;
        for (x, &(col, sx)) in columns.iter().enumerate() {
            let color = if params.flags.show_uv_debug {
                Region { row, col }.debug_color()
            } else {
                sampler::sample(source, sx, sy, filtering)
            };
            out.put_pixel(x as u32, y, color);
        }
    }
    out
}

/// Factor converting `source_size` units into image pixels.
fn image_scale(image_len: u32, source_len: f32) -> f32 {
    if source_len > 0.0 {
        image_len as f32 / source_len
    } else {
        1.0
    }
}
