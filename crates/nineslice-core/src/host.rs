//! Host query surface.
//!
//! The compositing host owns sources and the scene tree; the filter only
//! ever asks these two traits questions. Hosts implement them over their
//! own object model, tests mock them.

use nineslice_types::geometry::{Dimensions2D, ScaleVector};
use nineslice_types::image::RgbaImage;

/// The source a filter is attached to (its parent in the filter chain).
pub trait FilterSource: Send + Sync {
    /// Unique source name, used for log context and scene lookups.
    fn name(&self) -> &str;

    /// Current width in pixels.
    fn width(&self) -> u32;

    /// Current height in pixels.
    fn height(&self) -> u32;

    /// Current frame as a CPU image, for devices that rasterize on the
    /// CPU. GPU-backed hosts may return `None`.
    fn frame(&self) -> Option<RgbaImage>;

    fn size(&self) -> Dimensions2D {
        Dimensions2D::from_pixels(self.width(), self.height())
    }
}

/// Lookup of the scene placement that embeds a source.
///
/// Replaces walking the host's scene tree: the host answers with the scale
/// of the first placement whose (possibly nested) content is the named
/// source, or `None` if the source is not placed in any scene.
pub trait SceneScaleQuery: Send + Sync {
    fn find_scale_for(&self, source_name: &str) -> Option<ScaleVector>;
}
