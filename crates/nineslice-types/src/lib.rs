//! Foundation types for the nine-slice filter.
//!
//! This crate contains the host-agnostic types shared by every nine-slice
//! crate: frame geometry, colors, RGBA images, the persisted settings
//! object, the properties (UI schema) description, and error types.

pub mod color;
pub mod error;
pub mod geometry;
pub mod image;
pub mod properties;
pub mod settings;

pub use color::Color;
pub use error::{NineSliceError, Result};
pub use geometry::{BorderInsets, Dimensions2D, FrameParameters, RenderFlags, ScaleVector};
pub use image::RgbaImage;
pub use properties::{Properties, Property, PropertyKind};
pub use settings::{SettingValue, Settings};
