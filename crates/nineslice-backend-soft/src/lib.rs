//! Software graphics device for the nine-slice filter.
//!
//! [`SoftwareDevice`] implements [`nineslice_core::GraphicsDevice`] on the
//! CPU. Programs are loaded from the same effect file a GPU host would
//! compile; only its uniform table is interpreted, the pass itself runs the
//! Rust slice renderer.

pub mod device;
pub mod effect_file;

pub use device::SoftwareDevice;
pub use effect_file::{EffectFile, Uniform, UniformType, UniformValue};
