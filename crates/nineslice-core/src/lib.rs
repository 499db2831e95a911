//! Nine-slice filter core.
//!
//! Host-agnostic implementation of a nine-slice scaling video filter: the
//! slice mapping algorithm, source sampling, the per-frame parameter
//! builder, filter instance lifecycle, and the trait boundaries through
//! which a compositing host and its GPU are reached. This crate has no
//! platform dependencies; hosts and devices plug in through [`host`] and
//! [`gpu`].

// Re-exports from nineslice-types (foundation types).
pub use nineslice_types::color;
pub use nineslice_types::error;
pub use nineslice_types::geometry;
pub use nineslice_types::image;
pub use nineslice_types::properties;
pub use nineslice_types::settings;

pub mod config;
pub mod filter;
pub mod gpu;
pub mod host;
pub mod kind;
pub mod locale;
pub mod module;
pub mod params;
pub mod sampler;
pub mod slice;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{FilterConfig, ScaleMode};
pub use filter::NineSliceFilter;
pub use gpu::{GraphicsContext, GraphicsDevice, GraphicsGuard, ParamId, ProgramId};
pub use host::{FilterSource, SceneScaleQuery};
pub use kind::{FilterInstance, FilterKind, FilterRegistry, NineSliceKind};
pub use locale::Locale;
pub use params::ParameterBuilder;

/// Short plugin name used as the log prefix.
pub const PLUGIN_NAME: &str = "nineslice";

/// Crate version reported on module load.
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");
