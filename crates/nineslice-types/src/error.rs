//! Error types for the nine-slice filter.

use std::io;

/// Errors produced by the nine-slice crates.
///
/// None of these cross the host boundary: lifecycle calls translate them
/// into `Option`/`bool` results and log the details.
#[derive(Debug, thiserror::Error)]
pub enum NineSliceError {
    #[error("program load error: {0}")]
    ProgramLoad(String),

    #[error("device error: {0}")]
    Device(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, NineSliceError>;
