//! Error types for setup, asset import and configuration
//!
//! Setup errors are fatal and bubble up to `main`. Import errors are logged by
//! the caller and the affected model is skipped.

use std::path::PathBuf;

/// Fatal errors raised while bringing up the GPU.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to create a rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no appropriate GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("GPU device request failed: {0}")]
    NoDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported texture format")]
    NoSurfaceFormat,

    #[error("shader '{shader}' violates the binding contract: {reason}")]
    ShaderContract { shader: String, reason: String },

    #[error("pipeline creation failed: {0}")]
    Pipeline(String),
}

/// Errors raised while importing a model and its placement overrides.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load Wavefront model '{path}': {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("placement line {line}: '{key}' expects {expected} values, found {found}")]
    Arity {
        line: usize,
        key: String,
        expected: usize,
        found: usize,
    },

    #[error("placement line {line}: '{value}' is not a number")]
    NotANumber { line: usize, value: String },

    #[error("placement line {line}: missing key after object name")]
    MissingKey { line: usize },

    #[error("placement line {line}: unknown key '{key}'")]
    UnknownKey { line: usize, key: String },
}

/// Errors raised while reading configuration overrides.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {name}='{value}' is invalid: expected {expected}")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}
