//! Error types surfaced at the library boundary.
//!
//! Failures that a browser demo would silently turn into a blank frame
//! (shader compilation, texture loads, a missing window) are reported here
//! instead. Callers inside the render loop log them and keep animating.

use std::path::PathBuf;

/// Errors produced while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Invalid(String),
}

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("shader '{label}' failed to compile: {message}")]
    ShaderCompile { label: String, message: String },

    #[error("pipeline '{label}' failed to link: {message}")]
    PipelineLink { label: String, message: String },

    #[error("failed to load texture {path}: {source}")]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid environment map: {0}")]
    EnvironmentMap(String),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Errors after which rendering cannot continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Surface(wgpu::SurfaceError::OutOfMemory))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
