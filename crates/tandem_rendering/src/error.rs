//! # Rendering Error Types
//!
//! Only setup can fail recoverably. Once a render state exists, a broken
//! invariant (empty pool at swap time, zero-sized target handed to the
//! backend) is a contract violation and panics.

use std::path::PathBuf;

use thiserror::Error;

use crate::target::TargetId;

/// Errors raised while building or resetting a render state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderStateError {
    /// No back buffers were supplied; a swap would have nothing to swap with.
    #[error("back buffer pool must contain at least one render target")]
    EmptyBackBufferPool,

    /// A target has zero width or height.
    #[error("render target {id} has zero size ({width}x{height})")]
    ZeroSizedTarget {
        /// Offending target.
        id: TargetId,
        /// Its width.
        width: u32,
        /// Its height.
        height: u32,
    },

    /// Targets in one render state must all match the surface size.
    #[error("render target {id} is {found:?}, expected {expected:?}")]
    SizeMismatch {
        /// Offending target.
        id: TargetId,
        /// Size of the actual target.
        expected: (u32, u32),
        /// Size of the offending target.
        found: (u32, u32),
    },

    /// The same target was supplied twice.
    #[error("render target {0} appears more than once")]
    DuplicateTarget(TargetId),
}

/// Result type for render-state setup.
pub type RenderStateResult<T> = Result<T, RenderStateError>;

/// Errors raised while loading an [`EngineConfig`](crate::EngineConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or does not match the schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The flush interval is negative, NaN, infinite or too large.
    #[error("update interval must be a non-negative number of seconds within Duration range, got {0}")]
    InvalidInterval(f64),

    /// The surface has zero width or height.
    #[error("surface size must be non-zero, got {width}x{height}")]
    ZeroSurface {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },

    /// `back_buffer_count` is zero.
    #[error("at least one back buffer is required")]
    NoBackBuffers,

    /// Building the render state failed.
    #[error(transparent)]
    RenderState(#[from] RenderStateError),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
