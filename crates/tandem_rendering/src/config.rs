//! # Configuration
//!
//! Loaded once at startup from TOML:
//!
//! ```toml
//! surface_width = 1024
//! surface_height = 768
//! back_buffer_count = 1
//!
//! [updater]
//! enable_periodic_update = true
//! update_interval_seconds = 0.1
//!
//! [queue]
//! mode = "threaded"
//! thread_name = "tandem-render"
//! ```
//!
//! Every key is optional and falls back to [`Default`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tandem_core::QueueConfig;

use crate::error::{ConfigError, ConfigResult};
use crate::state::{RenderState, Screen};
use crate::target::ClipRect;

/// Flush policy settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Turns on volume/time based flushing.
    pub enable_periodic_update: bool,
    /// Minimum seconds between threshold flushes.
    pub update_interval_seconds: f64,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            enable_periodic_update: false,
            update_interval_seconds: 0.0,
        }
    }
}

impl UpdaterConfig {
    /// Returns the interval as a [`Duration`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInterval`] for negative, non-finite or
    /// out-of-range values.
    pub fn update_interval(&self) -> ConfigResult<Duration> {
        let seconds = self.update_interval_seconds;
        Duration::try_from_secs_f64(seconds).map_err(|_| ConfigError::InvalidInterval(seconds))
    }
}

/// Everything a [`RenderStateUpdater`](crate::RenderStateUpdater) is built from.
#[derive(Debug, Clone, Default)]
pub struct UpdaterParams {
    /// Turns on volume/time based flushing.
    pub enable_periodic_update: bool,
    /// Minimum time between threshold flushes.
    pub update_interval: Duration,
    /// Render state to publish into. Without one, no flush ever happens.
    pub render_state: Option<Arc<RenderState>>,
}

impl UpdaterParams {
    /// Combines validated settings with an optional render state.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInterval`] for a bad interval.
    pub fn new(config: &UpdaterConfig, render_state: Option<Arc<RenderState>>) -> ConfigResult<Self> {
        Ok(Self {
            enable_periodic_update: config.enable_periodic_update,
            update_interval: config.update_interval()?,
            render_state,
        })
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Surface width in pixels.
    pub surface_width: u32,
    /// Surface height in pixels.
    pub surface_height: u32,
    /// Spare targets besides the actual one.
    pub back_buffer_count: usize,
    /// Flush policy.
    pub updater: UpdaterConfig,
    /// Command queue.
    pub queue: QueueConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            surface_width: 1024,
            surface_height: 768,
            back_buffer_count: 1,
            updater: UpdaterConfig::default(),
            queue: QueueConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns a parse error or the first failed validation.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`EngineConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks values serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.surface_width == 0 || self.surface_height == 0 {
            return Err(ConfigError::ZeroSurface {
                width: self.surface_width,
                height: self.surface_height,
            });
        }
        if self.back_buffer_count == 0 {
            return Err(ConfigError::NoBackBuffers);
        }
        self.updater.update_interval()?;
        Ok(())
    }

    /// Allocates the targets and builds a shared render state.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the configuration is invalid.
    pub fn build_render_state(&self) -> ConfigResult<Arc<RenderState>> {
        self.validate()?;
        let screen = Screen::new(ClipRect::surface(self.surface_width, self.surface_height));
        let state = RenderState::with_surface(
            self.surface_width,
            self.surface_height,
            self.back_buffer_count,
            screen,
        )?;
        Ok(Arc::new(state))
    }

    /// Builds updater parameters attached to `render_state`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInterval`] for a bad interval.
    pub fn updater_params(&self, render_state: Option<Arc<RenderState>>) -> ConfigResult<UpdaterParams> {
        UpdaterParams::new(&self.updater, render_state)
    }
}
