//! # TANDEM Rendering
//!
//! Render-state synchronization between a drawing producer and a graphics
//! backend, built around double-buffered render targets.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐   submit    ┌──────────────┐   perform   ┌─────────────────┐
//! │  RenderStateUpdater  │ ──────────▶ │ RenderQueue  │ ──────────▶ │ GraphicsBackend │
//! │  (flush policy)      │             │ (FIFO)       │             │ (GPU)           │
//! └──────────┬───────────┘             └──────────────┘             └─────────────────┘
//!            │ lock only for the pointer swap                │
//!            ▼                                               ▼
//!     ┌──────────────────────────────────────────────────────────┐
//!     │ RenderState: actual target, back buffers, screens        │
//!     └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Flush protocol
//!
//! `Finish` → (lock, swap) → `PublishActualTarget` → (retarget, unlock)
//! → `PrepareBackBuffer`. The producer never waits for the backend.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod backend;
pub mod command;
pub mod config;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod state;
pub mod target;
pub mod updater;

pub use backend::{BackendEvent, EventLog, GraphicsBackend, RecordingBackend, ResourceManager, TexturedQuad};
pub use command::{render_queue, Command, PrepareBackBuffer, PublishActualTarget, RenderQueue};
pub use config::{EngineConfig, UpdaterConfig, UpdaterParams};
pub use error::{ConfigError, ConfigResult, RenderStateError, RenderStateResult};
pub use geometry::{BufferId, Geometry, TextureId};
pub use layer::{DrawLayer, QueuedDrawLayer};
pub use state::{RenderSnapshot, RenderState, Screen, TargetSlots};
pub use target::{ClipRect, Color, RenderTarget, SharedTarget, TargetId, BACKGROUND_COLOR};
pub use updater::{
    Clock, FlushCounters, FlushTrigger, ManualClock, RenderStateUpdater, SystemClock, UpdaterStats,
    FLUSH_INDEX_THRESHOLD,
};

#[cfg(feature = "wgpu")]
pub use backend::wgpu::{GeometryEncoder, WgpuBackend};
