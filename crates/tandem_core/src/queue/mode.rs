//! Queue execution mode and configuration.

use serde::{Deserialize, Serialize};

/// Where queued commands run.
///
/// This is fixed when the queue is built. Commands never have to ask
/// whether they might be racing the producer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Commands run on the submitting thread before `submit` returns.
    Inline,
    /// Commands run on a dedicated worker thread.
    #[default]
    Threaded,
}

impl ExecutionMode {
    /// Returns true if command execution can overlap with the producer.
    #[inline]
    #[must_use]
    pub const fn is_concurrent(self) -> bool {
        matches!(self, Self::Threaded)
    }
}

/// Configuration for a [`CommandQueue`](super::CommandQueue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Execution mode.
    pub mode: ExecutionMode,
    /// Name given to the worker thread (threaded mode only).
    pub thread_name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Threaded,
            thread_name: "tandem-render".to_string(),
        }
    }
}

impl QueueConfig {
    /// Configuration for a single-threaded queue.
    #[must_use]
    pub fn inline() -> Self {
        Self {
            mode: ExecutionMode::Inline,
            ..Self::default()
        }
    }

    /// Configuration for a queue drained by a worker thread.
    #[must_use]
    pub fn threaded(thread_name: impl Into<String>) -> Self {
        Self {
            mode: ExecutionMode::Threaded,
            thread_name: thread_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_threaded() {
        let config = QueueConfig::default();
        assert_eq!(config.mode, ExecutionMode::Threaded);
        assert!(config.mode.is_concurrent());
        assert_eq!(config.thread_name, "tandem-render");
    }

    #[test]
    fn test_inline_is_not_concurrent() {
        assert!(!QueueConfig::inline().mode.is_concurrent());
    }
}
