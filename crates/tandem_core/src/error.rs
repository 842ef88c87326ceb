//! # Queue Error Types

use thiserror::Error;

/// Errors that can occur while setting up a command queue.
///
/// Once a queue is running it has no recoverable failure modes: a command
/// whose preconditions do not hold panics on the execution stream.
#[derive(Error, Debug)]
pub enum QueueError {
    /// The operating system refused to start the worker thread.
    #[error("failed to spawn command queue worker '{name}': {source}")]
    Spawn {
        /// Requested thread name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for queue setup.
pub type QueueResult<T> = Result<T, QueueError>;
