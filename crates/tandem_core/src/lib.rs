//! # TANDEM Core
//!
//! Ordered, single-stream command execution shared by the producer side
//! (which records work) and the consumer side (which owns the context the
//! work runs against, typically a graphics device).
//!
//! ## Guarantees
//!
//! 1. **FIFO** - commands run in exactly the order they were submitted
//! 2. **Single stream** - two commands never run at the same time
//! 3. **Non-blocking submit** - the producer only pays for queue insertion
//!
//! ## Example
//!
//! ```rust,ignore
//! use tandem_core::{CommandQueue, Perform, QueueConfig};
//!
//! struct Log(&'static str);
//!
//! impl Perform for Log {
//!     type Context = Vec<&'static str>;
//!     fn perform(self, context: &mut Self::Context) {
//!         context.push(self.0);
//!     }
//! }
//!
//! let queue = CommandQueue::new(&QueueConfig::default(), Vec::new())?;
//! queue.submit(Log("first"));
//! queue.submit(Log("second"));
//! queue.wait_idle();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use queue::{CommandQueue, ExecutionMode, Perform, QueueConfig, QueueStats};
