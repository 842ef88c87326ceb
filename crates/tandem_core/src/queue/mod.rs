//! # Ordered Command Execution
//!
//! ```text
//! Producer (draw calls)                  Execution stream (owns the context)
//!
//!   submit(A) ──┐
//!   submit(B) ──┼──▶ [ A | B | C ] ──▶  A.perform(ctx)
//!   submit(C) ──┘      channel          B.perform(ctx)
//!                                       C.perform(ctx)
//! ```
//!
//! In [`ExecutionMode::Inline`] there is no channel: the submitting thread
//! runs the command itself before `submit` returns. Ordering is the same,
//! only the overlap is lost.

mod command_queue;
mod mode;
mod stats;

pub use command_queue::{CommandQueue, Perform};
pub use mode::{ExecutionMode, QueueConfig};
pub use stats::QueueStats;
