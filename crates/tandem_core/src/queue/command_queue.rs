//! # Command Queue
//!
//! Single-stream executor for deferred work.
//!
//! ## Thread Safety
//!
//! - `submit`: callable from any thread holding a reference to the queue
//! - `perform`: always runs on the execution stream, one command at a time
//! - The context lives on the execution stream and is never shared

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::Mutex;

use super::{ExecutionMode, QueueConfig, QueueStats};
use crate::error::{QueueError, QueueResult};

/// Deferred work executed by a [`CommandQueue`].
///
/// A command is built by the producer, handed over by value and consumed
/// by `perform` on the execution stream. It reports nothing back; its
/// effects are observed through whatever shared state it mutates.
pub trait Perform: Send + 'static {
    /// State the command runs against, owned by the execution stream.
    type Context: Send + 'static;

    /// Executes the command.
    ///
    /// Broken preconditions are contract violations and must panic.
    fn perform(self, context: &mut Self::Context);
}

enum Message<C> {
    Run(C),
    /// Answered once every message queued before it has been handled.
    Barrier(Sender<()>),
}

enum Executor<C: Perform> {
    Inline(Mutex<C::Context>),
    Threaded {
        sender: Sender<Message<C>>,
        worker: Option<JoinHandle<()>>,
    },
}

/// Ordered executor for commands of type `C`.
///
/// ## Usage
///
/// ```rust,ignore
/// let queue = CommandQueue::new(&QueueConfig::threaded("gpu"), backend)?;
///
/// queue.submit(command_a); // returns immediately
/// queue.submit(command_b); // runs after command_a, never alongside it
///
/// queue.wait_idle();       // both have executed
/// ```
pub struct CommandQueue<C: Perform> {
    executor: Executor<C>,
    mode: ExecutionMode,
    stats: Arc<QueueStats>,
}

impl<C: Perform> CommandQueue<C> {
    /// Creates a queue and moves `context` onto its execution stream.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Spawn`] if the worker thread cannot be started.
    pub fn new(config: &QueueConfig, context: C::Context) -> QueueResult<Self> {
        let stats = Arc::new(QueueStats::default());

        let executor = match config.mode {
            ExecutionMode::Inline => Executor::Inline(Mutex::new(context)),
            ExecutionMode::Threaded => {
                // Must stay unbounded: submit may be called under a lock the
                // worker also takes.
                let (sender, receiver) = unbounded();

                let worker_stats = Arc::clone(&stats);
                let worker = thread::Builder::new()
                    .name(config.thread_name.clone())
                    .spawn(move || run_worker(&receiver, context, &worker_stats))
                    .map_err(|source| QueueError::Spawn {
                        name: config.thread_name.clone(),
                        source,
                    })?;

                tracing::info!("Command queue worker '{}' started", config.thread_name);

                Executor::Threaded {
                    sender,
                    worker: Some(worker),
                }
            }
        };

        Ok(Self {
            executor,
            mode: config.mode,
            stats,
        })
    }

    /// Returns the execution mode this queue was built with.
    #[inline]
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Returns the shared statistics.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }

    /// Enqueues a command.
    ///
    /// Never waits for execution. In inline mode the command has already
    /// run when this returns; in threaded mode it runs later on the worker.
    ///
    /// # Panics
    ///
    /// Panics if the worker thread has died (a previous command panicked).
    pub fn submit(&self, command: C) {
        self.stats.record_submit();

        match &self.executor {
            Executor::Inline(context) => {
                command.perform(&mut context.lock());
                self.stats.record_execute();
            }
            Executor::Threaded { sender, .. } => {
                tracing::trace!("Queued command #{}", self.stats.submitted());
                assert!(
                    sender.send(Message::Run(command)).is_ok(),
                    "command queue worker has terminated"
                );
            }
        }
    }

    /// Blocks the caller until every command submitted so far has executed.
    ///
    /// This is a producer-side barrier; it is not used by the flush path,
    /// which never waits on the execution stream.
    ///
    /// # Panics
    ///
    /// Panics if the worker thread has died.
    pub fn wait_idle(&self) {
        let Executor::Threaded { sender, .. } = &self.executor else {
            return;
        };

        let (done_tx, done_rx) = bounded(1);
        assert!(
            sender.send(Message::Barrier(done_tx)).is_ok(),
            "command queue worker has terminated"
        );
        assert!(
            done_rx.recv().is_ok(),
            "command queue worker has terminated"
        );
    }
}

impl<C: Perform> Drop for CommandQueue<C> {
    fn drop(&mut self) {
        if let Executor::Threaded { sender, worker } = &mut self.executor {
            // Swap in a sender for a dead channel; dropping the real one
            // lets the worker drain what is left and exit its loop.
            let (closed, _) = unbounded();
            drop(std::mem::replace(sender, closed));

            if let Some(worker) = worker.take() {
                let name = worker.thread().name().unwrap_or("unnamed").to_string();
                if worker.join().is_err() {
                    tracing::error!("Command queue worker '{}' panicked", name);
                } else {
                    tracing::info!("Command queue worker '{}' stopped", name);
                }
            }
        }
    }
}

fn run_worker<C: Perform>(
    receiver: &Receiver<Message<C>>,
    mut context: C::Context,
    stats: &QueueStats,
) {
    for message in receiver {
        match message {
            Message::Run(command) => {
                command.perform(&mut context);
                stats.record_execute();
            }
            Message::Barrier(done) => {
                // The waiter may have given up; nothing to do then.
                let _ = done.send(());
            }
        }
    }
}
