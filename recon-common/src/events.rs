//! Run events
//!
//! The broadcast side of the run context: pipeline components emit
//! [`RunEvent`]s, front ends subscribe to render progress.

use crate::artifact::Outcome;
use tokio::sync::broadcast;

/// Events emitted during a run
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Run started with `total` artifacts discovered
    RunStarted { tool: String, total: usize },

    /// Artifact `index` (1-based) of `total` is being processed
    ArtifactStarted {
        index: usize,
        total: usize,
        reference: String,
    },

    /// Outcome appended to the run log
    OutcomeRecorded(Outcome),

    /// Cancellation observed; `remaining` artifacts were not started
    RunCancelled { remaining: usize },

    /// Run finished
    RunFinished {
        succeeded: usize,
        failed: usize,
        skipped: usize,
    },
}

/// Event distribution bus
///
/// Wraps a `tokio::sync::broadcast` channel. Events emitted before a
/// receiver subscribes are not delivered to it.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<RunEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per receiver
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.tx.subscribe()
    }

    /// Emit an event; returns the number of receivers, errors when nobody is listening
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: RunEvent) -> Result<usize, broadcast::error::SendError<RunEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: RunEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
