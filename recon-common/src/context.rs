//! Run context
//!
//! Explicit replacement for process-wide state: every component receives the
//! cancellation token and the event sink through this object.

use crate::events::EventBus;
use tokio_util::sync::CancellationToken;

/// Per-run context
#[derive(Clone)]
pub struct RunContext {
    /// Checked only between artifacts
    pub cancel: CancellationToken,
    /// Progress sink
    pub events: EventBus,
    /// Skip side effects, keep logging
    pub dry_run: bool,
}

impl RunContext {
    pub fn new(dry_run: bool) -> Self {
        Self {
            cancel: CancellationToken::new(),
            events: EventBus::default(),
            dry_run,
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Cancel `token` on Ctrl-C
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current item");
            token.cancel();
        }
    });
}
