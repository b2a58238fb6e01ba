//! Polling loop
//!
//! Runs a harvest pass, then waits for the poll interval or a stop request,
//! whichever comes first. A failed pass is logged and retried on the next tick.

use crate::harvester::Harvester;
use crate::mailbox::Mailbox;
use recon_common::time::secs_to_duration;
use recon_common::{RunContext, RunLog, RunSummary};
use std::time::Duration;
use tracing::{error, info};

/// Default seconds between passes
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;

/// Repeats harvest passes until cancelled
#[derive(Debug, Clone, Copy)]
pub struct PollScheduler {
    interval: Duration,
    once: bool,
}

impl PollScheduler {
    pub fn new(interval_secs: u64) -> Self {
        Self {
            interval: secs_to_duration(interval_secs.max(1)),
            once: false,
        }
    }

    /// Stop after the first pass
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run passes until a stop is requested; returns totals across passes
    pub async fn run<M: Mailbox>(
        &self,
        harvester: &mut Harvester<M>,
        ctx: &RunContext,
        log: &mut RunLog,
    ) -> RunSummary {
        let mut totals = RunSummary::default();
        let mut passes = 0u64;

        loop {
            passes += 1;
            match harvester.pass(ctx, log).await {
                Ok(summary) => {
                    totals.succeeded += summary.succeeded;
                    totals.failed += summary.failed;
                    totals.skipped += summary.skipped;
                }
                Err(e) => error!(pass = passes, "Error during mailbox check: {}", e),
            }

            if self.once || ctx.is_cancelled() {
                break;
            }

            info!(
                "Waiting {} seconds before next check (type 'exit' or Ctrl-C to stop)",
                self.interval.as_secs()
            );
            tokio::select! {
                _ = ctx.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        totals.cancelled = ctx.is_cancelled();
        info!(passes, "Monitoring stopped");
        totals
    }
}

impl Default for PollScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_interval() {
        assert_eq!(PollScheduler::default().interval(), Duration::from_secs(600));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        assert_eq!(PollScheduler::new(0).interval(), Duration::from_secs(1));
    }
}
