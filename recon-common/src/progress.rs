//! Console progress lines rendered from run events

use crate::events::RunEvent;
use crate::time::log_timestamp;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Line for one event, `None` for events with nothing to show
pub fn render(event: &RunEvent) -> Option<String> {
    match event {
        RunEvent::RunStarted { tool, total } => Some(format!("Starting {} run: {} item(s)", tool, total)),
        RunEvent::ArtifactStarted { index, total, reference } => {
            Some(format!("Processing {}/{}: '{}'", index, total, reference))
        }
        RunEvent::OutcomeRecorded(outcome) => Some(format!(
            "[{}] {} {} ({}): {}",
            log_timestamp(&outcome.timestamp),
            outcome.status,
            outcome.artifact_ref,
            outcome.code,
            outcome.detail
        )),
        RunEvent::RunCancelled { remaining } => Some(format!("Run cancelled, {} item(s) not started", remaining)),
        RunEvent::RunFinished {
            succeeded,
            failed,
            skipped,
        } => Some(format!(
            "Summary: {} succeeded, {} failed, {} skipped ({} total)",
            succeeded,
            failed,
            skipped,
            succeeded + failed + skipped
        )),
    }
}

/// Print events to stdout until every sender is dropped
pub fn spawn_console(mut rx: broadcast::Receiver<RunEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(line) = render(&event) {
                        println!("{}", line);
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::debug!(missed, "Progress output lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Wait for the console task after the bus is dropped
///
/// A panicked printer must not fail the run it was only reporting on.
pub async fn finish_console(handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        tracing::warn!("Progress output task failed: {}", e);
    }
}
