//! Run pipeline
//!
//! Mapping table -> Matcher -> Action Executor -> Reconciler -> Run Log, one
//! artifact at a time. Cancellation is observed only between artifacts so an
//! artifact is never left half-processed (executed but not moved).

use crate::artifact::{Artifact, Outcome, OutcomeStatus};
use crate::context::RunContext;
use crate::error::Error;
use crate::events::RunEvent;
use crate::executor::{execute, ActionExecutor};
use crate::mapping::{normalize_key, MappingTable};
use crate::matcher::{match_key, MatchResult};
use crate::reconciler::Reconciler;
use crate::run_log::RunLog;
use std::collections::HashSet;

/// Code for artifacts with no mapping entry
pub const NO_MATCH_CODE: &str = "NO_MATCH";

/// Code for artifacts already attempted earlier in the run
pub const DUPLICATE_CODE: &str = "DUPLICATE";

/// Counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }

    pub fn add(&mut self, status: OutcomeStatus) {
        match status {
            OutcomeStatus::Success => self.succeeded += 1,
            OutcomeStatus::Failed => self.failed += 1,
            OutcomeStatus::Skipped => self.skipped += 1,
        }
    }
}

/// Identity used for the at-most-once check
fn identity(artifact: &Artifact) -> String {
    match artifact {
        Artifact::Row { record_id } => normalize_key(record_id),
        Artifact::File(file) => file.path.to_string_lossy().into_owned(),
    }
}

/// Mapping-driven run over a list of artifacts
pub struct Pipeline<'a> {
    ctx: &'a RunContext,
    tool: &'a str,
    executor: &'a dyn ActionExecutor,
    reconciler: Option<&'a Reconciler>,
}

impl<'a> Pipeline<'a> {
    pub fn new(ctx: &'a RunContext, tool: &'a str, executor: &'a dyn ActionExecutor) -> Self {
        Self {
            ctx,
            tool,
            executor,
            reconciler: None,
        }
    }

    /// Route file artifacts to success/failure folders after execution
    pub fn with_reconciler(mut self, reconciler: &'a Reconciler) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    /// Process `artifacts` in order, appending one outcome per started artifact
    pub async fn run(&self, artifacts: &[Artifact], table: &MappingTable, log: &mut RunLog) -> RunSummary {
        let total = artifacts.len();
        let mut summary = RunSummary::default();
        let mut attempted = HashSet::new();

        tracing::info!(tool = %self.tool, total, dry_run = self.ctx.dry_run, "Run started");
        if self
            .ctx
            .events
            .emit(RunEvent::RunStarted {
                tool: self.tool.to_string(),
                total,
            })
            .is_err()
        {
            tracing::debug!("No progress subscribers for this run");
        }

        for (i, artifact) in artifacts.iter().enumerate() {
            if self.ctx.is_cancelled() {
                tracing::warn!(remaining = total - i, "Run cancelled");
                self.ctx.events.emit_lossy(RunEvent::RunCancelled { remaining: total - i });
                summary.cancelled = true;
                break;
            }

            self.ctx.events.emit_lossy(RunEvent::ArtifactStarted {
                index: i + 1,
                total,
                reference: artifact.reference().to_string(),
            });
            tracing::info!("Processing {}/{}: '{}'", i + 1, total, artifact.reference());

            let outcome = self.process(artifact, table, &mut attempted).await;
            self.reconcile(artifact, outcome.status);

            summary.add(outcome.status);
            self.ctx.events.emit_lossy(RunEvent::OutcomeRecorded(outcome.clone()));
            log.record(outcome);
        }

        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "Run finished"
        );
        self.ctx.events.emit_lossy(RunEvent::RunFinished {
            succeeded: summary.succeeded,
            failed: summary.failed,
            skipped: summary.skipped,
        });

        summary
    }

    async fn process(&self, artifact: &Artifact, table: &MappingTable, attempted: &mut HashSet<String>) -> Outcome {
        let reference = artifact.reference().to_string();

        if !attempted.insert(identity(artifact)) {
            tracing::warn!(artifact = %reference, "Already processed in this run, skipping");
            return Outcome::new(
                reference,
                OutcomeStatus::Skipped,
                DUPLICATE_CODE,
                "duplicate of an earlier item in this run; first occurrence wins",
            );
        }

        let entry = match match_key(artifact.key(), table) {
            MatchResult::NoMatch => {
                let err = Error::Match(format!("no mapping found for '{}'", artifact.key()));
                tracing::warn!(artifact = %reference, "{}", err);
                return Outcome::new(reference, OutcomeStatus::Failed, NO_MATCH_CODE, err.to_string());
            }
            MatchResult::Unique(entry) => entry,
            MatchResult::Ambiguous { chosen, candidates } => {
                tracing::warn!(
                    artifact = %reference,
                    candidates,
                    row = chosen.row,
                    "Several mapping rows share this key, using the first one"
                );
                chosen
            }
        };

        tracing::info!(
            "Mapping found: '{}' -> '{}'",
            artifact.key(),
            entry.target_value().unwrap_or_default()
        );

        execute(self.executor, artifact, entry, self.ctx.dry_run)
            .await
            .into_outcome(reference)
    }

    fn reconcile(&self, artifact: &Artifact, status: OutcomeStatus) {
        let (Some(reconciler), Some(file)) = (self.reconciler, artifact.as_file()) else {
            return;
        };

        if self.ctx.dry_run {
            tracing::info!(
                file = %file.file_name,
                dest = %reconciler.plan(file, status).display(),
                "Dry run - file left in place"
            );
            return;
        }

        if let Err(e) = reconciler.reconcile(file, status) {
            let err = Error::from(e);
            tracing::warn!(file = %file.file_name, "{}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ActionError, ActionResponse};
    use crate::mapping::MappingEntry;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ActionExecutor for Recorder {
        fn name(&self) -> &'static str {
            "update"
        }

        async fn perform(&self, artifact: &Artifact, target: &MappingEntry) -> Result<ActionResponse, ActionError> {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}={}", artifact.reference(), target.target_value().unwrap_or_default()));
            Ok(ActionResponse::new("200", "ok"))
        }
    }

    fn table() -> MappingTable {
        let entry = |key: &str, value: &str, row| MappingEntry {
            source_key: key.into(),
            fields: vec![("Color".into(), value.into())],
            row,
        };
        MappingTable::from_entries(vec![entry("EQ1", "Red", 1), entry("EQ2", "Blue", 2), entry("eq1", "Green", 3)])
    }

    fn rows(ids: &[&str]) -> Vec<Artifact> {
        ids.iter()
            .map(|id| Artifact::Row {
                record_id: id.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_duplicate_rows_first_wins_and_later_skipped() {
        let ctx = RunContext::new(false);
        let exec = Recorder { seen: Mutex::new(Vec::new()) };
        let mut log = RunLog::new(std::env::temp_dir(), "unused");

        let summary = Pipeline::new(&ctx, "update", &exec)
            .run(&rows(&["EQ1", "EQ2", "eq1"]), &table(), &mut log)
            .await;

        assert_eq!(*exec.seen.lock().unwrap(), vec!["EQ1=Red", "EQ2=Blue"]);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(log.entries()[2].code, DUPLICATE_CODE);
    }

    #[tokio::test]
    async fn test_cancel_before_start_processes_nothing() {
        let ctx = RunContext::new(false);
        ctx.cancel.cancel();
        let exec = Recorder { seen: Mutex::new(Vec::new()) };
        let mut log = RunLog::new(std::env::temp_dir(), "unused");

        let summary = Pipeline::new(&ctx, "update", &exec)
            .run(&rows(&["EQ1", "EQ2"]), &table(), &mut log)
            .await;

        assert!(summary.cancelled);
        assert_eq!(summary.total(), 0);
        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_no_match_is_failed_outcome() {
        let ctx = RunContext::new(false);
        let exec = Recorder { seen: Mutex::new(Vec::new()) };
        let mut log = RunLog::new(std::env::temp_dir(), "unused");

        let summary = Pipeline::new(&ctx, "update", &exec)
            .run(&rows(&["EQ9"]), &table(), &mut log)
            .await;

        assert_eq!(summary.failed, 1);
        assert_eq!(log.entries()[0].code, NO_MATCH_CODE);
        assert!(log.entries()[0].detail.contains("no mapping found for 'EQ9'"));
        assert!(exec.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_events_follow_outcomes() {
        let ctx = RunContext::new(true);
        let mut rx = ctx.events.subscribe();
        let exec = Recorder { seen: Mutex::new(Vec::new()) };
        let mut log = RunLog::new(std::env::temp_dir(), "unused");

        Pipeline::new(&ctx, "update", &exec)
            .run(&rows(&["EQ2"]), &table(), &mut log)
            .await;

        assert!(matches!(rx.recv().await.unwrap(), RunEvent::RunStarted { total: 1, .. }));
        assert!(matches!(rx.recv().await.unwrap(), RunEvent::ArtifactStarted { index: 1, .. }));
        match rx.recv().await.unwrap() {
            RunEvent::OutcomeRecorded(o) => assert_eq!(o.code, crate::executor::DRY_RUN_CODE),
            other => panic!("Expected outcome event, got {:?}", other),
        }
        assert!(matches!(rx.recv().await.unwrap(), RunEvent::RunFinished { succeeded: 1, .. }));
    }
}
