//! Action Executor
//!
//! One external operation per artifact (record update, upload, attachment
//! save). Never retried internally: a failure is terminal for the artifact
//! within the run.

use crate::artifact::{Artifact, Outcome, OutcomeStatus};
use crate::mapping::MappingEntry;
use async_trait::async_trait;
use thiserror::Error;

/// Code recorded for dry-run results
pub const DRY_RUN_CODE: &str = "DRY_RUN";

/// Code recorded when the operation raised instead of answering
pub const FAULT_CODE: &str = "ERROR";

/// External operation failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    /// Collaborator answered with a non-success response
    #[error("rejected ({code}): {detail}")]
    Rejected { code: String, detail: String },

    /// Collaborator could not be reached or raised
    #[error("{0}")]
    Fault(String),
}

/// Successful response from the collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub code: String,
    pub detail: String,
}

impl ActionResponse {
    pub fn new(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: detail.into(),
        }
    }
}

/// Side-effecting operation applied to one artifact
///
/// `T` is what the artifact was matched to; mapping-driven tools use
/// [`MappingEntry`].
#[async_trait]
pub trait ActionExecutor<T: ?Sized + Sync = MappingEntry>: Send + Sync {
    /// Short operation name used in log details ("update", "upload")
    fn name(&self) -> &'static str;

    /// Perform the operation exactly once
    async fn perform(&self, artifact: &Artifact, target: &T) -> Result<ActionResponse, ActionError>;
}

/// Classified result of one execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: OutcomeStatus,
    pub code: String,
    pub detail: String,
}

impl ExecutionResult {
    pub fn into_outcome(self, artifact_ref: impl Into<String>) -> Outcome {
        Outcome::new(artifact_ref, self.status, self.code, self.detail)
    }
}

/// Execute `executor` for one artifact
///
/// With `dry_run` no side effect happens and a `Success` result tagged
/// [`DRY_RUN_CODE`] is returned.
pub async fn execute<T: ?Sized + Sync>(
    executor: &dyn ActionExecutor<T>,
    artifact: &Artifact,
    target: &T,
    dry_run: bool,
) -> ExecutionResult {
    if dry_run {
        tracing::info!(artifact = %artifact.reference(), "Dry run - {} not sent", executor.name());
        return ExecutionResult {
            status: OutcomeStatus::Success,
            code: DRY_RUN_CODE.to_string(),
            detail: format!(
                "Dry run - no {} performed for '{}'",
                executor.name(),
                artifact.reference()
            ),
        };
    }

    match executor.perform(artifact, target).await {
        Ok(response) => ExecutionResult {
            status: OutcomeStatus::Success,
            code: response.code,
            detail: response.detail,
        },
        Err(ActionError::Rejected { code, detail }) => {
            tracing::warn!(artifact = %artifact.reference(), code = %code, "{} rejected: {}", executor.name(), detail);
            ExecutionResult {
                status: OutcomeStatus::Failed,
                code,
                detail,
            }
        }
        Err(ActionError::Fault(detail)) => {
            tracing::error!(artifact = %artifact.reference(), "{} failed: {}", executor.name(), detail);
            ExecutionResult {
                status: OutcomeStatus::Failed,
                code: FAULT_CODE.to_string(),
                detail,
            }
        }
    }
}
