//! Artifacts and outcomes
//!
//! An artifact is consumed exactly once per run. Its [`Outcome`] is
//! immutable once recorded.

use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};

/// A file awaiting processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArtifact {
    pub path: PathBuf,
    pub file_name: String,
    pub stem: String,
    /// Extension including the leading dot, or empty
    pub extension: String,
}

impl FileArtifact {
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            file_name,
            stem,
            extension,
        }
    }
}

/// Unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// Spreadsheet row identified by its record id
    Row { record_id: String },
    /// Filesystem entry
    File(FileArtifact),
}

impl Artifact {
    /// Key used for matching: record id, or file stem
    pub fn key(&self) -> &str {
        match self {
            Artifact::Row { record_id } => record_id,
            Artifact::File(file) => &file.stem,
        }
    }

    /// Name shown in logs: record id, or full file name
    pub fn reference(&self) -> &str {
        match self {
            Artifact::Row { record_id } => record_id,
            Artifact::File(file) => &file.file_name,
        }
    }

    pub fn as_file(&self) -> Option<&FileArtifact> {
        match self {
            Artifact::File(file) => Some(file),
            Artifact::Row { .. } => None,
        }
    }
}

/// Outcome status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    Success,
    Failed,
    Skipped,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Success => "Success",
            OutcomeStatus::Failed => "Failed",
            OutcomeStatus::Skipped => "Skipped",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded result for one artifact
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub artifact_ref: String,
    pub status: OutcomeStatus,
    /// Response code, or a tag such as `DRY_RUN` / `NO_MATCH`
    pub code: String,
    pub detail: String,
    pub timestamp: DateTime<Local>,
}

impl Outcome {
    pub fn new(
        artifact_ref: impl Into<String>,
        status: OutcomeStatus,
        code: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            artifact_ref: artifact_ref.into(),
            status,
            code: code.into(),
            detail: detail.into(),
            timestamp: crate::time::now(),
        }
    }
}
