//! Reconciler
//!
//! Routes a processed file artifact to its success or failure folder as
//! `{stem}_{status_word}{ext}`. When that name is taken the file becomes
//! `{stem}_{n}_{status_word}{ext}` with the smallest free `n` starting at 1.
//!
//! The free-name scan is only race-free for one writer: callers must not run
//! two reconcilers against the same folder pair at once.

use crate::artifact::{FileArtifact, OutcomeStatus};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reconcile errors. Never undo an already recorded outcome.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to create folder {path}: {source}")]
    CreateFolder { path: PathBuf, source: io::Error },

    #[error("failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("failed to write run log: {0}")]
    LogWrite(String),
}

/// Words appended to processed file names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusWords {
    pub success: String,
    pub failure: String,
}

impl StatusWords {
    pub fn new(success: impl Into<String>, failure: impl Into<String>) -> Self {
        Self {
            success: success.into(),
            failure: failure.into(),
        }
    }

    /// Skipped artifacts share the failure word
    pub fn word_for(&self, status: OutcomeStatus) -> &str {
        match status {
            OutcomeStatus::Success => &self.success,
            OutcomeStatus::Failed | OutcomeStatus::Skipped => &self.failure,
        }
    }
}

impl Default for StatusWords {
    fn default() -> Self {
        Self::new("uploaded", "failed")
    }
}

/// Success and failure folders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destinations {
    pub success: PathBuf,
    pub failure: PathBuf,
}

impl Destinations {
    pub fn new(success: impl Into<PathBuf>, failure: impl Into<PathBuf>) -> Self {
        Self {
            success: success.into(),
            failure: failure.into(),
        }
    }

    pub fn folder_for(&self, status: OutcomeStatus) -> &Path {
        match status {
            OutcomeStatus::Success => &self.success,
            OutcomeStatus::Failed | OutcomeStatus::Skipped => &self.failure,
        }
    }

    /// Create both folders if missing
    pub fn ensure_exist(&self) -> Result<(), ReconcileError> {
        for folder in [&self.success, &self.failure] {
            ensure_folder(folder)?;
        }
        Ok(())
    }
}

pub fn ensure_folder(folder: &Path) -> Result<(), ReconcileError> {
    std::fs::create_dir_all(folder).map_err(|source| ReconcileError::CreateFolder {
        path: folder.to_path_buf(),
        source,
    })
}

/// First free path in `folder` for `stem` + optional `word` + `ext`
///
/// `ext` includes its leading dot (or is empty). Without a word the
/// candidates are `{stem}{ext}`, `{stem}_1{ext}`, ...
pub fn free_destination(folder: &Path, stem: &str, word: Option<&str>, ext: &str) -> PathBuf {
    let name = |n: usize| match (word, n) {
        (Some(w), 0) => format!("{}_{}{}", stem, w, ext),
        (Some(w), n) => format!("{}_{}_{}{}", stem, n, w, ext),
        (None, 0) => format!("{}{}", stem, ext),
        (None, n) => format!("{}_{}{}", stem, n, ext),
    };

    let mut n = 0;
    loop {
        let candidate = folder.join(name(n));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Move a file or directory; falls back to copy + remove across devices
///
/// On fallback failure the partial copy is removed so the source stays the
/// only copy.
pub fn move_path(from: &Path, to: &Path) -> io::Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if !from.is_file() {
                return Err(rename_err);
            }
            tracing::debug!(from = %from.display(), "rename failed ({}), copying instead", rename_err);
            if let Err(e) = std::fs::copy(from, to) {
                let _ = std::fs::remove_file(to);
                return Err(e);
            }
            if let Err(e) = std::fs::remove_file(from) {
                let _ = std::fs::remove_file(to);
                return Err(e);
            }
            Ok(())
        }
    }
}

/// Reconciler for one run
#[derive(Debug, Clone)]
pub struct Reconciler {
    destinations: Destinations,
    words: StatusWords,
}

impl Reconciler {
    pub fn new(destinations: Destinations, words: StatusWords) -> Self {
        Self { destinations, words }
    }

    pub fn destinations(&self) -> &Destinations {
        &self.destinations
    }

    /// Destination the artifact would be moved to right now
    pub fn plan(&self, artifact: &FileArtifact, status: OutcomeStatus) -> PathBuf {
        free_destination(
            self.destinations.folder_for(status),
            &artifact.stem,
            Some(self.words.word_for(status)),
            &artifact.extension,
        )
    }

    /// Move the artifact to its destination
    ///
    /// Returns `Ok(None)` when the source is already gone: an earlier step
    /// consumed it, which is logged and skipped.
    pub fn reconcile(
        &self,
        artifact: &FileArtifact,
        status: OutcomeStatus,
    ) -> Result<Option<PathBuf>, ReconcileError> {
        if !artifact.path.exists() {
            tracing::warn!(
                file = %artifact.path.display(),
                "Source file not found, skipping move"
            );
            return Ok(None);
        }

        let folder = self.destinations.folder_for(status);
        ensure_folder(folder)?;

        let dest = self.plan(artifact, status);
        move_path(&artifact.path, &dest).map_err(|source| ReconcileError::Move {
            from: artifact.path.clone(),
            to: dest.clone(),
            source,
        })?;

        tracing::info!(
            file = %artifact.file_name,
            dest = %dest.display(),
            "Moved '{}' to '{}'",
            artifact.file_name,
            dest.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
        );

        Ok(Some(dest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Reconciler) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("staging")).unwrap();
        let reconciler = Reconciler::new(
            Destinations::new(dir.path().join("uploaded"), dir.path().join("failed")),
            StatusWords::default(),
        );
        (dir, reconciler)
    }

    fn stage(dir: &TempDir, name: &str, content: &[u8]) -> FileArtifact {
        let path = dir.path().join("staging").join(name);
        fs::write(&path, content).unwrap();
        FileArtifact::from_path(&path)
    }

    #[test]
    fn test_success_rename_and_move() {
        let (dir, reconciler) = setup();
        let artifact = stage(&dir, "invoice.pdf", b"%PDF-1.4");

        let dest = reconciler
            .reconcile(&artifact, OutcomeStatus::Success)
            .unwrap()
            .unwrap();

        assert_eq!(dest, dir.path().join("uploaded").join("invoice_uploaded.pdf"));
        assert!(!artifact.path.exists());
    }

    #[test]
    fn test_collision_appends_counter_before_status_word() {
        let (dir, reconciler) = setup();
        fs::create_dir_all(dir.path().join("uploaded")).unwrap();
        fs::write(dir.path().join("uploaded/invoice_uploaded.pdf"), b"first").unwrap();

        let artifact = stage(&dir, "invoice.pdf", b"second");
        let dest = reconciler
            .reconcile(&artifact, OutcomeStatus::Success)
            .unwrap()
            .unwrap();

        assert_eq!(dest, dir.path().join("uploaded").join("invoice_1_uploaded.pdf"));
        assert_eq!(fs::read(dir.path().join("uploaded/invoice_uploaded.pdf")).unwrap(), b"first");
    }

    #[test]
    fn test_counter_increments_until_free() {
        let (dir, reconciler) = setup();
        let uploaded = dir.path().join("uploaded");
        fs::create_dir_all(&uploaded).unwrap();
        fs::write(uploaded.join("a_uploaded.txt"), b"").unwrap();
        fs::write(uploaded.join("a_1_uploaded.txt"), b"").unwrap();
        fs::write(uploaded.join("a_2_uploaded.txt"), b"").unwrap();

        let artifact = stage(&dir, "a.txt", b"x");
        assert_eq!(
            reconciler.plan(&artifact, OutcomeStatus::Success),
            uploaded.join("a_3_uploaded.txt")
        );
    }

    #[test]
    fn test_move_preserves_content_bytes() {
        let (dir, reconciler) = setup();
        let content: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let artifact = stage(&dir, "scan.pdf", &content);

        let dest = reconciler
            .reconcile(&artifact, OutcomeStatus::Failed)
            .unwrap()
            .unwrap();

        assert_eq!(dest, dir.path().join("failed").join("scan_failed.pdf"));
        assert_eq!(fs::read(dest).unwrap(), content);
    }

    #[test]
    fn test_skipped_goes_to_failure_folder() {
        let (dir, reconciler) = setup();
        let artifact = stage(&dir, "x.pdf", b"x");
        assert_eq!(
            reconciler.plan(&artifact, OutcomeStatus::Skipped),
            dir.path().join("failed").join("x_failed.pdf")
        );
    }

    #[test]
    fn test_missing_source_is_skipped_not_raised() {
        let (dir, reconciler) = setup();
        let artifact = FileArtifact::from_path(&dir.path().join("staging/gone.pdf"));

        let result = reconciler.reconcile(&artifact, OutcomeStatus::Success).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_free_destination_without_word() {
        let dir = TempDir::new().unwrap();
        assert_eq!(free_destination(dir.path(), "msg", None, ""), dir.path().join("msg"));
        fs::create_dir(dir.path().join("msg")).unwrap();
        assert_eq!(free_destination(dir.path(), "msg", None, ""), dir.path().join("msg_1"));
    }
}
