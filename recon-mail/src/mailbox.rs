//! Mailbox seam
//!
//! [`DirectoryMailbox`] reads a folder where every sub-directory is one
//! message (directory name = subject) and every regular file inside it is an
//! attachment.

use async_trait::async_trait;
use recon_common::reconciler::{free_destination, move_path};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Mailbox errors
#[derive(Debug, Error)]
pub enum MailboxError {
    /// Source folder is gone
    #[error("Mailbox folder not found: {0}")]
    SourceMissing(PathBuf),

    #[error("Mailbox I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MailboxError {
    fn io(path: &Path, source: io::Error) -> Self {
        MailboxError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// File attachment on a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    /// Where the mailbox keeps the attachment bytes
    pub location: PathBuf,
}

/// One message awaiting processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailItem {
    pub subject: String,
    pub location: PathBuf,
    pub attachments: Vec<Attachment>,
}

/// Message source
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Messages currently in the source folder, oldest name first
    async fn pending(&self) -> Result<Vec<MailItem>, MailboxError>;

    /// Write the attachment bytes to `dest`
    async fn save_attachment(&self, attachment: &Attachment, dest: &Path) -> Result<(), MailboxError>;

    /// Move the message out of the source folder; returns its new location
    async fn mark_processed(&self, item: &MailItem) -> Result<PathBuf, MailboxError>;
}

/// Folder-backed mailbox
#[derive(Debug, Clone)]
pub struct DirectoryMailbox {
    source: PathBuf,
    processed: PathBuf,
}

impl DirectoryMailbox {
    /// The source folder must exist; the processed folder is created on demand
    pub fn open(source: impl Into<PathBuf>, processed: impl Into<PathBuf>) -> Result<Self, MailboxError> {
        let source = source.into();
        if !source.is_dir() {
            return Err(MailboxError::SourceMissing(source));
        }
        Ok(Self {
            source,
            processed: processed.into(),
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn processed(&self) -> &Path {
        &self.processed
    }

    fn read_message(dir: &Path) -> Result<MailItem, MailboxError> {
        let mut attachments = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| MailboxError::io(dir, io::Error::other(e.to_string())))?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().is_file() && !file_name.starts_with('.') {
                attachments.push(Attachment {
                    file_name,
                    location: entry.into_path(),
                });
            }
        }

        Ok(MailItem {
            subject: dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            location: dir.to_path_buf(),
            attachments,
        })
    }
}

#[async_trait]
impl Mailbox for DirectoryMailbox {
    async fn pending(&self) -> Result<Vec<MailItem>, MailboxError> {
        if !self.source.is_dir() {
            return Err(MailboxError::SourceMissing(self.source.clone()));
        }

        let mut items = Vec::new();
        for entry in WalkDir::new(&self.source).min_depth(1).max_depth(1).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_dir() && !entry.file_name().to_string_lossy().starts_with('.') => {
                    items.push(Self::read_message(entry.path())?);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Error reading mailbox entry: {}", e),
            }
        }
        Ok(items)
    }

    async fn save_attachment(&self, attachment: &Attachment, dest: &Path) -> Result<(), MailboxError> {
        tokio::fs::copy(&attachment.location, dest)
            .await
            .map(|_| ())
            .map_err(|e| MailboxError::io(dest, e))
    }

    async fn mark_processed(&self, item: &MailItem) -> Result<PathBuf, MailboxError> {
        tokio::fs::create_dir_all(&self.processed)
            .await
            .map_err(|e| MailboxError::io(&self.processed, e))?;

        let dest = free_destination(&self.processed, &item.subject, None, "");
        move_path(&item.location, &dest).map_err(|e| MailboxError::io(&item.location, e))?;
        Ok(dest)
    }
}
