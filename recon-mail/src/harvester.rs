//! Attachment harvest pass
//!
//! Every saved PDF gets a unique `<stem>_<YYYYMMDD_HHMMSS>_<8 hex>.pdf` name.
//! It lands in the save folder, unless a file with the attachment's original
//! name is already there; then it goes to `Duplicates/`. A message leaves the
//! source folder only when at least one of its attachments reached the save
//! folder.

use crate::mailbox::{Attachment, MailItem, Mailbox, MailboxError};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use recon_common::events::RunEvent;
use recon_common::executor::{execute, ActionError, ActionExecutor, ActionResponse, DRY_RUN_CODE};
use recon_common::pipeline::DUPLICATE_CODE;
use recon_common::time::{file_stamp, now};
use recon_common::{Artifact, FileArtifact, Outcome, OutcomeStatus, RunContext, RunLog, RunSummary};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Code for attachments saved to the main folder
pub const SAVED_CODE: &str = "SAVED";

/// Duplicate copies sub-folder
pub const DUPLICATES_DIR: &str = "Duplicates";
/// Run log sub-folder
pub const LOGS_DIR: &str = "Logs";

/// Save folder layout
#[derive(Debug, Clone)]
pub struct SaveFolders {
    pub save: PathBuf,
    pub duplicates: PathBuf,
    pub logs: PathBuf,
}

impl SaveFolders {
    pub fn under(save: impl Into<PathBuf>) -> Self {
        let save = save.into();
        Self {
            duplicates: save.join(DUPLICATES_DIR),
            logs: save.join(LOGS_DIR),
            save,
        }
    }

    pub fn ensure_exist(&self) -> io::Result<()> {
        for folder in [&self.save, &self.duplicates, &self.logs] {
            std::fs::create_dir_all(folder)?;
        }
        Ok(())
    }
}

/// PDF attachments only, case-insensitive
pub fn is_pdf(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(".pdf")
}

/// `<stem>_<YYYYMMDD_HHMMSS>_<8 hex><ext>`
pub fn unique_name(file_name: &str, at: &DateTime<Local>) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let unique = Uuid::new_v4().simple().to_string();

    format!("{}_{}_{}{}", stem, file_stamp(at), &unique[..8], ext)
}

/// Where one attachment will be written
#[derive(Debug, Clone)]
pub struct SavePlan {
    pub attachment: Attachment,
    pub dest: PathBuf,
    /// Original name was already taken in the save folder
    pub duplicate: bool,
}

impl SavePlan {
    pub fn for_attachment(attachment: &Attachment, folders: &SaveFolders) -> Self {
        let duplicate = folders.save.join(&attachment.file_name).exists();
        let folder = if duplicate { &folders.duplicates } else { &folders.save };
        SavePlan {
            attachment: attachment.clone(),
            dest: folder.join(unique_name(&attachment.file_name, &now())),
            duplicate,
        }
    }
}

/// Saves one planned attachment through the mailbox
struct AttachmentSaver<'a, M: ?Sized> {
    mailbox: &'a M,
}

#[async_trait]
impl<'a, M: Mailbox + ?Sized> ActionExecutor<SavePlan> for AttachmentSaver<'a, M> {
    fn name(&self) -> &'static str {
        "save"
    }

    async fn perform(&self, _artifact: &Artifact, plan: &SavePlan) -> Result<ActionResponse, ActionError> {
        self.mailbox
            .save_attachment(&plan.attachment, &plan.dest)
            .await
            .map_err(|e| ActionError::Fault(e.to_string()))?;

        let code = if plan.duplicate { DUPLICATE_CODE } else { SAVED_CODE };
        Ok(ActionResponse::new(code, format!("saved to {}", plan.dest.display())))
    }
}

/// Runs harvest passes, remembering what it already attempted
pub struct Harvester<M> {
    mailbox: M,
    folders: SaveFolders,
    attempted: HashSet<PathBuf>,
}

impl<M: Mailbox> Harvester<M> {
    pub fn new(mailbox: M, folders: SaveFolders) -> Self {
        Self {
            mailbox,
            folders,
            attempted: HashSet::new(),
        }
    }

    pub fn folders(&self) -> &SaveFolders {
        &self.folders
    }

    /// One scan of the mailbox
    ///
    /// Cancellation is checked between messages. Attachments attempted in an
    /// earlier pass of this run are not attempted or logged again.
    pub async fn pass(&mut self, ctx: &RunContext, log: &mut RunLog) -> Result<RunSummary, MailboxError> {
        let items = self.mailbox.pending().await?;
        let total = items.len();
        let mut summary = RunSummary::default();

        ctx.events.emit_lossy(RunEvent::RunStarted {
            tool: "mail".to_string(),
            total,
        });

        let mut moved = 0;
        for (i, item) in items.iter().enumerate() {
            if ctx.is_cancelled() {
                tracing::warn!(remaining = total - i, "Stop requested, ending pass");
                ctx.events.emit_lossy(RunEvent::RunCancelled { remaining: total - i });
                summary.cancelled = true;
                break;
            }

            let pdfs: Vec<&Attachment> = item
                .attachments
                .iter()
                .filter(|a| is_pdf(&a.file_name))
                .filter(|a| !self.attempted.contains(&a.location))
                .collect();
            if pdfs.is_empty() {
                tracing::debug!(subject = %item.subject, "No new PDF attachments, leaving message");
                continue;
            }

            ctx.events.emit_lossy(RunEvent::ArtifactStarted {
                index: i + 1,
                total,
                reference: item.subject.clone(),
            });

            if self.harvest_message(ctx, item, &pdfs, log, &mut summary).await {
                moved += self.move_processed(item).await;
            }
        }

        tracing::info!(
            messages = total,
            moved,
            saved = summary.succeeded,
            duplicates = summary.skipped,
            failed = summary.failed,
            "Checked mailbox"
        );
        ctx.events.emit_lossy(RunEvent::RunFinished {
            succeeded: summary.succeeded,
            failed: summary.failed,
            skipped: summary.skipped,
        });

        Ok(summary)
    }

    /// Returns whether any attachment reached the main save folder
    async fn harvest_message(
        &mut self,
        ctx: &RunContext,
        item: &MailItem,
        pdfs: &[&Attachment],
        log: &mut RunLog,
        summary: &mut RunSummary,
    ) -> bool {
        let saver: &dyn ActionExecutor<SavePlan> = &AttachmentSaver { mailbox: &self.mailbox };
        let mut saved_to_main = false;

        for attachment in pdfs {
            self.attempted.insert(attachment.location.clone());

            let plan = SavePlan::for_attachment(attachment, &self.folders);
            let artifact = Artifact::File(FileArtifact::from_path(&attachment.location));
            let result = execute(saver, &artifact, &plan, ctx.dry_run).await;

            let mut status = result.status;
            if status == OutcomeStatus::Success && result.code != DRY_RUN_CODE {
                if plan.duplicate {
                    status = OutcomeStatus::Skipped;
                    tracing::info!(file = %attachment.file_name, dest = %plan.dest.display(), "Duplicate saved to duplicates folder");
                } else {
                    saved_to_main = true;
                    tracing::info!(file = %attachment.file_name, dest = %plan.dest.display(), "Attachment saved");
                }
            }

            let outcome = Outcome::new(
                attachment.file_name.clone(),
                status,
                result.code,
                format!("[{}] {}", item.subject, result.detail),
            );
            summary.add(outcome.status);
            ctx.events.emit_lossy(RunEvent::OutcomeRecorded(outcome.clone()));
            log.record(outcome);
        }

        saved_to_main
    }

    async fn move_processed(&self, item: &MailItem) -> usize {
        match self.mailbox.mark_processed(item).await {
            Ok(dest) => {
                tracing::info!(subject = %item.subject, dest = %dest.display(), "Message moved to processed folder");
                1
            }
            Err(e) => {
                tracing::error!(subject = %item.subject, "Error moving message to processed folder: {}", e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf("scan.pdf"));
        assert!(is_pdf("SCAN.PDF"));
        assert!(!is_pdf("scan.pdf.txt"));
        assert!(!is_pdf("pdf"));
    }

    #[test]
    fn test_unique_name_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let name = unique_name("report.pdf", &at);

        assert!(name.starts_with("report_20240305_140709_"));
        assert!(name.ends_with(".pdf"));
        let unique = &name["report_20240305_140709_".len()..name.len() - 4];
        assert_eq!(unique.len(), 8);
        assert!(unique.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_plan_checks_original_name_but_saves_unique_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let folders = SaveFolders::under(dir.path());
        folders.ensure_exist().unwrap();
        let attachment = Attachment {
            file_name: "inv.pdf".to_string(),
            location: dir.path().join("inv.pdf"),
        };

        let fresh = SavePlan::for_attachment(&attachment, &folders);
        assert!(!fresh.duplicate);
        assert_eq!(fresh.dest.parent(), Some(folders.save.as_path()));
        assert_ne!(fresh.dest, folders.save.join("inv.pdf"));

        std::fs::write(folders.save.join("inv.pdf"), b"earlier").unwrap();
        let taken = SavePlan::for_attachment(&attachment, &folders);
        assert!(taken.duplicate);
        assert_eq!(taken.dest.parent(), Some(folders.duplicates.as_path()));
    }

    #[test]
    fn test_save_folders_layout() {
        let folders = SaveFolders::under("/data/att");
        assert_eq!(folders.duplicates, PathBuf::from("/data/att/Duplicates"));
        assert_eq!(folders.logs, PathBuf::from("/data/att/Logs"));
    }
}
