//! Harvest passes over a folder-backed mailbox

use recon_common::executor::DRY_RUN_CODE;
use recon_common::pipeline::DUPLICATE_CODE;
use recon_common::{LogFormat, OutcomeStatus, RunContext, RunLog};
use recon_mail::harvester::SAVED_CODE;
use recon_mail::{Attachment, DirectoryMailbox, Harvester, MailItem, Mailbox, MailboxError, PollScheduler, SaveFolders};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

struct Fixture {
    _root: TempDir,
    source: PathBuf,
    processed: PathBuf,
    folders: SaveFolders,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let source = root.path().join("Scraper Output");
        fs::create_dir_all(&source).unwrap();
        let folders = SaveFolders::under(root.path().join("att"));
        folders.ensure_exist().unwrap();
        Self {
            processed: root.path().join("Processed - Scraper Output"),
            source,
            folders,
            _root: root,
        }
    }

    fn message(&self, subject: &str, files: &[(&str, &str)]) {
        let dir = self.source.join(subject);
        fs::create_dir_all(&dir).unwrap();
        for (name, body) in files {
            fs::write(dir.join(name), body).unwrap();
        }
    }

    fn harvester(&self) -> Harvester<DirectoryMailbox> {
        let mailbox = DirectoryMailbox::open(&self.source, &self.processed).unwrap();
        Harvester::new(mailbox, self.folders.clone())
    }

    fn log(&self) -> RunLog {
        RunLog::new(&self.folders.logs, "attachment_log_test")
    }
}

fn names_in(folder: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(folder)
        .map(|entries| {
            entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

/// Files in the save folder itself, sub-folders excluded
fn saved_files(folders: &SaveFolders) -> Vec<String> {
    names_in(&folders.save)
        .into_iter()
        .filter(|n| folders.save.join(n).is_file())
        .collect()
}

#[tokio::test]
async fn test_pdf_saved_and_message_moved() {
    let fx = Fixture::new();
    fx.message("Invoice", &[("inv.pdf", "invoice bytes"), ("notes.txt", "ignore me")]);
    fx.message("Photos", &[("img.jpg", "jpeg")]);

    let mut harvester = fx.harvester();
    let mut log = fx.log();
    let summary = harvester.pass(&RunContext::new(false), &mut log).await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.total(), 1);
    let saved = saved_files(&fx.folders);
    assert_eq!(saved.len(), 1);
    assert!(saved[0].starts_with("inv_"));
    assert!(saved[0].ends_with(".pdf"));
    assert_ne!(saved[0], "inv.pdf");
    assert_eq!(
        fs::read_to_string(fx.folders.save.join(&saved[0])).unwrap(),
        "invoice bytes"
    );
    assert_eq!(names_in(&fx.source), vec!["Photos"]);
    assert_eq!(names_in(&fx.processed), vec!["Invoice"]);

    assert_eq!(log.entries().len(), 1);
    assert_eq!(log.entries()[0].artifact_ref, "inv.pdf");
    assert_eq!(log.entries()[0].code, SAVED_CODE);
}

#[tokio::test]
async fn test_existing_name_goes_to_duplicates_and_message_stays() {
    let fx = Fixture::new();
    fs::write(fx.folders.save.join("inv.pdf"), "first copy").unwrap();
    fx.message("Resend", &[("inv.pdf", "second copy")]);

    let mut harvester = fx.harvester();
    let mut log = fx.log();
    let summary = harvester.pass(&RunContext::new(false), &mut log).await.unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(
        fs::read_to_string(fx.folders.save.join("inv.pdf")).unwrap(),
        "first copy"
    );
    let duplicates = names_in(&fx.folders.duplicates);
    assert_eq!(duplicates.len(), 1);
    assert!(duplicates[0].starts_with("inv_"));
    assert!(duplicates[0].ends_with(".pdf"));
    assert_eq!(log.entries()[0].status, OutcomeStatus::Skipped);
    assert_eq!(log.entries()[0].code, DUPLICATE_CODE);

    assert_eq!(names_in(&fx.source), vec!["Resend"]);
    assert!(!fx.processed.exists());
}

#[tokio::test]
async fn test_attachment_attempted_once_per_run() {
    let fx = Fixture::new();
    fs::write(fx.folders.save.join("inv.pdf"), "first copy").unwrap();
    fx.message("Resend", &[("inv.pdf", "second copy")]);

    let mut harvester = fx.harvester();
    let mut log = fx.log();
    let ctx = RunContext::new(false);
    harvester.pass(&ctx, &mut log).await.unwrap();
    let second = harvester.pass(&ctx, &mut log).await.unwrap();

    assert_eq!(second.total(), 0);
    assert_eq!(log.entries().len(), 1);
    assert_eq!(names_in(&fx.folders.duplicates).len(), 1);
}

#[tokio::test]
async fn test_dry_run_copies_and_moves_nothing() {
    let fx = Fixture::new();
    fx.message("Invoice", &[("inv.pdf", "invoice bytes")]);

    let mut harvester = fx.harvester();
    let mut log = fx.log();
    harvester.pass(&RunContext::new(true), &mut log).await.unwrap();

    assert!(saved_files(&fx.folders).is_empty());
    assert_eq!(names_in(&fx.source), vec!["Invoice"]);
    assert_eq!(log.entries()[0].code, DRY_RUN_CODE);
}

#[tokio::test]
async fn test_cancelled_pass_touches_nothing() {
    let fx = Fixture::new();
    fx.message("Invoice", &[("inv.pdf", "invoice bytes")]);

    let ctx = RunContext::new(false);
    ctx.cancel.cancel();
    let mut harvester = fx.harvester();
    let mut log = fx.log();
    let summary = harvester.pass(&ctx, &mut log).await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.total(), 0);
    assert_eq!(names_in(&fx.source), vec!["Invoice"]);
}

/// Requests a stop as soon as the first message is moved
struct StopAfterFirstMove {
    inner: DirectoryMailbox,
    cancel: CancellationToken,
}

#[async_trait::async_trait]
impl Mailbox for StopAfterFirstMove {
    async fn pending(&self) -> Result<Vec<MailItem>, MailboxError> {
        self.inner.pending().await
    }

    async fn save_attachment(&self, attachment: &Attachment, dest: &Path) -> Result<(), MailboxError> {
        self.inner.save_attachment(attachment, dest).await
    }

    async fn mark_processed(&self, item: &MailItem) -> Result<PathBuf, MailboxError> {
        let moved = self.inner.mark_processed(item).await;
        self.cancel.cancel();
        moved
    }
}

#[tokio::test]
async fn test_stop_mid_pass_keeps_completed_message() {
    let fx = Fixture::new();
    fx.message("A", &[("a.pdf", "a")]);
    fx.message("B", &[("b.pdf", "b")]);
    fx.message("C", &[("c.pdf", "c")]);

    let ctx = RunContext::new(false);
    let mailbox = StopAfterFirstMove {
        inner: DirectoryMailbox::open(&fx.source, &fx.processed).unwrap(),
        cancel: ctx.cancel.clone(),
    };
    let mut harvester = Harvester::new(mailbox, fx.folders.clone());
    let mut log = fx.log();
    let summary = harvester.pass(&ctx, &mut log).await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(log.entries().len(), 1);
    assert_eq!(log.entries()[0].artifact_ref, "a.pdf");
    assert_eq!(names_in(&fx.processed), vec!["A"]);
    assert_eq!(names_in(&fx.source), vec!["B", "C"]);
    assert_eq!(saved_files(&fx.folders).len(), 1);
}

#[tokio::test]
async fn test_single_scheduled_pass_and_log_flush() {
    let fx = Fixture::new();
    fx.message("A", &[("a.pdf", "a")]);
    fx.message("B", &[("b.PDF", "b"), ("b.docx", "b")]);

    let mut harvester = fx.harvester();
    let mut log = fx.log();
    let totals = PollScheduler::new(1)
        .once()
        .run(&mut harvester, &RunContext::new(false), &mut log)
        .await;

    assert_eq!(totals.succeeded, 2);
    assert!(!totals.cancelled);
    assert_eq!(names_in(&fx.processed), vec!["A", "B"]);

    let path = log.flush(LogFormat::Csv).unwrap();
    assert_eq!(path, fx.folders.logs.join("attachment_log_test.csv"));
    let mut reader = csv::Reader::from_path(path).unwrap();
    let refs: Vec<String> = reader.records().map(|r| r.unwrap()[0].to_string()).collect();
    assert_eq!(refs, vec!["a.pdf", "b.PDF"]);
}

#[tokio::test]
async fn test_scheduler_survives_missing_source() {
    let fx = Fixture::new();
    let mut harvester = fx.harvester();
    fs::remove_dir_all(&fx.source).unwrap();

    let mut log = fx.log();
    let totals = PollScheduler::new(1)
        .once()
        .run(&mut harvester, &RunContext::new(false), &mut log)
        .await;

    assert_eq!(totals.total(), 0);
    assert!(log.entries().is_empty());
}

#[tokio::test]
async fn test_scheduler_stops_on_cancel_while_waiting() {
    let fx = Fixture::new();
    let mut harvester = fx.harvester();
    let mut log = fx.log();
    let ctx = RunContext::new(false);

    let cancel = ctx.cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let totals = PollScheduler::new(3600).run(&mut harvester, &ctx, &mut log).await;
    assert!(totals.cancelled);
}
