//! # recon-mail
//!
//! Attachment harvester: watches a mailbox folder, saves PDF attachments
//! into a save folder (duplicates go to a sub-folder under a unique name)
//! and moves handled messages to a processed folder.

pub mod config;
pub mod harvester;
pub mod mailbox;
pub mod monitor;
pub mod scheduler;

pub use harvester::{Harvester, SaveFolders};
pub use mailbox::{Attachment, DirectoryMailbox, MailItem, Mailbox, MailboxError};
pub use scheduler::PollScheduler;

/// Run log base name; the run start stamp is appended
pub const LOG_NAME: &str = "attachment_log";

/// `attachment_log_<YYYY-MM-DD_HHMMSS>`
pub fn log_name(started: &chrono::DateTime<chrono::Local>) -> String {
    format!("{}_{}", LOG_NAME, recon_common::time::run_stamp(started))
}
