//! recon-mail bootstrap config (`recon-mail.toml`)

use crate::scheduler::DEFAULT_POLL_INTERVAL_SECS;
use recon_common::config::LoggingConfig;
use recon_common::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Save folder name under the documents directory
pub const DEFAULT_SAVE_DIR: &str = "Automated_Attachments";
/// Processed folder name, created next to the source folder
pub const DEFAULT_PROCESSED_DIR: &str = "Processed - Scraper Output";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailConfig {
    pub source_folder: Option<PathBuf>,
    pub processed_folder: Option<PathBuf>,
    pub save_folder: Option<PathBuf>,
    pub poll_interval_secs: Option<u64>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Resolved folders and timing for one monitor session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub source_folder: PathBuf,
    pub processed_folder: PathBuf,
    pub save_folder: PathBuf,
    pub poll_interval_secs: u64,
}

impl MailConfig {
    /// Layer `overrides` (flags and env) over this file config
    pub fn overlay(self, overrides: MailConfig) -> MailConfig {
        MailConfig {
            source_folder: overrides.source_folder.or(self.source_folder),
            processed_folder: overrides.processed_folder.or(self.processed_folder),
            save_folder: overrides.save_folder.or(self.save_folder),
            poll_interval_secs: overrides.poll_interval_secs.or(self.poll_interval_secs),
            logging: self.logging,
        }
    }

    /// Fill defaults; only the source folder is required
    pub fn into_settings(self) -> Result<MailSettings> {
        let source_folder = self
            .source_folder
            .ok_or_else(|| Error::Config("missing required setting: source_folder".to_string()))?;
        let processed_folder = self
            .processed_folder
            .unwrap_or_else(|| default_processed_folder(&source_folder));
        let save_folder = match self.save_folder {
            Some(folder) => folder,
            None => default_save_folder()?,
        };

        Ok(MailSettings {
            source_folder,
            processed_folder,
            save_folder,
            poll_interval_secs: self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        })
    }
}

/// `<documents>/Automated_Attachments`
pub fn default_save_folder() -> Result<PathBuf> {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .map(|dir| dir.join(DEFAULT_SAVE_DIR))
        .ok_or_else(|| Error::Config("could not determine a documents folder; set save_folder".to_string()))
}

/// Sibling of the source folder
pub fn default_processed_folder(source: &Path) -> PathBuf {
    match source.parent() {
        Some(parent) => parent.join(DEFAULT_PROCESSED_DIR),
        None => PathBuf::from(DEFAULT_PROCESSED_DIR),
    }
}
