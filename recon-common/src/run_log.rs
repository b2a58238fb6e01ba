//! Run Log
//!
//! Append-only list of outcomes, written once at the end of the run. The
//! file is written to a temporary sibling and renamed into place, so a
//! failed flush never leaves a partial log behind. A failed flush is
//! reported; it never undoes actions already performed.

use crate::artifact::{Outcome, OutcomeStatus};
use crate::time::log_timestamp;
use serde::Deserialize;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// CSV header, one row per outcome
pub const CSV_HEADER: [&str; 5] = ["record_id", "response_code", "status", "detail", "timestamp"];

/// Run log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One timestamped line per outcome
    Text,
    /// CSV with [`CSV_HEADER`]
    #[default]
    Csv,
}

impl LogFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            LogFormat::Text => "txt",
            LogFormat::Csv => "csv",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(LogFormat::Text),
            "csv" => Ok(LogFormat::Csv),
            other => Err(format!("unknown log format '{}' (expected text or csv)", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => f.write_str("text"),
            LogFormat::Csv => f.write_str("csv"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RunLogError {
    #[error("run log already written to {0}")]
    AlreadyFlushed(PathBuf),

    #[error("failed to write run log {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// In-memory run log
#[derive(Debug)]
pub struct RunLog {
    folder: PathBuf,
    name: String,
    entries: Vec<Outcome>,
    flushed_to: Option<PathBuf>,
}

impl RunLog {
    /// Log that will be written to `folder/name.<ext>`
    pub fn new(folder: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            name: name.into(),
            entries: Vec::new(),
            flushed_to: None,
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        self.entries.push(outcome);
    }

    pub fn entries(&self) -> &[Outcome] {
        &self.entries
    }

    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.entries.iter().filter(|o| o.status == status).count()
    }

    pub fn path_for(&self, format: LogFormat) -> PathBuf {
        self.folder.join(format!("{}.{}", self.name, format.extension()))
    }

    /// Render one text line
    pub fn text_line(outcome: &Outcome) -> String {
        format!(
            "[{}] - {} {} ({}): {}",
            log_timestamp(&outcome.timestamp),
            outcome.status,
            outcome.artifact_ref,
            outcome.code,
            outcome.detail
        )
    }

    fn write_text<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        for outcome in &self.entries {
            writeln!(out, "{}", Self::text_line(outcome))?;
        }
        out.flush()
    }

    fn write_csv<W: Write>(&self, out: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(CSV_HEADER)?;
        for outcome in &self.entries {
            writer.write_record([
                outcome.artifact_ref.as_str(),
                outcome.code.as_str(),
                outcome.status.as_str(),
                outcome.detail.as_str(),
                log_timestamp(&outcome.timestamp).as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write every entry once, in insertion order
    pub fn flush(&mut self, format: LogFormat) -> Result<PathBuf, RunLogError> {
        if let Some(path) = &self.flushed_to {
            return Err(RunLogError::AlreadyFlushed(path.clone()));
        }

        let path = self.path_for(format);
        let write_err = |message: String| RunLogError::Write {
            path: path.clone(),
            message,
        };

        std::fs::create_dir_all(&self.folder).map_err(|e| write_err(e.to_string()))?;

        let tmp = tmp_path(&path);
        let file = std::fs::File::create(&tmp).map_err(|e| write_err(e.to_string()))?;
        let written = match format {
            LogFormat::Text => self.write_text(std::io::BufWriter::new(file)).map_err(|e| e.to_string()),
            LogFormat::Csv => self.write_csv(file).map_err(|e| e.to_string()),
        };
        if let Err(message) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(write_err(message));
        }
        std::fs::rename(&tmp, &path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            write_err(e.to_string())
        })?;

        tracing::info!(path = %path.display(), entries = self.entries.len(), "Run log exported");
        self.flushed_to = Some(path.clone());
        Ok(path)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
