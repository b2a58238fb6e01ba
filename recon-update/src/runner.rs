//! Update run: sheet -> rows -> record API -> update_log.csv

use crate::fields::{RecordField, RECORD_ID_COLUMN};
use recon_common::executor::ActionExecutor;
use recon_common::{
    Artifact, LogFormat, MappingLoader, MappingTable, Pipeline, Result, RunContext, RunLog, RunSummary,
};
use std::path::{Path, PathBuf};

/// Run log file stem
pub const LOG_NAME: &str = "update_log";

/// Loaded update set
#[derive(Debug)]
pub struct UpdateSet {
    pub table: MappingTable,
    /// One row artifact per table entry, in sheet order
    pub rows: Vec<Artifact>,
}

impl UpdateSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Result of a run that actually started
#[derive(Debug)]
pub struct UpdateReport {
    pub summary: RunSummary,
    /// `None` when writing the log failed
    pub log_path: Option<PathBuf>,
}

/// Read the sheet; `equipment_id` plus every selected field is required
pub fn load_updates(path: &Path, fields: &[RecordField]) -> Result<UpdateSet> {
    let loader = MappingLoader::new(
        RECORD_ID_COLUMN,
        fields.iter().map(|f| f.display_name().to_string()).collect(),
    );
    let table = loader.load(path)?;

    if table.duplicate_key_count() > 0 {
        tracing::warn!(
            duplicates = table.duplicate_key_count(),
            "Sheet repeats record ids; the first row for each id is used"
        );
    }

    let rows = table
        .entries()
        .iter()
        .map(|entry| Artifact::Row {
            record_id: entry.source_key.clone(),
        })
        .collect();

    Ok(UpdateSet { table, rows })
}

/// Replay `updates` and write `<output_dir>/update_log.csv`
///
/// Returns `None` without touching the output folder when there is nothing
/// to send.
pub async fn run_updates(
    ctx: &RunContext,
    updates: &UpdateSet,
    executor: &dyn ActionExecutor,
    output_dir: &Path,
) -> Option<UpdateReport> {
    if updates.is_empty() {
        tracing::warn!("No updates to process, check the sheet data");
        return None;
    }
    tracing::info!(records = updates.rows.len(), dry_run = ctx.dry_run, "Prepared updates");

    let mut log = RunLog::new(output_dir, LOG_NAME);
    let summary = Pipeline::new(ctx, "update", executor)
        .run(&updates.rows, &updates.table, &mut log)
        .await;

    let log_path = match log.flush(LogFormat::Csv) {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::error!("Failed to write update log: {}", e);
            None
        }
    };

    Some(UpdateReport { summary, log_path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use recon_common::Error;
    use tempfile::TempDir;

    #[test]
    fn test_missing_selected_column_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sheet.csv");
        std::fs::write(&path, "equipment_id,Color\nEQ1,Red\n").unwrap();

        let err = load_updates(&path, &[RecordField::Color, RecordField::Gvw]).unwrap_err();
        match err {
            Error::Schema(msg) => assert!(msg.contains("GVW")),
            other => panic!("Expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_rows_without_values_are_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sheet.csv");
        std::fs::write(&path, "equipment_id,Color,GVW\nEQ1,Red,\nEQ2,,\n,Blue,1\nEQ3,,26000\n").unwrap();

        let updates = load_updates(&path, &[RecordField::Color, RecordField::Gvw]).unwrap();
        let ids: Vec<&str> = updates.rows.iter().map(|r| r.reference()).collect();
        assert_eq!(ids, vec!["EQ1", "EQ3"]);
        assert_eq!(updates.table.entries()[0].fields.len(), 1);
    }
}
