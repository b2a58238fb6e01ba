//! Upload run
//!
//! Login, mapping load and staging scan are fatal and happen before any file
//! is touched. After that every file gets exactly one upload attempt and is
//! moved to the uploaded or failed folder.

use crate::catalog::{DocumentType, TargetField, SUPPORTED_EXTENSIONS};
use crate::executor::DocumentUploader;
use crate::portal::UploadPortal;
use recon_common::reconciler::{Destinations, Reconciler, StatusWords};
use recon_common::scanner::FolderScanner;
use recon_common::{
    Artifact, Error, FileArtifact, LogFormat, MappingLoader, Pipeline, Result, RunContext, RunLog, RunSummary,
};
use std::path::PathBuf;

/// Run log file stem, written into the uploaded folder
pub const LOG_NAME: &str = "automated_upload_log";

/// Validated upload settings
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub mapping_file: PathBuf,
    pub upload_folder: PathBuf,
    pub uploaded_folder: PathBuf,
    pub failed_folder: PathBuf,
    pub target_field: TargetField,
    pub document_type: DocumentType,
    pub log_format: LogFormat,
}

#[derive(Debug)]
pub struct UploadReport {
    pub summary: RunSummary,
    /// `None` when writing the log failed
    pub log_path: Option<PathBuf>,
}

/// Run one upload job through `portal`
pub async fn run_upload<P: UploadPortal>(
    ctx: &RunContext,
    job: &UploadJob,
    username: &str,
    password: &str,
    portal: P,
) -> Result<UploadReport> {
    tracing::info!("Starting document upload");

    portal.login(username, password).await?;

    let table = MappingLoader::title_to_final_name().load(&job.mapping_file)?;
    tracing::info!(mappings = table.len(), "Loaded valid mappings");

    let files = FolderScanner::new(SUPPORTED_EXTENSIONS).scan_non_empty(&job.upload_folder)?;
    tracing::info!(
        files = files.len(),
        folder = %job.upload_folder.display(),
        "Found files to process"
    );

    let reconciler = Reconciler::new(
        Destinations::new(&job.uploaded_folder, &job.failed_folder),
        StatusWords::default(),
    );
    if !ctx.dry_run {
        reconciler
            .destinations()
            .ensure_exist()
            .map_err(|e| Error::Input(format!("Cannot prepare output folders: {}", e)))?;
    }

    let artifacts: Vec<Artifact> = files
        .iter()
        .map(|path| Artifact::File(FileArtifact::from_path(path)))
        .collect();
    let uploader = DocumentUploader::new(portal, job.document_type, job.target_field);

    let mut log = RunLog::new(&job.uploaded_folder, LOG_NAME);
    let summary = Pipeline::new(ctx, "upload", &uploader)
        .with_reconciler(&reconciler)
        .run(&artifacts, &table, &mut log)
        .await;

    let log_path = match log.flush(job.log_format) {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::error!("Error exporting log: {}", e);
            None
        }
    };

    Ok(UploadReport { summary, log_path })
}
