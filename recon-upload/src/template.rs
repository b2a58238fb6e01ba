//! Mapping file template

use recon_common::{Error, Result};
use std::path::{Path, PathBuf};

/// Default template file name
pub const TEMPLATE_FILE_NAME: &str = "document_mapping_template.csv";

/// `<documents>/document_mapping_template.csv`, falling back to the working directory
pub fn default_template_path() -> PathBuf {
    dirs::document_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(TEMPLATE_FILE_NAME)
}

/// Write `Title,FinalName` with one sample row
pub fn write_template(path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Err(Error::Input(format!(
            "template already exists: {} (pass --overwrite to replace it)",
            path.display()
        )));
    }

    let write_err = |e: csv::Error| Error::Input(format!("Failed to write {}: {}", path.display(), e));
    let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
    writer.write_record(["Title", "FinalName"]).map_err(write_err)?;
    writer
        .write_record(["SampleDocumentTitle", "SampleFinalIdentifier"])
        .map_err(write_err)?;
    writer.flush()?;

    tracing::info!(path = %path.display(), "Mapping template exported");
    Ok(())
}
