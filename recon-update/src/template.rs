//! Update sheet template

use crate::fields::{headers, RecordField};
use recon_common::{Error, Result};
use std::path::{Path, PathBuf};

/// Default template file name
pub const TEMPLATE_FILE_NAME: &str = "RECON_UPDATE_TEMPLATE.csv";

/// `<downloads>/RECON_UPDATE_TEMPLATE.csv`, falling back to the working directory
pub fn default_template_path() -> PathBuf {
    dirs::download_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(TEMPLATE_FILE_NAME)
}

/// Write a header-only CSV for `fields`
///
/// An existing file is left alone unless `overwrite` is set.
pub fn write_template(path: &Path, fields: &[RecordField], overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Err(Error::Input(format!(
            "template already exists: {} (pass --overwrite to replace it)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::Input(format!("Failed to create {}: {}", path.display(), e)))?;
    writer
        .write_record(headers(fields))
        .map_err(|e| Error::Input(format!("Failed to write {}: {}", path.display(), e)))?;
    writer.flush()?;

    tracing::info!(path = %path.display(), columns = fields.len() + 1, "Template saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_has_id_and_selected_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.csv");

        write_template(&path, &[RecordField::LicensePlate, RecordField::LicenseState], false).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), "equipment_id,License Plate,License State");
    }

    #[test]
    fn test_existing_template_needs_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.csv");
        std::fs::write(&path, "keep me").unwrap();

        assert!(matches!(write_template(&path, &[RecordField::Color], false), Err(Error::Input(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");

        write_template(&path, &[RecordField::Color], true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim_end(), "equipment_id,Color");
    }
}
