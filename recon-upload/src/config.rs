//! recon-upload bootstrap config (`recon-upload.toml`)

use crate::catalog::{DocumentType, TargetField};
use crate::runner::UploadJob;
use recon_common::config::LoggingConfig;
use recon_common::{Error, LogFormat, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadConfig {
    pub mapping_file: Option<PathBuf>,
    pub upload_folder: Option<PathBuf>,
    pub uploaded_folder: Option<PathBuf>,
    pub failed_folder: Option<PathBuf>,

    /// Display name from the target field catalog
    pub target_field: Option<String>,
    /// Display name from the document type catalog
    pub document_type: Option<String>,

    pub username: Option<String>,
    pub log_format: Option<LogFormat>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl UploadConfig {
    /// Layer `overrides` (flags and env) over this file config
    pub fn overlay(self, overrides: UploadConfig) -> UploadConfig {
        UploadConfig {
            mapping_file: overrides.mapping_file.or(self.mapping_file),
            upload_folder: overrides.upload_folder.or(self.upload_folder),
            uploaded_folder: overrides.uploaded_folder.or(self.uploaded_folder),
            failed_folder: overrides.failed_folder.or(self.failed_folder),
            target_field: overrides.target_field.or(self.target_field),
            document_type: overrides.document_type.or(self.document_type),
            username: overrides.username.or(self.username),
            log_format: overrides.log_format.or(self.log_format),
            logging: self.logging,
        }
    }

    /// Validate into a job; every missing setting is named in one error
    pub fn into_job(self) -> Result<UploadJob> {
        let mut missing = Vec::new();
        let mut take = |value: Option<PathBuf>, name: &'static str| {
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };
        let mapping_file = take(self.mapping_file, "mapping_file");
        let upload_folder = take(self.upload_folder, "upload_folder");
        let uploaded_folder = take(self.uploaded_folder, "uploaded_folder");
        let failed_folder = take(self.failed_folder, "failed_folder");

        if self.target_field.is_none() {
            missing.push("target_field");
        }
        if self.document_type.is_none() {
            missing.push("document_type");
        }
        if !missing.is_empty() {
            return Err(Error::Config(format!("missing required settings: {}", missing.join(", "))));
        }

        let target_field = self
            .target_field
            .as_deref()
            .unwrap_or_default()
            .parse::<TargetField>()
            .map_err(Error::Config)?;
        let document_type = self
            .document_type
            .as_deref()
            .unwrap_or_default()
            .parse::<DocumentType>()
            .map_err(Error::Config)?;

        Ok(UploadJob {
            mapping_file,
            upload_folder,
            uploaded_folder,
            failed_folder,
            target_field,
            document_type,
            log_format: self.log_format.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config: UploadConfig = toml::from_str(
            r#"
            mapping_file = "/data/map.xlsx"
            upload_folder = "/data/upload"
            uploaded_folder = "/data/uploaded"
            failed_folder = "/data/failed"
            target_field = "Order Number"
            document_type = "PM Invoice"
            log_format = "text"
            "#,
        )
        .unwrap();

        assert_eq!(config.mapping_file, Some(PathBuf::from("/data/map.xlsx")));
        assert_eq!(config.log_format, Some(LogFormat::Text));
        assert_eq!(config.document_type.as_deref(), Some("PM Invoice"));
        assert_eq!(config.logging, LoggingConfig::default());
    }

    fn complete() -> UploadConfig {
        UploadConfig {
            mapping_file: Some("/m.csv".into()),
            upload_folder: Some("/up".into()),
            uploaded_folder: Some("/ok".into()),
            failed_folder: Some("/bad".into()),
            target_field: Some("equipment identifier".into()),
            document_type: Some("Warranty Document".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_overrides_win() {
        let merged = complete().overlay(UploadConfig {
            failed_folder: Some("/elsewhere".into()),
            log_format: Some(LogFormat::Text),
            ..Default::default()
        });
        let job = merged.into_job().unwrap();
        assert_eq!(job.failed_folder, PathBuf::from("/elsewhere"));
        assert_eq!(job.upload_folder, PathBuf::from("/up"));
        assert_eq!(job.log_format, LogFormat::Text);
        assert_eq!(job.target_field, TargetField::EquipmentIdentifier);
        assert_eq!(job.document_type, DocumentType::Warranty);
    }

    #[test]
    fn test_missing_settings_are_listed() {
        let config = UploadConfig {
            mapping_file: Some("/m.csv".into()),
            ..Default::default()
        };
        match config.into_job() {
            Err(Error::Config(msg)) => {
                assert!(msg.contains("upload_folder"));
                assert!(msg.contains("document_type"));
                assert!(!msg.contains("mapping_file"));
            }
            other => panic!("Expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_document_type_is_config_error() {
        let config = UploadConfig {
            document_type: Some("Please Select".into()),
            ..complete()
        };
        assert!(matches!(config.into_job(), Err(Error::Config(_))));
    }
}
