//! Document upload executor

use crate::catalog::{DocumentType, TargetField};
use crate::portal::{UploadForm, UploadPortal};
use async_trait::async_trait;
use recon_common::executor::{ActionError, ActionExecutor, ActionResponse};
use recon_common::{Artifact, MappingEntry};

/// Fills and submits the upload form for each matched file
pub struct DocumentUploader<P> {
    portal: P,
    document_type: DocumentType,
    target_field: TargetField,
}

impl<P: UploadPortal> DocumentUploader<P> {
    pub fn new(portal: P, document_type: DocumentType, target_field: TargetField) -> Self {
        Self {
            portal,
            document_type,
            target_field,
        }
    }

    pub fn portal(&self) -> &P {
        &self.portal
    }

    /// Form for `artifact` with the mapped FinalName
    pub fn form_for(&self, artifact: &Artifact, entry: &MappingEntry) -> Result<UploadForm, ActionError> {
        let file = artifact
            .as_file()
            .ok_or_else(|| ActionError::Fault(format!("'{}' is not a file", artifact.reference())))?;
        let value = entry
            .target_value()
            .ok_or_else(|| ActionError::Fault(format!("FinalName is empty for '{}'", file.stem)))?;

        Ok(UploadForm {
            file: file.path.clone(),
            document_type: self.document_type.api_name(),
            field: self.target_field.api_name(),
            value: value.to_string(),
        })
    }
}

#[async_trait]
impl<P: UploadPortal> ActionExecutor for DocumentUploader<P> {
    fn name(&self) -> &'static str {
        "upload"
    }

    async fn perform(&self, artifact: &Artifact, target: &MappingEntry) -> Result<ActionResponse, ActionError> {
        let form = self.form_for(artifact, target)?;
        tracing::info!(
            file = %artifact.reference(),
            document_type = form.document_type,
            "Setting field '{}' to '{}'",
            form.field,
            form.value
        );
        self.portal.submit(&form).await
    }
}
