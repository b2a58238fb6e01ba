//! Upload portal seam
//!
//! The real target is a browser-driven web form. [`UploadPortal`] models it
//! as login + one form submission per document.

use async_trait::async_trait;
use recon_common::executor::{ActionError, ActionResponse};
use recon_common::{Error, Result};
use std::path::PathBuf;

/// Completed upload form for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub file: PathBuf,
    /// Document type code
    pub document_type: &'static str,
    /// API name of the field receiving `value`
    pub field: &'static str,
    /// FinalName from the mapping
    pub value: String,
}

/// Upload target
#[async_trait]
pub trait UploadPortal: Send + Sync {
    /// Fatal `Authentication` error when rejected
    async fn login(&self, username: &str, password: &str) -> Result<()>;

    /// Submit one form; never retried
    async fn submit(&self, form: &UploadForm) -> std::result::Result<ActionResponse, ActionError>;
}

/// Demo login name accepted by [`SimulatedPortal`]
pub const DEMO_USERNAME: &str = "demo";
/// Demo password accepted by [`SimulatedPortal`]
pub const DEMO_PASSWORD: &str = "password";

/// Stand-in portal: accepts `demo`/`password`, uploads succeed when the
/// file can be read
#[derive(Debug, Default, Clone)]
pub struct SimulatedPortal;

#[async_trait]
impl UploadPortal for SimulatedPortal {
    async fn login(&self, username: &str, password: &str) -> Result<()> {
        tracing::info!(username = %username, "Simulating portal login");
        if username == DEMO_USERNAME && password == DEMO_PASSWORD {
            tracing::info!("Simulated login successful");
            Ok(())
        } else {
            Err(Error::Authentication(format!(
                "simulated login rejected, use '{}' / '{}'",
                DEMO_USERNAME, DEMO_PASSWORD
            )))
        }
    }

    async fn submit(&self, form: &UploadForm) -> std::result::Result<ActionResponse, ActionError> {
        let bytes = tokio::fs::read(&form.file)
            .await
            .map_err(|e| ActionError::Fault(format!("cannot read {}: {}", form.file.display(), e)))?;

        tracing::debug!(
            file = %form.file.display(),
            bytes = bytes.len(),
            document_type = form.document_type,
            field = form.field,
            value = %form.value,
            "Simulating form submission"
        );

        Ok(ActionResponse::new(
            "200",
            format!(
                "uploaded as {} with {} = '{}'",
                form.document_type, form.field, form.value
            ),
        ))
    }
}
