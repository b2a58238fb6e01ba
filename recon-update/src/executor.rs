//! Record update executor

use crate::api::{RecordApi, UpdateRequest};
use crate::fields::RecordField;
use crate::session::Session;
use async_trait::async_trait;
use recon_common::executor::{ActionError, ActionExecutor, ActionResponse};
use recon_common::{Artifact, MappingEntry};

/// Sends one update per matched row
pub struct RecordUpdater<A> {
    api: A,
    session: Session,
}

impl<A: RecordApi> RecordUpdater<A> {
    pub fn new(api: A, session: Session) -> Self {
        Self { api, session }
    }

    /// Translate display-name columns to API field names
    pub fn request_for(record_id: &str, entry: &MappingEntry) -> Result<UpdateRequest, ActionError> {
        let fields = entry
            .fields
            .iter()
            .map(|(column, value)| {
                RecordField::from_display_name(column)
                    .map(|field| (field.api_name().to_string(), value.clone()))
                    .ok_or_else(|| ActionError::Fault(format!("unknown field column '{}'", column)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UpdateRequest {
            record_id: record_id.to_string(),
            fields,
        })
    }
}

#[async_trait]
impl<A: RecordApi> ActionExecutor for RecordUpdater<A> {
    fn name(&self) -> &'static str {
        "update"
    }

    async fn perform(&self, artifact: &Artifact, target: &MappingEntry) -> Result<ActionResponse, ActionError> {
        let request = Self::request_for(artifact.reference(), target)?;
        tracing::info!(
            record_id = %request.record_id,
            fields = ?request.fields,
            "Sending update"
        );

        let response = self.api.update(&self.session, &request).await?;
        if response.is_success() {
            Ok(ActionResponse::new(response.status.to_string(), response.body))
        } else {
            Err(ActionError::Rejected {
                code: response.status.to_string(),
                detail: response.body,
            })
        }
    }
}
