//! Remote persistence backend: a single script endpoint that both detects an
//! existing record and writes, selected by the `update` flag in the body.
//!
//! First call always goes out with `update = false`. A `"conflict"` answer means
//! the identifier already has a row; the caller asks the user and resends the
//! identical payload with `update = true`.

use anyhow::Context;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use idcapture_core::{
    ExtractedData, IdCaptureError, PersistenceBackend, SaveOutcome, SaveRequest, SaveResult,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::mock::conflict_prompt;
use crate::transliterate::{image_file_name, name_without_accents};

pub struct RemoteBackend {
    client: Client,
    endpoint_url: String,
}

impl RemoteBackend {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint_url: endpoint_url.into(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBody<'a> {
    pub employee_id: &'a str,
    pub update: bool,
    pub extracted_data: ExtractedFields<'a>,
    pub image_file: ImageFile<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields<'a> {
    #[serde(flatten)]
    pub data: &'a ExtractedData,
    pub full_name_no_accent: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFile<'a> {
    pub mime_type: &'a str,
    pub file_name: String,
    pub data: String,
}

impl<'a> SaveBody<'a> {
    pub fn from_request(request: &'a SaveRequest, update: bool) -> Self {
        let key = request.employee_id.as_str();
        let name_no_accent = name_without_accents(&request.extracted.full_name);
        Self {
            employee_id: key,
            update,
            image_file: ImageFile {
                mime_type: &request.image.mime_type,
                file_name: image_file_name(key, &name_no_accent, request.image.extension()),
                data: STANDARD.encode(&request.image.data),
            },
            extracted_data: ExtractedFields {
                data: &request.extracted,
                full_name_no_accent: name_no_accent,
            },
        }
    }
}

/// `{status, message}` answered by the script.
#[derive(Debug, Deserialize)]
pub struct ScriptResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl ScriptResponse {
    /// Map the status discriminator onto a save outcome.
    pub fn into_outcome(self, employee_id: &str, update: bool) -> Result<SaveOutcome, IdCaptureError> {
        match self.status.as_str() {
            "success" => Ok(SaveOutcome::Saved(SaveResult {
                message: self.message,
                is_update: update,
            })),
            "conflict" if !update => {
                let prompt = if self.message.is_empty() {
                    conflict_prompt(employee_id)
                } else {
                    self.message
                };
                Ok(SaveOutcome::NeedsConfirmation { prompt })
            }
            other => {
                warn!(status = other, message = %self.message, "Backend rejected save");
                let message = if self.message.is_empty() {
                    format!("backend reported status \"{other}\"")
                } else {
                    self.message
                };
                Err(IdCaptureError::Persistence(message))
            }
        }
    }
}

impl RemoteBackend {
    async fn post(&self, body: &SaveBody<'_>) -> anyhow::Result<ScriptResponse> {
        let response = self
            .client
            .post(&self.endpoint_url)
            .json(body)
            .send()
            .await
            .context("Backend HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Backend returned {}: {}", status, error_body);
        }

        response
            .json()
            .await
            .context("Failed to parse backend response")
    }
}

#[async_trait]
impl PersistenceBackend for RemoteBackend {
    fn name(&self) -> &str {
        "remote"
    }

    async fn save(&self, request: &SaveRequest, update: bool) -> Result<SaveOutcome, IdCaptureError> {
        if self.endpoint_url.trim().is_empty() {
            return Err(IdCaptureError::config("backend URL is not set"));
        }

        let body = SaveBody::from_request(request, update);
        debug!(employee_id = body.employee_id, update, file = %body.image_file.file_name, "Posting record to backend");

        let reply = match self.post(&body).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %format!("{e:#}"), "Error calling backend");
                return Err(IdCaptureError::persistence(
                    "server error while saving data, please try again",
                ));
            }
        };
        info!(employee_id = body.employee_id, update, status = %reply.status, "Backend answered");
        reply.into_outcome(body.employee_id, update)
    }
}
