use crate::config::Config;
use crate::error::UploadError;
use crate::upload::types::Selection;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde_json::Value;

/// The remote collaborator that receives a whole selection in one request.
#[async_trait]
pub trait UploadEndpoint: Send + Sync {
    async fn upload(&self, selection: &Selection) -> Result<Value, UploadError>;
}

/// Sends a selection as a single `multipart/form-data` POST.
#[derive(Clone)]
pub struct FileProcessor {
    client: reqwest::Client,
    endpoint: Url,
    field_name: String,
}

impl FileProcessor {
    pub fn new(client: reqwest::Client, endpoint: Url, field_name: String) -> Self {
        Self {
            client,
            endpoint,
            field_name,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(
            builder.build()?,
            config.endpoint.clone(),
            config.field_name.clone(),
        ))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// One part per selected file, in selection order, all under the shared
    /// field name.
    pub async fn build_form(&self, selection: &Selection) -> Result<Form, UploadError> {
        let mut form = Form::new();
        for file in selection.files() {
            let bytes = file.read_bytes().await.map_err(|e| UploadError::Read {
                name: file.name.clone(),
                source: e,
            })?;

            let part = Part::bytes(bytes)
                .file_name(file.name.clone())
                .mime_str(&file.mime_type)
                .map_err(|e| UploadError::InvalidMime {
                    name: file.name.clone(),
                    mime: file.mime_type.clone(),
                    source: e,
                })?;

            form = form.part(self.field_name.clone(), part);
        }
        Ok(form)
    }
}

#[async_trait]
impl UploadEndpoint for FileProcessor {
    async fn upload(&self, selection: &Selection) -> Result<Value, UploadError> {
        let form = self.build_form(selection).await?;

        tracing::info!(
            endpoint = %self.endpoint,
            files = selection.len(),
            bytes = selection.total_bytes(),
            "sending upload"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(UploadError::Request)?;

        let status = response.status();
        if !status.is_success() {
            // The body still decides the outcome; only note it.
            tracing::warn!(%status, "upload endpoint answered with a non-success status");
        }

        let body = response.json::<Value>().await.map_err(UploadError::Decode)?;
        tracing::debug!(%status, %body, "upload response");
        Ok(body)
    }
}
