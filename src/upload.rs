//! Two-phase upload: descriptor from the prepare step plus the byte transfer.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::download::{is_empty_payload, non_empty};
use crate::error::{ensure_success, Result, ShareFileError};
use crate::models::{UploadConfirmResponse, UploadPrepareResponse, UploadResult};
use crate::sniff::detect_content_type;

/// The only transfer method implemented.
pub const STANDARD_METHOD: &str = "Standard";

/// Validated result of an `Upload` prepare request.
///
/// The method is only checked when [`UploadSpecification::upload`] runs.
#[derive(Debug, Clone)]
pub struct UploadSpecification {
    pub method: String,
    pub url: String,
    prepare: UploadPrepareResponse,
    http: Client,
}

impl UploadSpecification {
    /// Build from a raw prepare response body.
    pub fn from_value(data: Value, http: Client) -> Result<Self> {
        if is_empty_payload(&data) {
            return Err(ShareFileError::EmptyResponse("upload"));
        }

        let response: UploadPrepareResponse = serde_json::from_value(data)?;
        Self::new(response, http)
    }

    pub fn new(response: UploadPrepareResponse, http: Client) -> Result<Self> {
        let method = non_empty(response.method.clone()).ok_or(ShareFileError::MissingField {
            payload: "upload",
            field: "Method",
        })?;
        let url = non_empty(response.chunk_uri.clone()).ok_or(ShareFileError::MissingField {
            payload: "upload",
            field: "ChunkUri",
        })?;

        Ok(Self {
            method,
            url,
            prepare: response,
            http,
        })
    }

    /// Full prepare response, including the unused resume hints.
    pub fn prepare_response(&self) -> &UploadPrepareResponse {
        &self.prepare
    }

    /// Send `contents` to the chunk URI in one request and return the first
    /// confirmed file.
    ///
    /// The chunk URI is pre-signed, so no bearer header is sent.
    pub async fn upload(&self, contents: impl Into<Vec<u8>>) -> Result<UploadResult> {
        if self.method != STANDARD_METHOD {
            return Err(ShareFileError::UnsupportedUploadMethod(self.method.clone()));
        }

        let contents: Vec<u8> = contents.into();
        let content_type = detect_content_type(&contents);

        debug!(
            bytes = contents.len(),
            content_type,
            "Submitting upload chunk"
        );

        let response = self
            .http
            .post(format!("{}&fmt=json", self.url))
            .header("Content-Type", content_type)
            .body(contents)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let confirm: UploadConfirmResponse = response.json().await?;

        if confirm.error {
            let message = confirm
                .error_message
                .unwrap_or_else(|| "server reported an upload error".to_string());
            warn!(error = %message, "Upload rejected by server");
            return Err(ShareFileError::UploadFailed(message));
        }

        confirm
            .value
            .into_iter()
            .next()
            .ok_or(ShareFileError::EmptyResponse("upload confirmation"))
    }
}
