//! Two-phase download descriptor.

use serde_json::Value;

use crate::error::{Result, ShareFileError};
use crate::models::DownloadResponse;

/// Validated result of a non-redirect `Download` request.
///
/// Carries what an external downloader needs; fetching the bytes is up to
/// the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSpecification {
    pub token: String,
    pub url: String,
    pub prep_status_url: Option<String>,
    pub odata_metadata: Option<String>,
    pub odata_type: Option<String>,
}

impl DownloadSpecification {
    /// Build from a raw response body.
    pub fn from_value(data: Value) -> Result<Self> {
        if is_empty_payload(&data) {
            return Err(ShareFileError::EmptyResponse("download"));
        }

        let response: DownloadResponse = serde_json::from_value(data)?;
        Self::try_from(response)
    }
}

impl TryFrom<DownloadResponse> for DownloadSpecification {
    type Error = ShareFileError;

    fn try_from(response: DownloadResponse) -> Result<Self> {
        let token = non_empty(response.download_token).ok_or(ShareFileError::MissingField {
            payload: "download",
            field: "DownloadToken",
        })?;
        let url = non_empty(response.download_url).ok_or(ShareFileError::MissingField {
            payload: "download",
            field: "DownloadUrl",
        })?;

        Ok(Self {
            token,
            url,
            prep_status_url: response.download_prep_status_url,
            odata_metadata: response.odata_metadata,
            odata_type: response.odata_type,
        })
    }
}

/// `null`, `{}` and `""` count as no payload at all.
pub(crate) fn is_empty_payload(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
