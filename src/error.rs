//! Error types for the sharefile crate.

use thiserror::Error;

/// Errors that can occur when talking to the ShareFile API.
#[derive(Error, Debug)]
pub enum ShareFileError {
    #[error("Prop [{0}] is required")]
    MissingCredential(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    CredentialsParseError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Empty {0} response")]
    EmptyResponse(&'static str),

    #[error("{payload} response is missing required field '{field}'")]
    MissingField {
        payload: &'static str,
        field: &'static str,
    },

    #[error("Only standard upload method is implemented (got '{0}')")]
    UnsupportedUploadMethod(String),

    #[error("Error uploading file: {0}")]
    UploadFailed(String),

    #[error("Could not update the '{field}' field")]
    UpdateRejected { field: &'static str },

    #[error("Invalid item URL: {0}")]
    InvalidItemUrl(String),
}

/// Result type alias for ShareFileError.
pub type Result<T> = std::result::Result<T, ShareFileError>;

/// Map a non-2xx response into [`ShareFileError::ApiError`], preferring the
/// message from a ShareFile error body.
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<crate::models::ApiErrorResponse>(&error_body) {
        return Err(ShareFileError::ApiError {
            status: status.as_u16(),
            message: api_error.message.value,
        });
    }

    Err(ShareFileError::ApiError {
        status: status.as_u16(),
        message: error_body,
    })
}
