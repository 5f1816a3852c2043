//! Wire models for ShareFile API payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// OData type tag the API puts on folders.
pub const FOLDER_TYPE: &str = "ShareFile.Api.Models.Folder";

/// OData type tag the API puts on files.
pub const FILE_TYPE: &str = "ShareFile.Api.Models.File";

/// Lightweight pointer to another item, e.g. an item's `Parent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemRef {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "odata.metadata", skip_serializing_if = "Option::is_none")]
    pub odata_metadata: Option<String>,
    #[serde(rename = "odata.type", skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,
}

/// Capability flags attached to folders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ItemInfo {
    #[serde(rename = "url")]
    pub url: Option<String>,
    #[serde(rename = "odata.metadata")]
    pub odata_metadata: Option<String>,
    #[serde(rename = "odata.type")]
    pub odata_type: Option<String>,
    pub has_vroot: Option<bool>,
    pub is_system_root: Option<bool>,
    pub is_account_root: Option<bool>,
    #[serde(rename = "IsVRoot")]
    pub is_vroot: Option<bool>,
    pub is_my_folders: Option<bool>,
    #[serde(rename = "IsAHomeFolder")]
    pub is_a_home_folder: Option<bool>,
    pub is_my_home_folder: Option<bool>,
    #[serde(rename = "IsAStartFolder")]
    pub is_a_start_folder: Option<bool>,
    pub is_shared_folder: Option<bool>,
    pub is_passthrough: Option<bool>,
    pub can_add_folder: Option<bool>,
    pub can_add_node: Option<bool>,
    pub can_view: Option<bool>,
    pub can_download: Option<bool>,
    pub can_upload: Option<bool>,
    pub can_send: Option<bool>,
    pub can_delete_current_item: Option<bool>,
    pub can_delete_child_items: Option<bool>,
    pub can_manage_permissions: Option<bool>,
    pub can_create_office_documents: Option<bool>,
    #[serde(rename = "FolderPayID")]
    pub folder_pay_id: Option<String>,
    pub show_folder_pay_buy_button: Option<bool>,
}

/// Snapshot of a remote file or folder.
///
/// Dates are kept as the server's ISO-8601 strings. Fields the model does
/// not name are preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ItemModel {
    pub id: Option<String>,
    #[serde(rename = "url")]
    pub url: Option<String>,
    #[serde(rename = "odata.metadata")]
    pub odata_metadata: Option<String>,
    #[serde(rename = "odata.type")]
    pub odata_type: Option<String>,

    pub name: Option<String>,
    pub file_name: Option<String>,
    pub description: Option<String>,
    pub parent: Option<ItemRef>,
    pub file_count: Option<u64>,
    pub info: Option<ItemInfo>,
    pub hash: Option<String>,

    pub creation_date: Option<String>,
    pub progeny_edit_date: Option<String>,
    pub client_created_date: Option<String>,
    pub client_modified_date: Option<String>,
    pub expiration_date: Option<String>,
    pub expiration_days: Option<i64>,

    pub disk_space_limit: Option<i64>,
    #[serde(rename = "BandwidthLimitInMB")]
    pub bandwidth_limit_in_mb: Option<i64>,
    #[serde(rename = "FileSizeInKB")]
    pub file_size_in_kb: Option<u64>,
    pub file_size_bytes: Option<u64>,
    pub path: Option<String>,

    pub creator_first_name: Option<String>,
    pub creator_last_name: Option<String>,
    pub creator_name_short: Option<String>,

    pub is_hidden: Option<bool>,
    pub has_pending_deletion: Option<bool>,
    pub has_permission_info: Option<bool>,
    pub has_multiple_versions: Option<bool>,
    pub has_pending_async_op: Option<bool>,
    pub state: Option<i64>,
    pub virus_status: Option<String>,
    pub preview_status: Option<String>,

    #[serde(rename = "StreamID")]
    pub stream_id: Option<String>,
    #[serde(rename = "AssociatedFolderTemplateID")]
    pub associated_folder_template_id: Option<String>,
    pub is_template_owned: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl std::fmt::Display for ItemModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size_str = self
            .file_size_bytes
            .map(format_size)
            .unwrap_or_else(|| "-".to_string());
        let kind = self
            .odata_type
            .as_deref()
            .and_then(|t| t.rsplit('.').next())
            .unwrap_or("-");
        let id = self.id.as_deref().unwrap_or("-");
        let name = self.name.as_deref().unwrap_or("-");
        write!(f, "{:<44} {:>10} {:<8} {}", id, size_str, kind, name)
    }
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Response from `Items(<id>)/Children`. Entries stay raw so each one goes
/// through item validation.
#[derive(Debug, Deserialize)]
pub struct ChildrenResponse {
    #[serde(rename = "odata.count", default)]
    pub odata_count: Option<u64>,
    #[serde(default)]
    pub value: Vec<Value>,
}

/// Response from `Download?redirect=false`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DownloadResponse {
    #[serde(rename = "DownloadToken")]
    pub download_token: Option<String>,
    #[serde(rename = "DownloadUrl")]
    pub download_url: Option<String>,
    #[serde(rename = "DownloadPrepStatusURL")]
    pub download_prep_status_url: Option<String>,
    #[serde(rename = "odata.metadata")]
    pub odata_metadata: Option<String>,
    #[serde(rename = "odata.type")]
    pub odata_type: Option<String>,
}

/// Response from `Upload?method=standard`.
///
/// Resume and threading hints are accepted but unused.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UploadPrepareResponse {
    pub method: Option<String>,
    pub chunk_uri: Option<String>,
    pub progress_data: Option<String>,
    pub is_resume: Option<bool>,
    pub resume_index: Option<u64>,
    pub resume_offset: Option<u64>,
    pub resume_file_hash: Option<String>,
    pub max_number_of_threads: Option<u32>,
    pub can_accept_params_in_headers: Option<bool>,
}

/// Server confirmation for one uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadResult {
    pub uploadid: Option<String>,
    pub parentid: Option<String>,
    pub streamid: Option<String>,
    pub id: Option<String>,
    pub filename: Option<String>,
    pub displayname: Option<String>,
    pub size: Option<u64>,
    pub md5: Option<String>,
}

/// Response from the chunk URI with `fmt=json`.
#[derive(Debug, Deserialize)]
pub struct UploadConfirmResponse {
    #[serde(default)]
    pub value: Vec<UploadResult>,
    #[serde(default)]
    pub error: bool,
    #[serde(rename = "errorMessage", default)]
    pub error_message: Option<String>,
}

/// Folder template metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FolderTemplate {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "url")]
    pub url: Option<String>,
    #[serde(rename = "odata.metadata")]
    pub odata_metadata: Option<String>,
    #[serde(rename = "odata.type")]
    pub odata_type: Option<String>,
}

/// Response from `FolderTemplates`.
#[derive(Debug, Deserialize)]
pub struct FolderTemplateListResponse {
    #[serde(default)]
    pub value: Vec<FolderTemplate>,
}

/// OAuth2 token response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub subdomain: Option<String>,
    #[serde(default)]
    pub apicp: Option<String>,
    #[serde(default)]
    pub appcp: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub h: Option<String>,
}

/// Account routing details from the last login, without the token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginInfo {
    pub subdomain: Option<String>,
    pub apicp: Option<String>,
    pub appcp: Option<String>,
}

impl From<&TokenResponse> for LoginInfo {
    fn from(response: &TokenResponse) -> Self {
        Self {
            subdomain: response.subdomain.clone(),
            apicp: response.apicp.clone(),
            appcp: response.appcp.clone(),
        }
    }
}

/// ShareFile OData error body.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub code: Option<String>,
    pub message: ApiErrorMessage,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorMessage {
    #[serde(default)]
    pub lang: Option<String>,
    pub value: String,
}
