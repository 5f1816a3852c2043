//! Remote file/folder snapshot with navigation, mutation and transfer calls.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::auth::AuthorizationContext;
use crate::download::{is_empty_payload, non_empty, DownloadSpecification};
use crate::error::{ensure_success, Result, ShareFileError};
use crate::item_id::extract_item_id;
use crate::models::{ChildrenResponse, ItemModel, ItemRef, UploadResult, FILE_TYPE, FOLDER_TYPE};
use crate::upload::UploadSpecification;

/// A file or folder fetched from the API.
///
/// The authorization context is bound at construction and used for every
/// call made through this item.
#[derive(Debug, Clone)]
pub struct Item {
    model: ItemModel,
    auth: AuthorizationContext,
    http: Client,
}

/// Partial update payload for [`Item::update`].
///
/// Only fields set to `Some` are sent and verified.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ItemRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_created_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_modified_date: Option<String>,
}

impl ItemPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn parent_id(mut self, id: impl Into<String>) -> Self {
        self.parent = Some(ItemRef {
            id: Some(id.into()),
            ..Default::default()
        });
        self
    }

    pub fn expiration_date(mut self, date: impl Into<String>) -> Self {
        self.expiration_date = Some(date.into());
        self
    }

    pub fn expiration_days(mut self, days: i64) -> Self {
        self.expiration_days = Some(days);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.is_hidden = Some(hidden);
        self
    }

    pub fn client_created_date(mut self, date: impl Into<String>) -> Self {
        self.client_created_date = Some(date.into());
        self
    }

    pub fn client_modified_date(mut self, date: impl Into<String>) -> Self {
        self.client_modified_date = Some(date.into());
        self
    }

    /// Check that every requested field came back unchanged in `updated`.
    fn verify(&self, updated: &ItemModel) -> Result<()> {
        check("Name", &self.name, &updated.name)?;
        check("FileName", &self.file_name, &updated.file_name)?;
        check("Description", &self.description, &updated.description)?;
        check("ExpirationDate", &self.expiration_date, &updated.expiration_date)?;
        check("ExpirationDays", &self.expiration_days, &updated.expiration_days)?;
        check("IsHidden", &self.is_hidden, &updated.is_hidden)?;
        check(
            "ClientCreatedDate",
            &self.client_created_date,
            &updated.client_created_date,
        )?;
        check(
            "ClientModifiedDate",
            &self.client_modified_date,
            &updated.client_modified_date,
        )?;

        if let Some(requested) = &self.parent {
            let actual = updated.parent.clone().unwrap_or_default();
            check("Parent", &requested.id, &actual.id)?;
            check("Parent", &requested.url, &actual.url)?;
            check("Parent", &requested.odata_metadata, &actual.odata_metadata)?;
            check("Parent", &requested.odata_type, &actual.odata_type)?;
        }

        Ok(())
    }
}

fn check<T: PartialEq>(
    field: &'static str,
    requested: &Option<T>,
    actual: &Option<T>,
) -> Result<()> {
    match requested {
        Some(value) if actual.as_ref() != Some(value) => {
            Err(ShareFileError::UpdateRejected { field })
        }
        _ => Ok(()),
    }
}

impl Item {
    /// Build from a raw item payload, rejecting empty bodies and payloads
    /// without a `url`.
    pub fn from_value(data: Value, auth: AuthorizationContext, http: Client) -> Result<Self> {
        if is_empty_payload(&data) {
            return Err(ShareFileError::EmptyResponse("item"));
        }

        let model: ItemModel = serde_json::from_value(data)?;
        Self::new(model, auth, http)
    }

    pub fn new(model: ItemModel, auth: AuthorizationContext, http: Client) -> Result<Self> {
        if non_empty(model.url.clone()).is_none() {
            return Err(ShareFileError::MissingField {
                payload: "item",
                field: "url",
            });
        }

        Ok(Self { model, auth, http })
    }

    pub fn model(&self) -> &ItemModel {
        &self.model
    }

    pub fn into_model(self) -> ItemModel {
        self.model
    }

    pub fn id(&self) -> Option<&str> {
        self.model.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.model.name.as_deref()
    }

    /// API URL of this item; always present.
    pub fn url(&self) -> &str {
        self.model.url.as_deref().unwrap_or_default()
    }

    pub fn odata_type(&self) -> Option<&str> {
        self.model.odata_type.as_deref()
    }

    pub fn is_folder(&self) -> bool {
        self.odata_type() == Some(FOLDER_TYPE)
    }

    pub fn is_file(&self) -> bool {
        self.odata_type() == Some(FILE_TYPE)
    }

    /// Id of the containing folder, taken from `Parent.Id` or parsed out of
    /// `Parent.url` when the server only sent the link.
    pub fn parent_id(&self) -> Option<String> {
        let parent = self.model.parent.as_ref()?;
        non_empty(parent.id.clone())
            .or_else(|| parent.url.as_deref().and_then(|url| extract_item_id(url).ok()))
    }

    pub fn authorization(&self) -> &AuthorizationContext {
        &self.auth
    }

    /// Wire value of a top-level field, e.g. `"FileSizeBytes"`. Absent and
    /// null fields yield `None`.
    pub fn field(&self, key: &str) -> Option<Value> {
        let value = serde_json::to_value(&self.model).ok()?;
        value.get(key).filter(|v| !v.is_null()).cloned()
    }

    fn child(&self, data: Value) -> Result<Item> {
        Item::from_value(data, self.auth.clone(), self.http.clone())
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        let request = self.auth.apply(self.http.get(url)).query(query);
        let response = request.send().await?;
        ensure_success(response).await
    }

    fn download_query(
        redirect: bool,
        include_all_versions: bool,
        include_deleted: bool,
    ) -> [(&'static str, &'static str); 3] {
        [
            ("redirect", bool_str(redirect)),
            ("includeAllVersions", bool_str(include_all_versions)),
            ("includeDeleted", bool_str(include_deleted)),
        ]
    }

    /// Download the content in one response (server redirect mode).
    pub async fn direct_download(
        &self,
        include_all_versions: bool,
        include_deleted: bool,
    ) -> Result<Vec<u8>> {
        debug!(item = ?self.id(), "Direct download");

        let query = Self::download_query(true, include_all_versions, include_deleted);
        let response = self.get(&format!("{}/Download", self.url()), &query).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Stream the content into a local file.
    ///
    /// A directory destination gets the item's file name appended. Returns
    /// the final path and the number of bytes written.
    pub async fn download_to<P: AsRef<Path>>(
        &self,
        destination: P,
        include_all_versions: bool,
        include_deleted: bool,
    ) -> Result<(PathBuf, u64)> {
        let destination = destination.as_ref();
        let final_path = if destination.is_dir() {
            let file_name = self
                .model
                .file_name
                .as_deref()
                .or(self.name())
                .or(self.id())
                .unwrap_or("download");
            destination.join(file_name)
        } else {
            destination.to_path_buf()
        };

        debug!(item = ?self.id(), path = %final_path.display(), "Streaming download");

        let query = Self::download_query(true, include_all_versions, include_deleted);
        let response = self.get(&format!("{}/Download", self.url()), &query).await?;

        let mut file = File::create(&final_path).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;

        Ok((final_path, written))
    }

    /// Request the two-phase download descriptor.
    pub async fn download_specification(
        &self,
        include_all_versions: bool,
        include_deleted: bool,
    ) -> Result<DownloadSpecification> {
        debug!(item = ?self.id(), "Requesting download specification");

        let query = Self::download_query(false, include_all_versions, include_deleted);
        let response = self.get(&format!("{}/Download", self.url()), &query).await?;
        let data: Value = response.json().await?;
        DownloadSpecification::from_value(data)
    }

    /// Fetch the containing folder.
    pub async fn parent(&self) -> Result<Item> {
        debug!(item = ?self.id(), "Fetching parent");

        let response = self.get(&format!("{}/Parent", self.url()), &[]).await?;
        let data: Value = response.json().await?;
        self.child(data)
    }

    /// Fetch the direct contents, in server order.
    pub async fn children(&self, include_deleted: bool) -> Result<Vec<Item>> {
        debug!(item = ?self.id(), include_deleted, "Fetching children");

        let response = self
            .get(
                &format!("{}/Children", self.url()),
                &[("includeDeleted", bool_str(include_deleted))],
            )
            .await?;
        let children: ChildrenResponse = response.json().await?;

        children
            .value
            .into_iter()
            .map(|data| self.child(data))
            .collect()
    }

    /// First child for which `predicate` holds.
    pub async fn child_where<F>(&self, predicate: F, include_deleted: bool) -> Result<Option<Item>>
    where
        F: Fn(&Item) -> bool,
    {
        let children = self.children(include_deleted).await?;
        Ok(children.into_iter().find(|child| predicate(child)))
    }

    /// First child whose wire field `key` equals `value`.
    ///
    /// ```no_run
    /// # async fn example(folder: sharefile::Item) -> sharefile::Result<()> {
    /// let small = folder.child_by("FileSizeBytes", 20, false).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn child_by(
        &self,
        key: &str,
        value: impl Into<Value>,
        include_deleted: bool,
    ) -> Result<Option<Item>> {
        let value = value.into();
        self.child_where(|child| child.field(key).as_ref() == Some(&value), include_deleted)
            .await
    }

    pub async fn child_by_name(&self, name: &str, include_deleted: bool) -> Result<Option<Item>> {
        self.child_where(|child| child.name() == Some(name), include_deleted)
            .await
    }

    pub async fn child_by_id(&self, id: &str, include_deleted: bool) -> Result<Option<Item>> {
        self.child_where(|child| child.id() == Some(id), include_deleted)
            .await
    }

    /// Upload `contents` as `filename` into this folder.
    ///
    /// Prepares a standard upload keeping the file name literally, then
    /// hands the bytes to the returned [`UploadSpecification`].
    pub async fn upload(
        &self,
        contents: impl Into<Vec<u8>>,
        filename: &str,
    ) -> Result<UploadResult> {
        debug!(item = ?self.id(), filename, "Preparing upload");

        let request = self
            .auth
            .apply(self.http.post(format!("{}/Upload", self.url())))
            .query(&[("method", "standard"), ("raw", "true"), ("fileName", filename)])
            .json(&json!({}));
        let response = ensure_success(request.send().await?).await?;
        let data: Value = response.json().await?;

        let specification = UploadSpecification::from_value(data, self.http.clone())?;
        specification.upload(contents).await
    }

    /// Move this item under the folder `new_parent_id`.
    pub async fn move_to(&mut self, new_parent_id: &str) -> Result<&mut Self> {
        self.update(ItemPatch::new().parent_id(new_parent_id)).await
    }

    pub async fn rename_to(&mut self, new_name: &str) -> Result<&mut Self> {
        self.update(ItemPatch::new().name(new_name)).await
    }

    /// Apply a partial update without overwrite and verify the server kept
    /// every requested value.
    ///
    /// All requested fields are verified before anything is merged: on a
    /// mismatch this item is left untouched and the offending field is
    /// named. On success every non-null field of the server response is
    /// merged into this item.
    pub async fn update(&mut self, patch: ItemPatch) -> Result<&mut Self> {
        debug!(item = ?self.id(), patch = ?patch, "Updating item");

        let request = self
            .auth
            .apply(self.http.patch(self.url()))
            .query(&[("overwrite", "false")])
            .json(&patch);
        let response = ensure_success(request.send().await?).await?;
        let data: Value = response.json().await?;

        if is_empty_payload(&data) {
            return Err(ShareFileError::EmptyResponse("item"));
        }

        let updated: ItemModel = serde_json::from_value(data.clone())?;
        if let Err(err) = patch.verify(&updated) {
            warn!(item = ?self.id(), error = %err, "Server did not apply update");
            return Err(err);
        }

        self.model = merge(&self.model, data)?;
        Ok(self)
    }
}

/// Overlay the non-null top-level fields of `incoming` onto `base`.
fn merge(base: &ItemModel, incoming: Value) -> Result<ItemModel> {
    let mut merged = serde_json::to_value(base)?;

    if let (Value::Object(target), Value::Object(source)) = (&mut merged, incoming) {
        for (key, value) in source {
            if !value.is_null() {
                target.insert(key, value);
            }
        }
    }

    Ok(serde_json::from_value(merged)?)
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.model, f)
    }
}
