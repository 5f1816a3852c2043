//! ShareFile session: authentication entry point and item factory.

use std::time::SystemTime;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::auth::{AuthorizationContext, Authenticator};
use crate::config::{ClientConfig, Credentials};
use crate::error::{ensure_success, Result};
use crate::item::Item;
use crate::item_id::is_item_id;
use crate::models::{FolderTemplate, FolderTemplateListResponse, LoginInfo};

/// Item aliases reserved by the API in place of an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialFolder {
    /// The user's home folder.
    Home,
    /// Parent of the favorite folders.
    Favorites,
    /// Parent of the shared folders.
    AllShared,
    /// Parent of the connectors.
    Connectors,
    /// The FileBox folder.
    Box,
    /// Root above home, favorites, shared folders and connectors.
    Top,
}

impl SpecialFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialFolder::Home => "home",
            SpecialFolder::Favorites => "favorites",
            SpecialFolder::AllShared => "allshared",
            SpecialFolder::Connectors => "connectors",
            SpecialFolder::Box => "box",
            SpecialFolder::Top => "top",
        }
    }
}

impl std::str::FromStr for SpecialFolder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Ok(SpecialFolder::Home),
            "favorites" => Ok(SpecialFolder::Favorites),
            "allshared" => Ok(SpecialFolder::AllShared),
            "connectors" => Ok(SpecialFolder::Connectors),
            "box" => Ok(SpecialFolder::Box),
            "top" => Ok(SpecialFolder::Top),
            other => Err(format!("unknown special folder: {}", other)),
        }
    }
}

/// Client for a ShareFile account.
///
/// Every call obtains a fresh authorization context first, logging in
/// again when the token has expired. Items handed out keep the context
/// they were created with.
pub struct ShareFileClient {
    auth: Authenticator,
    http: Client,
    api_base: String,
}

impl ShareFileClient {
    /// Create a client for the default ShareFile hosts.
    ///
    /// Fails if any credential field is empty. No request is made until
    /// the first call.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let http = Client::new();
        let api_base = config.api_base(&credentials.subdomain);
        let auth = Authenticator::new(credentials, &config, http.clone())?;

        Ok(Self {
            auth,
            http,
            api_base,
        })
    }

    /// Base URL of the v3 API, without a trailing slash.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.auth
    }

    /// Log in now and return the new access token.
    pub async fn authenticate(&self) -> Result<String> {
        self.auth.authenticate().await
    }

    pub async fn is_token_expired(&self) -> bool {
        self.auth.is_token_expired().await
    }

    pub async fn token_expires_at(&self) -> Option<SystemTime> {
        self.auth.token_expires_at().await
    }

    pub async fn login_info(&self) -> Option<LoginInfo> {
        self.auth.login_info().await
    }

    pub async fn authorization_context(&self) -> Result<AuthorizationContext> {
        self.auth.authorization_context().await
    }

    /// Fetch an item by id or by path, depending on the identifier's shape.
    pub async fn items(&self, identifier: &str) -> Result<Item> {
        if is_item_id(identifier) {
            self.item_by_id(identifier).await
        } else {
            self.items_by_path(identifier).await
        }
    }

    /// Fetch `Items(<id>)` without classifying `id`.
    pub async fn item_by_id(&self, id: &str) -> Result<Item> {
        let url = format!("{}/Items({})", self.api_base, id);
        self.fetch_item(&url, &[]).await
    }

    /// Fetch the item at a `/folder/folder/file` virtual path.
    ///
    /// Redirects issued for symbolic links are followed by the transport.
    pub async fn items_by_path(&self, path: &str) -> Result<Item> {
        let url = format!("{}/Items/ByPath", self.api_base);
        self.fetch_item(&url, &[("path", path)]).await
    }

    pub async fn special_item(&self, folder: SpecialFolder) -> Result<Item> {
        self.item_by_id(folder.as_str()).await
    }

    pub async fn list_folder_templates(&self) -> Result<Vec<FolderTemplate>> {
        let context = self.auth.authorization_context().await?;
        let url = format!("{}/FolderTemplates", self.api_base);

        debug!(url = %url, "Listing folder templates");

        let response = context.apply(self.http.get(&url)).send().await?;
        let response = ensure_success(response).await?;
        let list: FolderTemplateListResponse = response.json().await?;
        Ok(list.value)
    }

    pub async fn get_folder_template(&self, id: &str) -> Result<FolderTemplate> {
        let context = self.auth.authorization_context().await?;
        let url = format!("{}/FolderTemplates({})", self.api_base, id);

        debug!(url = %url, "Fetching folder template");

        let response = context.apply(self.http.get(&url)).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    async fn fetch_item(&self, url: &str, query: &[(&str, &str)]) -> Result<Item> {
        let context = self.auth.authorization_context().await?;

        debug!(url = %url, "Fetching item");

        let response = context
            .apply(self.http.get(url))
            .query(query)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let data: Value = response.json().await?;

        Item::from_value(data, context, self.http.clone())
    }
}
