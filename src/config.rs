//! Credentials and endpoint configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShareFileError};

/// Default API host suffix; the account subdomain is prepended.
const API_HOST: &str = "sf-api.com";

/// Default OAuth host suffix; the account subdomain is prepended.
const AUTH_HOST: &str = "sharefile.com";

/// Environment variables read by [`Credentials::from_env`].
pub const ENV_SUBDOMAIN: &str = "SHAREFILE_SUBDOMAIN";
pub const ENV_CLIENT_ID: &str = "SHAREFILE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SHAREFILE_CLIENT_SECRET";
pub const ENV_USERNAME: &str = "SHAREFILE_USERNAME";
pub const ENV_PASSWORD: &str = "SHAREFILE_PASSWORD";

/// Password-grant credentials for a ShareFile account.
///
/// Missing keys in a credentials file deserialize to empty strings so that
/// [`Credentials::validate`] can name the absent field.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    pub subdomain: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("subdomain", &self.subdomain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(
        subdomain: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            subdomain: subdomain.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Load credentials from a JSON file with camelCase keys.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let credentials: Credentials = serde_json::from_str(&content)?;
        credentials.validate()?;
        Ok(credentials)
    }

    /// Load credentials from the `SHAREFILE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        let credentials = Self {
            subdomain: var(ENV_SUBDOMAIN),
            client_id: var(ENV_CLIENT_ID),
            client_secret: var(ENV_CLIENT_SECRET),
            username: var(ENV_USERNAME),
            password: var(ENV_PASSWORD),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Fail with the first empty field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("subdomain", &self.subdomain),
            ("username", &self.username),
            ("password", &self.password),
            ("clientId", &self.client_id),
            ("clientSecret", &self.client_secret),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ShareFileError::MissingCredential(name));
            }
        }

        Ok(())
    }
}

/// Endpoint and token-lifetime settings for a client.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Overrides `https://{subdomain}.sf-api.com/sf/v3`.
    pub api_base_url: Option<String>,
    /// Overrides `https://{subdomain}.sharefile.com/oauth/token`.
    pub token_url: Option<String>,
    /// Treat a token as expired this long before the server deadline.
    pub expiry_margin: Duration,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    pub fn with_expiry_margin(mut self, margin: Duration) -> Self {
        self.expiry_margin = margin;
        self
    }

    pub(crate) fn api_base(&self, subdomain: &str) -> String {
        match &self.api_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.{}/sf/v3", subdomain, API_HOST),
        }
    }

    pub(crate) fn token_endpoint(&self, subdomain: &str) -> String {
        match &self.token_url {
            Some(url) => url.clone(),
            None => format!("https://{}.{}/oauth/token", subdomain, AUTH_HOST),
        }
    }
}
