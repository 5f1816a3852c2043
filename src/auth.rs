//! OAuth2 password-grant authentication and access-token lifecycle.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use reqwest::{Client, RequestBuilder};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::config::{ClientConfig, Credentials};
use crate::error::{ensure_success, Result};
use crate::models::{LoginInfo, TokenResponse};

/// Bearer credential attached to authenticated requests.
///
/// Captured once per top-level call; holders never refresh it.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationContext {
    access_token: String,
}

impl AuthorizationContext {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.access_token)
    }
}

impl std::fmt::Debug for AuthorizationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthorizationContext(Bearer <redacted>)")
    }
}

/// Access token with its absolute expiry.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: SystemTime,
    login: LoginInfo,
}

/// Owns the credentials and the token state of one session.
///
/// Cloning shares the token state.
#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<Credentials>,
    token_url: String,
    expiry_margin: Duration,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    // Serializes refreshes triggered by `authorization_context`.
    refresh_lock: Arc<Mutex<()>>,
}

impl Authenticator {
    /// Create an authenticator, failing if any credential field is empty.
    pub fn new(credentials: Credentials, config: &ClientConfig, client: Client) -> Result<Self> {
        credentials.validate()?;

        Ok(Self {
            token_url: config.token_endpoint(&credentials.subdomain),
            expiry_margin: config.expiry_margin,
            credentials: Arc::new(credentials),
            client,
            cached_token: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Log in with the stored credentials and replace the token state.
    ///
    /// Always performs a full login; failures are returned as-is.
    pub async fn authenticate(&self) -> Result<String> {
        let params = [
            ("grant_type", "password"),
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ];

        debug!(url = %self.token_url, username = %self.credentials.username, "Requesting access token");

        let response = self
            .client
            .post(&self.token_url)
            .header("Accept-Encoding", "identity")
            .form(&params)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let token_response: TokenResponse = response.json().await?;

        let expires_at = expiry_after(SystemTime::now(), token_response.expires_in);

        info!(
            subdomain = token_response.subdomain.as_deref().unwrap_or(self.credentials.subdomain.as_str()),
            expires_in = token_response.expires_in,
            "Authenticated with ShareFile"
        );

        let token = CachedToken {
            access_token: token_response.access_token.clone(),
            expires_at,
            login: LoginInfo::from(&token_response),
        };

        {
            let mut cached = self.cached_token.write().await;
            *cached = Some(token);
        }

        Ok(token_response.access_token)
    }

    /// True if no token was obtained yet or its expiry has been reached.
    pub async fn is_token_expired(&self) -> bool {
        let cached = self.cached_token.read().await;
        self.valid_token(cached.as_ref()).is_none()
    }

    /// Absolute expiry of the current token, if any.
    pub async fn token_expires_at(&self) -> Option<SystemTime> {
        self.cached_token
            .read()
            .await
            .as_ref()
            .map(|token| token.expires_at)
    }

    /// Routing details returned by the last login.
    pub async fn login_info(&self) -> Option<LoginInfo> {
        self.cached_token
            .read()
            .await
            .as_ref()
            .map(|token| token.login.clone())
    }

    /// Return a bearer context, logging in first when the token is missing
    /// or expired.
    ///
    /// Concurrent callers that find the token expired wait on one another,
    /// so a single login serves all of them.
    pub async fn authorization_context(&self) -> Result<AuthorizationContext> {
        if let Some(context) = self.current_context().await {
            return Ok(context);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(context) = self.current_context().await {
            return Ok(context);
        }

        debug!("Access token missing or expired, re-authenticating");
        let access_token = self.authenticate().await?;
        Ok(AuthorizationContext::new(access_token))
    }

    async fn current_context(&self) -> Option<AuthorizationContext> {
        let cached = self.cached_token.read().await;
        self.valid_token(cached.as_ref())
            .map(|token| AuthorizationContext::new(token.access_token.clone()))
    }

    fn valid_token<'a>(&self, token: Option<&'a CachedToken>) -> Option<&'a CachedToken> {
        // A margin past the end of representable time expires everything.
        let deadline = SystemTime::now().checked_add(self.expiry_margin)?;
        token.filter(|token| deadline < token.expires_at)
    }
}

/// Longest token lifetime honoured; larger `expires_in` values are clamped.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Absolute expiry for a lifetime of `expires_in` seconds from `now`.
fn expiry_after(now: SystemTime, expires_in: u64) -> SystemTime {
    let lifetime = Duration::from_secs(expires_in).min(MAX_TOKEN_LIFETIME);
    now.checked_add(lifetime).unwrap_or(now)
}
