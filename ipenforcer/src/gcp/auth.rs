//! Access tokens and instance metadata.
//!
//! Production runs execute on a VM or serverless runtime with a metadata
//! server; local runs can pass a token through `IPENFORCER_ACCESS_TOKEN`.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Environment variable holding a static bearer token.
pub const ENV_ACCESS_TOKEN: &str = "IPENFORCER_ACCESS_TOKEN";

/// Base URL of the metadata server.
pub const METADATA_BASE: &str = "http://metadata.google.internal/computeMetadata/v1";

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Client for the instance metadata server.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    client: Client,
    base: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

impl MetadataClient {
    /// Creates a client for the default metadata server.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base(client, METADATA_BASE)
    }

    /// Creates a client for a metadata server at `base`.
    #[must_use]
    pub fn with_base(client: Client, base: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    fn get(&self, path: &str) -> Result<String> {
        let url = format!("{}/{path}", self.base);
        let response = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .map_err(|e| Error::Auth {
                reason: format!("metadata server unreachable at {url}: {e}"),
            })?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(Error::Api {
                url,
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(body)
    }

    /// Reads the id of the project the process runs in.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata server is unreachable or answers with
    /// a non-success status.
    pub fn project_id(&self) -> Result<String> {
        let id = self.get("project/project-id")?.trim().to_string();
        if id.is_empty() {
            return Err(Error::Auth {
                reason: "metadata server returned an empty project id".into(),
            });
        }
        Ok(id)
    }

    fn access_token(&self) -> Result<(String, Duration)> {
        let body = self.get("instance/service-accounts/default/token")?;
        let token: TokenResponse = serde_json::from_str(&body)?;
        Ok((token.access_token, Duration::from_secs(token.expires_in)))
    }
}

/// Reads the id of the project the process runs in from the metadata server.
///
/// # Errors
///
/// Returns an error if the metadata server cannot be queried.
pub fn metadata_project_id() -> Result<String> {
    MetadataClient::new(Client::new()).project_id()
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

#[derive(Debug)]
enum TokenSource {
    Static(String),
    Metadata(MetadataClient),
}

/// Supplies bearer tokens for API requests.
///
/// Metadata tokens are cached until shortly before they expire.
#[derive(Debug)]
pub struct TokenProvider {
    source: TokenSource,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Creates a provider that always hands out `token`.
    #[must_use]
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Static(token.into()),
            cached: Mutex::new(None),
        }
    }

    /// Creates a provider backed by the metadata server.
    #[must_use]
    pub fn metadata(client: MetadataClient) -> Self {
        Self {
            source: TokenSource::Metadata(client),
            cached: Mutex::new(None),
        }
    }

    /// Uses `IPENFORCER_ACCESS_TOKEN` when set, the metadata server otherwise.
    #[must_use]
    pub fn from_env(client: Client) -> Self {
        match std::env::var(ENV_ACCESS_TOKEN) {
            Ok(token) if !token.trim().is_empty() => {
                log::debug!("using static access token from {ENV_ACCESS_TOKEN}");
                Self::fixed(token.trim())
            }
            _ => Self::metadata(MetadataClient::new(client)),
        }
    }

    /// Returns a valid bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] or a transport error if a fresh token cannot
    /// be obtained.
    pub fn token(&self) -> Result<String> {
        let metadata = match &self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::Metadata(metadata) => metadata,
        };

        let mut cached = self
            .cached
            .lock()
            .map_err(|_| Error::Auth {
                reason: "token cache poisoned".into(),
            })?;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let (value, lifetime) = metadata.access_token()?;
        log::debug!("refreshed access token expires_in={}s", lifetime.as_secs());
        *cached = Some(CachedToken {
            value: value.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        });
        Ok(value)
    }
}
