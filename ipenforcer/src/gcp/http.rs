//! Authenticated JSON requests.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};

use super::auth::TokenProvider;

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Builds an [`Error::Api`] from a failed response body.
///
/// Google APIs wrap failures in `{"error": {"message": ...}}`; anything else
/// is passed through verbatim.
#[must_use]
pub fn api_error(url: &str, status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    Error::Api {
        url: url.to_string(),
        status,
        message,
    }
}

/// Builds a URL from a base and individually escaped path segments.
///
/// # Errors
///
/// Returns a validation error if `base` is not an absolute URL.
pub fn join_url(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| Error::Validation {
        field: "url".into(),
        message: format!("invalid base URL {base}: {e}"),
    })?;
    url.path_segments_mut()
        .map_err(|()| Error::Validation {
            field: "url".into(),
            message: format!("base URL {base} cannot carry a path"),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// A blocking HTTP client that attaches bearer tokens.
#[derive(Debug)]
pub struct GcpHttp {
    client: Client,
    tokens: TokenProvider,
}

impl GcpHttp {
    /// Creates a client around an existing transport.
    #[must_use]
    pub fn new(client: Client, tokens: TokenProvider) -> Self {
        Self { client, tokens }
    }

    /// Creates a client with the default transport and ambient credentials.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let tokens = TokenProvider::from_env(client.clone());
        Ok(Self::new(client, tokens))
    }

    fn send(&self, url: &Url, request: RequestBuilder) -> Result<String> {
        let response = request.bearer_auth(self.tokens.token()?).send()?;
        let status = response.status();
        let body = response.text()?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(api_error(url.as_str(), status.as_u16(), &body))
        }
    }

    /// Issues a GET and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or an
    /// undecodable body.
    pub fn get_json<T: DeserializeOwned>(&self, url: &Url, query: &[(&str, &str)]) -> Result<T> {
        log::debug!("GET {url}");
        let body = self.send(url, self.client.get(url.clone()).query(query))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Issues a GET and returns the raw body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-success status.
    pub fn get_text(&self, url: &Url, query: &[(&str, &str)]) -> Result<String> {
        log::debug!("GET {url}");
        self.send(url, self.client.get(url.clone()).query(query))
    }

    /// Issues a DELETE and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or an
    /// undecodable body.
    pub fn delete_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        log::debug!("DELETE {url}");
        let body = self.send(url, self.client.delete(url.clone()))?;
        Ok(serde_json::from_str(&body)?)
    }
}
