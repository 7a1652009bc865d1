//! Cloud Storage JSON API object download.

use reqwest::Url;

use crate::error::Result;
use crate::selection::ExclusionSource;

use super::http::{join_url, GcpHttp};

/// Default Cloud Storage JSON API endpoint.
pub const STORAGE_BASE: &str = "https://storage.googleapis.com/storage/v1";

/// [`ExclusionSource`] over the Cloud Storage JSON API.
#[derive(Debug)]
pub struct RestStorage<'a> {
    http: &'a GcpHttp,
    base: String,
}

impl<'a> RestStorage<'a> {
    /// Creates a client against the default endpoint.
    #[must_use]
    pub fn new(http: &'a GcpHttp) -> Self {
        Self::with_base(http, STORAGE_BASE)
    }

    /// Creates a client against a custom endpoint.
    #[must_use]
    pub fn with_base(http: &'a GcpHttp, base: impl Into<String>) -> Self {
        Self {
            http,
            base: base.into(),
        }
    }

    /// Returns the metadata URL of an object; the media is fetched with
    /// `alt=media`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn object_url(&self, bucket: &str, object: &str) -> Result<Url> {
        join_url(&self.base, &["b", bucket, "o", object])
    }
}

impl ExclusionSource for RestStorage<'_> {
    fn fetch_object(&self, bucket: &str, object: &str) -> Result<String> {
        let url = self.object_url(bucket, object)?;
        let text = self.http.get_text(&url, &[("alt", "media")])?;
        log::debug!(
            "downloaded object bucket={bucket} object={object} bytes={}",
            text.len()
        );
        Ok(text)
    }
}
