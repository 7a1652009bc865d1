//! Compute Engine v1 REST client.

use reqwest::Url;

use crate::address::AddressScope;
use crate::compute::{AddressPage, ComputeApi, Operation, OperationScope};
use crate::error::Result;

use super::http::{join_url, GcpHttp};

/// Default Compute Engine v1 endpoint.
pub const COMPUTE_BASE: &str = "https://compute.googleapis.com/compute/v1";

/// Resource URLs of the Compute Engine v1 API.
#[derive(Debug, Clone)]
pub struct ComputeUrls {
    base: String,
}

impl Default for ComputeUrls {
    fn default() -> Self {
        Self::new(COMPUTE_BASE)
    }
}

impl ComputeUrls {
    /// Creates URL builders rooted at `base`.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn project(&self, project: &str, rest: &[&str]) -> Result<Url> {
        let mut segments = vec!["projects", project];
        segments.extend_from_slice(rest);
        join_url(&self.base, &segments)
    }

    /// `aggregated/addresses` of a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn aggregated_addresses(&self, project: &str) -> Result<Url> {
        self.project(project, &["aggregated", "addresses"])
    }

    /// A global or regional address.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn address(&self, project: &str, scope: &AddressScope, name: &str) -> Result<Url> {
        match scope {
            AddressScope::Global => self.project(project, &["global", "addresses", name]),
            AddressScope::Regional(region) => {
                self.project(project, &["regions", region.as_str(), "addresses", name])
            }
        }
    }

    /// A global or regional forwarding rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn forwarding_rule(&self, project: &str, scope: &AddressScope, name: &str) -> Result<Url> {
        match scope {
            AddressScope::Global => self.project(project, &["global", "forwardingRules", name]),
            AddressScope::Regional(region) => {
                self.project(project, &["regions", region.as_str(), "forwardingRules", name])
            }
        }
    }

    /// A zonal instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn instance(&self, project: &str, zone: &str, name: &str) -> Result<Url> {
        self.project(project, &["zones", zone, "instances", name])
    }

    /// A regional router.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn router(&self, project: &str, region: &str, name: &str) -> Result<Url> {
        self.project(project, &["regions", region, "routers", name])
    }

    /// A global, regional, or zonal operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn operation(&self, project: &str, scope: &OperationScope, name: &str) -> Result<Url> {
        match scope {
            OperationScope::Global => self.project(project, &["global", "operations", name]),
            OperationScope::Region(region) => {
                self.project(project, &["regions", region.as_str(), "operations", name])
            }
            OperationScope::Zone(zone) => {
                self.project(project, &["zones", zone.as_str(), "operations", name])
            }
        }
    }
}

/// [`ComputeApi`] over the Compute Engine v1 REST API.
#[derive(Debug)]
pub struct RestCompute<'a> {
    http: &'a GcpHttp,
    urls: ComputeUrls,
}

impl<'a> RestCompute<'a> {
    /// Creates a client against the default endpoint.
    #[must_use]
    pub fn new(http: &'a GcpHttp) -> Self {
        Self::with_urls(http, ComputeUrls::default())
    }

    /// Creates a client against a custom endpoint.
    #[must_use]
    pub fn with_urls(http: &'a GcpHttp, urls: ComputeUrls) -> Self {
        Self { http, urls }
    }
}

impl ComputeApi for RestCompute<'_> {
    fn list_addresses(&self, project: &str, page_token: Option<&str>) -> Result<AddressPage> {
        let url = self.urls.aggregated_addresses(project)?;
        match page_token {
            Some(token) => self.http.get_json(&url, &[("pageToken", token)]),
            None => self.http.get_json(&url, &[]),
        }
    }

    fn delete_address(&self, project: &str, scope: &AddressScope, name: &str) -> Result<Operation> {
        self.http
            .delete_json(&self.urls.address(project, scope, name)?)
    }

    fn delete_forwarding_rule(
        &self,
        project: &str,
        scope: &AddressScope,
        name: &str,
    ) -> Result<Operation> {
        self.http
            .delete_json(&self.urls.forwarding_rule(project, scope, name)?)
    }

    fn delete_instance(&self, project: &str, zone: &str, name: &str) -> Result<Operation> {
        self.http
            .delete_json(&self.urls.instance(project, zone, name)?)
    }

    fn delete_router(&self, project: &str, region: &str, name: &str) -> Result<Operation> {
        self.http
            .delete_json(&self.urls.router(project, region, name)?)
    }

    fn get_operation(
        &self,
        project: &str,
        scope: &OperationScope,
        name: &str,
    ) -> Result<Operation> {
        self.http
            .get_json(&self.urls.operation(project, scope, name)?, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> ComputeUrls {
        ComputeUrls::default()
    }

    #[test]
    fn test_aggregated_addresses_url() {
        assert_eq!(
            urls().aggregated_addresses("proj-1").unwrap().as_str(),
            "https://compute.googleapis.com/compute/v1/projects/proj-1/aggregated/addresses"
        );
    }

    #[test]
    fn test_address_urls() {
        assert_eq!(
            urls()
                .address("p", &AddressScope::Global, "ip-a")
                .unwrap()
                .path(),
            "/compute/v1/projects/p/global/addresses/ip-a"
        );
        assert_eq!(
            urls()
                .address("p", &AddressScope::Regional("us-central1".into()), "ip-b")
                .unwrap()
                .path(),
            "/compute/v1/projects/p/regions/us-central1/addresses/ip-b"
        );
    }

    #[test]
    fn test_consumer_urls() {
        assert_eq!(
            urls()
                .forwarding_rule("p", &AddressScope::Regional("us-central1".into()), "fr-1")
                .unwrap()
                .path(),
            "/compute/v1/projects/p/regions/us-central1/forwardingRules/fr-1"
        );
        assert_eq!(
            urls()
                .forwarding_rule("p", &AddressScope::Global, "fr-g")
                .unwrap()
                .path(),
            "/compute/v1/projects/p/global/forwardingRules/fr-g"
        );
        assert_eq!(
            urls().instance("p", "us-east1-b", "vm-1").unwrap().path(),
            "/compute/v1/projects/p/zones/us-east1-b/instances/vm-1"
        );
        assert_eq!(
            urls().router("p", "us-west1", "nat").unwrap().path(),
            "/compute/v1/projects/p/regions/us-west1/routers/nat"
        );
    }

    #[test]
    fn test_operation_urls() {
        assert_eq!(
            urls()
                .operation("p", &OperationScope::Global, "op-1")
                .unwrap()
                .path(),
            "/compute/v1/projects/p/global/operations/op-1"
        );
        assert_eq!(
            urls()
                .operation("p", &OperationScope::Region("us-east1".into()), "op-2")
                .unwrap()
                .path(),
            "/compute/v1/projects/p/regions/us-east1/operations/op-2"
        );
        assert_eq!(
            urls()
                .operation("p", &OperationScope::Zone("us-east1-c".into()), "op-3")
                .unwrap()
                .path(),
            "/compute/v1/projects/p/zones/us-east1-c/operations/op-3"
        );
    }

    #[test]
    fn test_custom_base() {
        let urls = ComputeUrls::new("http://127.0.0.1:8080/compute/v1");
        assert_eq!(
            urls.aggregated_addresses("p").unwrap().as_str(),
            "http://127.0.0.1:8080/compute/v1/projects/p/aggregated/addresses"
        );
    }
}
