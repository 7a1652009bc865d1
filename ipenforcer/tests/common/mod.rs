//! Common test utilities for integration tests.
//!
//! This module provides an in-memory compute API that records every call it
//! receives, plus fixture builders for address listings and project sources.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use ipenforcer::compute::{
    AddressPage, ComputeApi, Operation, OperationScope, RawAddress, ScopedAddresses,
};
use ipenforcer::selection::{ExclusionSource, ProjectSource};
use ipenforcer::{AddressScope, Error, Result};

const COMPUTE: &str = "https://www.googleapis.com/compute/v1/projects";

/// Returns the URL of a regional forwarding rule.
#[allow(dead_code)]
pub fn forwarding_rule_url(project: &str, region: &str, name: &str) -> String {
    format!("{COMPUTE}/{project}/regions/{region}/forwardingRules/{name}")
}

/// Returns the URL of a global forwarding rule.
#[allow(dead_code)]
pub fn global_forwarding_rule_url(project: &str, name: &str) -> String {
    format!("{COMPUTE}/{project}/global/forwardingRules/{name}")
}

/// Returns the URL of an instance.
#[allow(dead_code)]
pub fn instance_url(project: &str, zone: &str, name: &str) -> String {
    format!("{COMPUTE}/{project}/zones/{zone}/instances/{name}")
}

/// Returns the URL of a router.
#[allow(dead_code)]
pub fn router_url(project: &str, region: &str, name: &str) -> String {
    format!("{COMPUTE}/{project}/regions/{region}/routers/{name}")
}

/// Builds a global external address as the API lists it.
#[allow(dead_code)]
pub fn global_address(name: &str, status: &str, users: &[String]) -> RawAddress {
    RawAddress {
        name: name.to_string(),
        address: Some(format!("198.51.100.{}", name.len())),
        status: status.to_string(),
        region: None,
        address_type: Some("EXTERNAL".into()),
        users: users.to_vec(),
    }
}

/// Builds a regional external address as the API lists it.
#[allow(dead_code)]
pub fn regional_address(name: &str, region: &str, status: &str, users: &[String]) -> RawAddress {
    RawAddress {
        region: Some(format!("{COMPUTE}/p/regions/{region}")),
        address: Some(format!("203.0.113.{}", name.len())),
        ..global_address(name, status, users)
    }
}

/// Marks an address as internal.
#[allow(dead_code)]
pub fn internal(mut raw: RawAddress) -> RawAddress {
    raw.address_type = Some("INTERNAL".into());
    raw
}

fn scope_key(raw: &RawAddress) -> String {
    match raw.region.as_deref().and_then(|url| url.rsplit('/').next()) {
        Some(region) => format!("regions/{region}"),
        None => "global".to_string(),
    }
}

/// Groups addresses into one aggregated listing page.
#[allow(dead_code)]
pub fn page(addresses: Vec<RawAddress>, next_page_token: Option<&str>) -> AddressPage {
    let mut page = AddressPage {
        next_page_token: next_page_token.map(str::to_string),
        ..AddressPage::default()
    };
    for raw in addresses {
        page.items
            .entry(scope_key(&raw))
            .or_insert_with(|| ScopedAddresses {
                addresses: Some(Vec::new()),
                warning: None,
            })
            .addresses
            .get_or_insert_with(Vec::new)
            .push(raw);
    }
    page
}

/// One call received by [`FakeCompute`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Call {
    List {
        project: String,
        token: Option<String>,
    },
    DeleteAddress {
        project: String,
        scope: AddressScope,
        name: String,
    },
    DeleteForwardingRule {
        project: String,
        scope: AddressScope,
        name: String,
    },
    DeleteInstance {
        project: String,
        zone: String,
        name: String,
    },
    DeleteRouter {
        project: String,
        region: String,
        name: String,
    },
    Poll {
        project: String,
        scope: OperationScope,
        operation: String,
        done: bool,
    },
}

impl Call {
    /// Returns true for delete requests.
    #[allow(dead_code)]
    pub fn is_delete(&self) -> bool {
        !matches!(self, Self::List { .. } | Self::Poll { .. })
    }

    /// Returns the project the call targeted.
    #[allow(dead_code)]
    pub fn project(&self) -> &str {
        match self {
            Self::List { project, .. }
            | Self::DeleteAddress { project, .. }
            | Self::DeleteForwardingRule { project, .. }
            | Self::DeleteInstance { project, .. }
            | Self::DeleteRouter { project, .. }
            | Self::Poll { project, .. } => project,
        }
    }
}

/// In-memory compute API.
///
/// Every delete returns an operation named `op-<kind>-<resource>`. Operations
/// stay pending for a configurable number of polls and then complete, with
/// an error payload for resources registered through
/// [`FakeCompute::failing_operation`].
#[derive(Default)]
pub struct FakeCompute {
    pages: HashMap<String, Vec<AddressPage>>,
    failing_lists: HashSet<String>,
    failing_deletes: HashSet<String>,
    failing_operations: HashSet<String>,
    polls_before_done: usize,
    operations: Mutex<HashMap<String, (String, usize)>>,
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl FakeCompute {
    /// Creates an API with no projects. Operations complete immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists `addresses` for `project` on a single page.
    pub fn with_addresses(self, project: &str, addresses: Vec<RawAddress>) -> Self {
        self.with_pages(project, vec![addresses])
    }

    /// Lists `project` across several pages, chained with `page-<n>` tokens.
    pub fn with_pages(mut self, project: &str, pages: Vec<Vec<RawAddress>>) -> Self {
        let count = pages.len();
        let built = pages
            .into_iter()
            .enumerate()
            .map(|(i, addresses)| {
                let token = (i + 1 < count).then(|| format!("page-{}", i + 1));
                page(addresses, token.as_deref())
            })
            .collect();
        self.pages.insert(project.to_string(), built);
        self
    }

    /// Makes the address listing of `project` fail.
    pub fn failing_list(mut self, project: &str) -> Self {
        self.failing_lists.insert(project.to_string());
        self
    }

    /// Makes the delete request for resource `name` fail.
    pub fn failing_delete(mut self, name: &str) -> Self {
        self.failing_deletes.insert(name.to_string());
        self
    }

    /// Makes the delete operation of resource `name` complete with an error.
    pub fn failing_operation(mut self, name: &str) -> Self {
        self.failing_operations.insert(name.to_string());
        self
    }

    /// Keeps operations pending for `polls` status reads.
    pub fn polls_before_done(mut self, polls: usize) -> Self {
        self.polls_before_done = polls;
        self
    }

    /// Returns every call received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the delete requests received so far, in order.
    pub fn deletes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_delete).collect()
    }

    /// Returns the index of the first call matching `pred`.
    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(pred)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn issue(&self, kind: &str, name: &str) -> Result<Operation> {
        if self.failing_deletes.contains(name) {
            return Err(Error::Api {
                url: format!("fake://{kind}/{name}"),
                status: 400,
                message: format!("The resource '{name}' is not ready"),
            });
        }
        let op = format!("op-{kind}-{name}");
        self.operations
            .lock()
            .unwrap()
            .insert(op.clone(), (name.to_string(), self.polls_before_done));
        if self.polls_before_done == 0 {
            return Ok(self.complete(&op, name));
        }
        Ok(Operation::pending(op))
    }

    fn complete(&self, op: &str, resource: &str) -> Operation {
        let done = Operation::done(op);
        if self.failing_operations.contains(resource) {
            done.with_error("RESOURCE_IN_USE_BY_ANOTHER_RESOURCE", format!("{resource} is in use"))
        } else {
            done
        }
    }
}

impl ComputeApi for FakeCompute {
    fn list_addresses(&self, project: &str, page_token: Option<&str>) -> Result<AddressPage> {
        self.record(Call::List {
            project: project.to_string(),
            token: page_token.map(str::to_string),
        });
        if self.failing_lists.contains(project) {
            return Err(Error::Api {
                url: format!("fake://{project}/aggregated/addresses"),
                status: 403,
                message: "Required 'compute.addresses.list' permission".into(),
            });
        }
        let index = match page_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(usize::MAX),
        };
        Ok(self
            .pages
            .get(project)
            .and_then(|pages| pages.get(index))
            .cloned()
            .unwrap_or_default())
    }

    fn delete_address(
        &self,
        project: &str,
        scope: &AddressScope,
        name: &str,
    ) -> Result<Operation> {
        self.record(Call::DeleteAddress {
            project: project.to_string(),
            scope: scope.clone(),
            name: name.to_string(),
        });
        self.issue("address", name)
    }

    fn delete_forwarding_rule(
        &self,
        project: &str,
        scope: &AddressScope,
        name: &str,
    ) -> Result<Operation> {
        self.record(Call::DeleteForwardingRule {
            project: project.to_string(),
            scope: scope.clone(),
            name: name.to_string(),
        });
        self.issue("forwarding-rule", name)
    }

    fn delete_instance(&self, project: &str, zone: &str, name: &str) -> Result<Operation> {
        self.record(Call::DeleteInstance {
            project: project.to_string(),
            zone: zone.to_string(),
            name: name.to_string(),
        });
        self.issue("instance", name)
    }

    fn delete_router(&self, project: &str, region: &str, name: &str) -> Result<Operation> {
        self.record(Call::DeleteRouter {
            project: project.to_string(),
            region: region.to_string(),
            name: name.to_string(),
        });
        self.issue("router", name)
    }

    fn get_operation(
        &self,
        project: &str,
        scope: &OperationScope,
        name: &str,
    ) -> Result<Operation> {
        let (resource, finished) = {
            let mut operations = self.operations.lock().unwrap();
            match operations.get_mut(name) {
                Some((resource, remaining)) => {
                    *remaining = remaining.saturating_sub(1);
                    (resource.clone(), *remaining == 0)
                }
                None => (String::new(), true),
            }
        };
        self.record(Call::Poll {
            project: project.to_string(),
            scope: scope.clone(),
            operation: name.to_string(),
            done: finished,
        });
        if !finished {
            return Ok(Operation::pending(name));
        }
        Ok(self.complete(name, &resource))
    }
}

/// Folder listings served from memory.
#[derive(Default)]
#[allow(dead_code)]
pub struct StaticProjects {
    folders: HashMap<String, Vec<String>>,
}

#[allow(dead_code)]
impl StaticProjects {
    /// Registers the projects of a folder.
    pub fn with_folder(mut self, folder: &str, projects: &[&str]) -> Self {
        self.folders.insert(
            folder.to_string(),
            projects.iter().map(|p| (*p).to_string()).collect(),
        );
        self
    }
}

impl ProjectSource for StaticProjects {
    fn list_folder_projects(&self, folder_id: &str) -> Result<Vec<String>> {
        self.folders
            .get(folder_id)
            .cloned()
            .ok_or_else(|| Error::Api {
                url: format!("fake://folders/{folder_id}"),
                status: 404,
                message: "folder not found".into(),
            })
    }
}

/// Storage objects served from memory, keyed by `bucket/object`.
#[derive(Default)]
#[allow(dead_code)]
pub struct StaticObjects {
    objects: HashMap<String, String>,
}

#[allow(dead_code)]
impl StaticObjects {
    /// Registers an object.
    pub fn with_object(mut self, bucket: &str, object: &str, body: &str) -> Self {
        self.objects
            .insert(format!("{bucket}/{object}"), body.to_string());
        self
    }
}

impl ExclusionSource for StaticObjects {
    fn fetch_object(&self, bucket: &str, object: &str) -> Result<String> {
        self.objects
            .get(&format!("{bucket}/{object}"))
            .cloned()
            .ok_or_else(|| Error::Api {
                url: format!("fake://{bucket}/{object}"),
                status: 404,
                message: "No such object".into(),
            })
    }
}
