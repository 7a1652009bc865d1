//! Address reservation types observed in a project's inventory.
//!
//! This module provides the records the enforcer works on: one
//! [`AddressRecord`] per reserved IP, grouped per scope into an
//! [`Inventory`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// Scope key used by the aggregated listing for global addresses.
pub const GLOBAL_SCOPE_KEY: &str = "global";

/// Partition of the address namespace an address lives in.
///
/// # Examples
///
/// ```
/// use ipenforcer::AddressScope;
///
/// let scope = AddressScope::from_scope_key("regions/us-central1").unwrap();
/// assert_eq!(scope, AddressScope::Regional("us-central1".to_string()));
/// assert_eq!(scope.scope_key(), "regions/us-central1");
/// assert_eq!(AddressScope::Global.to_string(), "global");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressScope {
    /// A global address.
    Global,
    /// A regional address in the named region.
    Regional(String),
}

impl AddressScope {
    /// Parses an aggregated-listing scope key (`global` or `regions/<name>`).
    #[must_use]
    pub fn from_scope_key(key: &str) -> Option<Self> {
        if key == GLOBAL_SCOPE_KEY {
            return Some(Self::Global);
        }
        match key.split_once('/') {
            Some(("regions", region)) if !region.is_empty() && !region.contains('/') => {
                Some(Self::Regional(region.to_string()))
            }
            _ => None,
        }
    }

    /// Returns the aggregated-listing key for this scope.
    #[must_use]
    pub fn scope_key(&self) -> String {
        match self {
            Self::Global => GLOBAL_SCOPE_KEY.to_string(),
            Self::Regional(region) => format!("regions/{region}"),
        }
    }

    /// Returns the region name for regional scopes.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Regional(region) => Some(region),
        }
    }
}

impl fmt::Display for AddressScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Regional(region) => write!(f, "{region}"),
        }
    }
}

/// Reservation status of an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressStatus {
    /// Reserved but not attached to any consumer.
    Reserved,
    /// Attached to a consumer.
    InUse,
    /// Any other status (for example `RESERVING`), carried verbatim.
    Other(String),
}

impl AddressStatus {
    /// Parses the API status string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "RESERVED" => Self::Reserved,
            "IN_USE" => Self::InUse,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AddressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserved => write!(f, "RESERVED"),
            Self::InUse => write!(f, "IN_USE"),
            Self::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// Routability of an address. Only external addresses are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressType {
    /// Externally routable.
    External,
    /// Internal to a VPC.
    Internal,
}

impl AddressType {
    /// Parses the API `addressType` field. A missing value means external.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("INTERNAL") => Self::Internal,
            _ => Self::External,
        }
    }
}

/// Kind of resource consuming an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumerKind {
    /// A global or regional forwarding rule.
    ForwardingRule,
    /// A compute instance.
    Instance,
    /// A cloud router (NAT).
    Router,
    /// Anything else, by collection name (`instanceGroups`, `targetPools`, ...).
    Other(String),
}

impl ConsumerKind {
    fn from_collection(collection: &str) -> Self {
        match collection {
            "forwardingRules" => Self::ForwardingRule,
            "instances" => Self::Instance,
            "routers" => Self::Router,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ConsumerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForwardingRule => write!(f, "forwardingRules"),
            Self::Instance => write!(f, "instances"),
            Self::Router => write!(f, "routers"),
            Self::Other(collection) => write!(f, "{collection}"),
        }
    }
}

/// Location segment of a consumer resource URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumerLocation {
    /// `.../global/<collection>/<name>`
    Global,
    /// `.../regions/<region>/<collection>/<name>`
    Region(String),
    /// `.../zones/<zone>/<collection>/<name>`
    Zone(String),
}

impl ConsumerLocation {
    /// Returns the bare location name (`global`, a region or a zone).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Global => "global",
            Self::Region(name) | Self::Zone(name) => name,
        }
    }
}

/// A reference to the resource currently using an address.
///
/// # Examples
///
/// ```
/// use ipenforcer::{ConsumerKind, ConsumerLocation, ConsumerRef};
///
/// let consumer = ConsumerRef::parse(
///     "https://www.googleapis.com/compute/v1/projects/p/zones/us-central1-a/instances/vm-1",
/// )
/// .unwrap();
/// assert_eq!(consumer.kind, ConsumerKind::Instance);
/// assert_eq!(consumer.name, "vm-1");
/// assert_eq!(consumer.location, ConsumerLocation::Zone("us-central1-a".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsumerRef {
    /// What kind of resource this is.
    pub kind: ConsumerKind,
    /// The resource name.
    pub name: String,
    /// Where the resource lives.
    pub location: ConsumerLocation,
}

impl ConsumerRef {
    /// Parses a resource URL from an address's `users` list.
    ///
    /// Returns `None` if the URL does not end in
    /// `<global|regions/R|zones/Z>/<collection>/<name>`.
    #[must_use]
    pub fn parse(url: &str) -> Option<Self> {
        let mut segments = url.trim_end_matches('/').rsplit('/');
        let name = segments.next().filter(|s| !s.is_empty())?;
        let collection = segments.next().filter(|s| !s.is_empty())?;
        let location_name = segments.next().filter(|s| !s.is_empty())?;

        let location = if location_name == "global" {
            ConsumerLocation::Global
        } else {
            match segments.next()? {
                "regions" => ConsumerLocation::Region(location_name.to_string()),
                "zones" => ConsumerLocation::Zone(location_name.to_string()),
                _ => return None,
            }
        };

        Some(Self {
            kind: ConsumerKind::from_collection(collection),
            name: name.to_string(),
            location,
        })
    }
}

impl fmt::Display for ConsumerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.location.name(), self.kind, self.name)
    }
}

/// One IP address reservation as seen in a project's inventory.
///
/// # Examples
///
/// ```
/// use ipenforcer::{AddressRecord, AddressScope, AddressStatus};
///
/// let record = AddressRecord::new("ip-b", AddressScope::Regional("us-central1".into()))
///     .with_status(AddressStatus::InUse)
///     .with_address("203.0.113.7")
///     .with_user("https://www.googleapis.com/compute/v1/projects/p/regions/us-central1/forwardingRules/fr-1");
///
/// assert_eq!(record.region(), Some("us-central1"));
/// assert_eq!(record.users.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRecord {
    /// The reservation name.
    pub name: String,
    /// The IP address itself.
    pub address: String,
    /// Global or regional.
    pub scope: AddressScope,
    /// Reservation status.
    pub status: AddressStatus,
    /// External or internal.
    pub address_type: AddressType,
    /// Raw resource URLs of the consumers, as reported by the API.
    pub users: Vec<String>,
}

impl AddressRecord {
    /// Creates a reserved external record with no consumers.
    #[must_use]
    pub fn new(name: impl Into<String>, scope: AddressScope) -> Self {
        Self {
            name: name.into(),
            address: String::new(),
            scope,
            status: AddressStatus::Reserved,
            address_type: AddressType::External,
            users: Vec::new(),
        }
    }

    /// Sets the IP address string.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Sets the reservation status.
    #[must_use]
    pub fn with_status(mut self, status: AddressStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the address type.
    #[must_use]
    pub const fn with_address_type(mut self, address_type: AddressType) -> Self {
        self.address_type = address_type;
        self
    }

    /// Appends a consumer resource URL.
    #[must_use]
    pub fn with_user(mut self, url: impl Into<String>) -> Self {
        self.users.push(url.into());
        self
    }

    /// Returns the region for regional addresses.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.scope.region()
    }

    /// Returns true if the address is externally routable.
    #[must_use]
    pub fn is_external(&self) -> bool {
        self.address_type == AddressType::External
    }

    /// Returns a label for logs: the IP if known, otherwise the name.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.address.is_empty() {
            &self.name
        } else {
            &self.address
        }
    }
}

/// All addresses of one project, bucketed by scope key.
///
/// # Examples
///
/// ```
/// use ipenforcer::{AddressRecord, AddressScope, Inventory};
///
/// let mut inventory = Inventory::new();
/// inventory
///     .insert_bucket("global", vec![AddressRecord::new("ip-a", AddressScope::Global)])
///     .unwrap();
///
/// assert_eq!(inventory.len(), 1);
/// assert!(inventory
///     .insert_bucket("regions/us-east1", vec![AddressRecord::new("ip-x", AddressScope::Global)])
///     .is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    buckets: BTreeMap<String, Vec<AddressRecord>>,
}

impl Inventory {
    /// Creates an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds records under a scope key, appending to an existing bucket.
    ///
    /// Empty record lists are ignored.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the key is not a known scope key or if
    /// a record's scope disagrees with the key.
    pub fn insert_bucket(&mut self, key: &str, records: Vec<AddressRecord>) -> Result<()> {
        let scope = AddressScope::from_scope_key(key).ok_or_else(|| Error::Validation {
            field: "scope".into(),
            message: format!("unrecognised scope key '{key}'"),
        })?;

        if let Some(stray) = records.iter().find(|r| r.scope != scope) {
            return Err(Error::Validation {
                field: "scope".into(),
                message: format!(
                    "address {} has scope {} but was listed under {key}",
                    stray.name, stray.scope
                ),
            });
        }

        if !records.is_empty() {
            self.buckets
                .entry(key.to_string())
                .or_default()
                .extend(records);
        }
        Ok(())
    }

    /// Returns true if no scope holds any record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Returns the total number of records across all scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Returns the records listed under a scope key.
    #[must_use]
    pub fn bucket(&self, key: &str) -> Option<&[AddressRecord]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Iterates over `(scope key, records)` in key order.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &[AddressRecord])> {
        self.buckets
            .iter()
            .map(|(key, records)| (key.as_str(), records.as_slice()))
    }

    /// Iterates over every record in scope-key order.
    pub fn records(&self) -> impl Iterator<Item = &AddressRecord> {
        self.buckets.values().flatten()
    }
}
