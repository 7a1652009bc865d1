//! Wire shapes of the aggregated address listing.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::address::{AddressRecord, AddressScope, AddressStatus, AddressType};
use crate::error::{Error, Result};

/// One page of `addresses.aggregatedList`.
///
/// # Examples
///
/// ```
/// use ipenforcer::compute::AddressPage;
///
/// let page: AddressPage = serde_json::from_str(r#"{
///     "items": {
///         "global": {"addresses": [{"name": "ip-a", "address": "198.51.100.1", "status": "RESERVED"}]},
///         "regions/asia-east1": {"warning": {"code": "NO_RESULTS_ON_PAGE"}}
///     },
///     "nextPageToken": "abc"
/// }"#).unwrap();
///
/// assert_eq!(page.next_page_token.as_deref(), Some("abc"));
/// let buckets = page.into_buckets().unwrap();
/// assert_eq!(buckets.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPage {
    /// Scope key to the addresses listed in that scope.
    #[serde(default)]
    pub items: BTreeMap<String, ScopedAddresses>,
    /// Token of the next page, absent on the last page.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// The entry of one scope within a page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopedAddresses {
    /// The addresses, absent when the scope only carries a warning.
    #[serde(default)]
    pub addresses: Option<Vec<RawAddress>>,
    /// Informational warning, such as `NO_RESULTS_ON_PAGE`.
    #[serde(default)]
    pub warning: Option<serde_json::Value>,
}

/// An address exactly as returned by the API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAddress {
    /// Reservation name.
    pub name: String,
    /// The IP address.
    #[serde(default)]
    pub address: Option<String>,
    /// `RESERVED`, `IN_USE`, `RESERVING`.
    #[serde(default)]
    pub status: String,
    /// Region URL for regional addresses.
    #[serde(default)]
    pub region: Option<String>,
    /// `EXTERNAL` or `INTERNAL`.
    #[serde(default)]
    pub address_type: Option<String>,
    /// Consumer resource URLs.
    #[serde(default)]
    pub users: Vec<String>,
}

impl RawAddress {
    /// Converts the wire record into an [`AddressRecord`].
    ///
    /// # Errors
    ///
    /// Returns a validation error if the region URL is present but empty.
    pub fn into_record(self) -> Result<AddressRecord> {
        let scope = match self.region.as_deref() {
            None => AddressScope::Global,
            Some(url) => {
                let region = url
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| Error::Validation {
                        field: "region".into(),
                        message: format!("address {} has an empty region", self.name),
                    })?;
                AddressScope::Regional(region.to_string())
            }
        };

        Ok(AddressRecord {
            address_type: AddressType::parse(self.address_type.as_deref()),
            status: AddressStatus::parse(&self.status),
            address: self.address.unwrap_or_default(),
            name: self.name,
            scope,
            users: self.users,
        })
    }
}

impl AddressPage {
    /// Converts the page into `(scope key, records)` pairs.
    ///
    /// Scopes without an `addresses` list are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if any address fails to convert.
    pub fn into_buckets(self) -> Result<Vec<(String, Vec<AddressRecord>)>> {
        self.items
            .into_iter()
            .filter_map(|(key, scoped)| scoped.addresses.map(|addresses| (key, addresses)))
            .map(|(key, addresses)| {
                let records = addresses
                    .into_iter()
                    .map(RawAddress::into_record)
                    .collect::<Result<Vec<_>>>()?;
                Ok((key, records))
            })
            .collect()
    }
}
