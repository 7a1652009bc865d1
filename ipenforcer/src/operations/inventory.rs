//! Paginated inventory fetch.

use std::collections::HashSet;

use crate::address::Inventory;
use crate::compute::ComputeApi;
use crate::error::{Error, Result};

/// Collects every address of a project across all listing pages.
pub struct InventoryFetcher<'a> {
    api: &'a dyn ComputeApi,
}

impl<'a> InventoryFetcher<'a> {
    /// Creates a fetcher listing through `api`.
    #[must_use]
    pub fn new(api: &'a dyn ComputeApi) -> Self {
        Self { api }
    }

    /// Fetches the full inventory of `project`.
    ///
    /// Pages are requested until the listing returns no continuation token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FetchFailure`] if any page fails, if a page cannot be
    /// converted, or if the API hands back a token it already returned.
    pub fn fetch(&self, project: &str) -> Result<Inventory> {
        self.fetch_pages(project).map_err(|source| {
            log::error!("inventory fetch failed project={project} error={source}");
            Error::FetchFailure {
                project: project.to_string(),
                source: Box::new(source),
            }
        })
    }

    fn fetch_pages(&self, project: &str) -> Result<Inventory> {
        let mut inventory = Inventory::new();
        let mut seen = HashSet::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.api.list_addresses(project, token.as_deref())?;
            pages += 1;
            let next = page.next_page_token.clone().filter(|t| !t.is_empty());

            for (key, records) in page.into_buckets()? {
                inventory.insert_bucket(&key, records)?;
            }

            match next {
                None => break,
                Some(next) => {
                    if !seen.insert(next.clone()) {
                        return Err(Error::Validation {
                            field: "nextPageToken".into(),
                            message: format!("listing repeated page token '{next}'"),
                        });
                    }
                    token = Some(next);
                }
            }
        }

        log::debug!(
            "fetched inventory project={project} pages={pages} addresses={}",
            inventory.len()
        );
        Ok(inventory)
    }
}
