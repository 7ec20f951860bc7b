use super::{paginate, CatalogFilters, CatalogQuery, Page, PageRequest, Scope};
use crate::document::{DocumentListing, DocumentStore};
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// Builds paginated document views from a scope and filters.
///
/// The engine does not authorize the scope: callers decide which scopes a user may ask
/// for. `Scope::PublicAccepted` is the only scope that restricts results by itself.
pub struct CatalogQueryEngine {
    store: Arc<dyn DocumentStore>,
}

impl CatalogQueryEngine {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Results are ordered by upload date, newest first, ties by ascending id.
    pub fn query(
        &self,
        scope: Scope,
        filters: CatalogFilters,
        page: PageRequest,
        page_size: usize,
    ) -> Result<Page<DocumentListing>> {
        let query = CatalogQuery::new(scope, filters);
        debug!("Catalog query {:?}, page {:?} (size {})", query, page, page_size);
        paginate(
            page_size,
            page,
            || self.store.count_matching(&query),
            |offset, limit| self.store.fetch_matching(&query, offset, limit),
        )
    }
}
