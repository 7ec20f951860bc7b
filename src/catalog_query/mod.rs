//! Filtered, ordered and paginated views over the document collection.

mod engine;
mod pagination;
mod query;

pub use engine::CatalogQueryEngine;
pub use pagination::{paginate, Page, PageRequest, PageWindow};
pub use query::{contains_case_insensitive, CatalogFilters, CatalogQuery, Predicate, Scope};
