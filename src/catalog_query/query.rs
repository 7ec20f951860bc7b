//! Catalog query values and their matching rules.
//!
//! A [`CatalogQuery`] is a scope plus optional filters. It lowers to a flat list of
//! [`Predicate`]s that are all combined with AND; the free-text predicate is itself an OR
//! over the searchable fields. Stores render the same predicate list to their own query
//! language, while [`CatalogQuery::matches`] evaluates it directly in memory.

use crate::document::{Branch, Category, DocumentListing, DocumentStatus, FileType};
use serde::Serialize;

/// Base set of documents a query runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Scope {
    /// The public catalog: always restricted to accepted documents.
    PublicAccepted,
    OwnedBy(usize),
    ByStatus(DocumentStatus),
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogFilters {
    pub search: Option<String>,
    pub branch: Option<Branch>,
    pub category: Option<Category>,
    pub file_type: Option<FileType>,
}

impl CatalogFilters {
    pub fn with_search<S: Into<String>>(mut self, search: S) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branch = Some(branch);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_file_type(mut self, file_type: FileType) -> Self {
        self.file_type = Some(file_type);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    StatusIs(DocumentStatus),
    OwnerIs(usize),
    BranchIs(Branch),
    CategoryIs(Category),
    FileTypeIs(FileType),
    /// Case-insensitive substring over subject, description and owner names.
    TextContains(String),
}

impl Predicate {
    pub fn holds(&self, listing: &DocumentListing) -> bool {
        let document = &listing.document;
        match self {
            Predicate::StatusIs(status) => document.status == *status,
            Predicate::OwnerIs(owner_id) => document.owner_id == *owner_id,
            Predicate::BranchIs(branch) => document.branch == *branch,
            Predicate::CategoryIs(category) => document.category == *category,
            Predicate::FileTypeIs(file_type) => document.file_type == *file_type,
            Predicate::TextContains(needle) => {
                contains_case_insensitive(&document.subject, needle)
                    || document
                        .description
                        .as_deref()
                        .is_some_and(|d| contains_case_insensitive(d, needle))
                    || contains_case_insensitive(&listing.owner_first_name, needle)
                    || contains_case_insensitive(&listing.owner_last_name, needle)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub scope: Scope,
    pub filters: CatalogFilters,
}

impl CatalogQuery {
    pub fn new(scope: Scope, filters: CatalogFilters) -> Self {
        Self { scope, filters }
    }

    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        match self.scope {
            Scope::PublicAccepted => predicates.push(Predicate::StatusIs(DocumentStatus::Accept)),
            Scope::ByStatus(status) => predicates.push(Predicate::StatusIs(status)),
            Scope::OwnedBy(owner_id) => predicates.push(Predicate::OwnerIs(owner_id)),
            Scope::All => {}
        }
        if let Some(search) = self.filters.search.as_deref().filter(|s| !s.is_empty()) {
            predicates.push(Predicate::TextContains(search.to_string()));
        }
        if let Some(branch) = self.filters.branch {
            predicates.push(Predicate::BranchIs(branch));
        }
        if let Some(category) = self.filters.category {
            predicates.push(Predicate::CategoryIs(category));
        }
        if let Some(file_type) = self.filters.file_type {
            predicates.push(Predicate::FileTypeIs(file_type));
        }
        predicates
    }

    pub fn matches(&self, listing: &DocumentListing) -> bool {
        self.predicates().iter().all(|p| p.holds(listing))
    }
}

/// Unicode-aware case-insensitive substring test.
pub fn contains_case_insensitive(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
