//! Document sharing portal server library.
//!
//! This library exposes the internal modules for the binaries and the end-to-end tests.

pub mod catalog_query;
pub mod config;
pub mod contact;
pub mod document;
pub mod moderation;
pub mod notifications;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

#[cfg(test)]
mod test_support;

pub use server::{run_server, RequestsLoggingLevel};
pub use user::{SqliteUserStore, UserRole, UserStore};
