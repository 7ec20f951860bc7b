//! Contact form inbox read by administrators.

mod models;
mod service;
mod store;

pub use models::{ContactQuery, NewContactQuery};
pub use service::{ContactError, ContactService};
pub use store::{ContactStore, SqliteContactStore, CONTACT_QUERY_TABLE_V_0};
