mod database;
mod schema;
mod versioned_schema;

pub use database::{SqliteDatabase, CONTAINS_CI_FUNCTION};
pub use schema::PORTAL_VERSIONED_SCHEMAS;
pub use versioned_schema::*;
