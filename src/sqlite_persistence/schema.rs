use super::VersionedSchema;
use crate::contact::CONTACT_QUERY_TABLE_V_0;
use crate::document::DOCUMENT_TABLE_V_0;
use crate::user::{AUTH_TOKEN_TABLE_V_0, USER_PASSWORD_CREDENTIALS_TABLE_V_0, USER_TABLE_V_0};

/// Every schema version the portal database has gone through, oldest first.
pub const PORTAL_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        USER_TABLE_V_0,
        USER_PASSWORD_CREDENTIALS_TABLE_V_0,
        AUTH_TOKEN_TABLE_V_0,
        DOCUMENT_TABLE_V_0,
        CONTACT_QUERY_TABLE_V_0,
    ],
    migration: None,
}];
