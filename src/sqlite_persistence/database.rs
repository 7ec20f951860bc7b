use super::{VersionedSchema, BASE_DB_VERSION, PORTAL_VERSIONED_SCHEMAS};
use crate::catalog_query::contains_case_insensitive;
use anyhow::{bail, Context, Result};
use rusqlite::{functions::FunctionFlags, Connection};
use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tracing::info;

/// Name of the SQL scalar function backing case-insensitive substring search.
pub const CONTAINS_CI_FUNCTION: &str = "contains_ci";

/// Shared handle to the portal database.
///
/// All stores (users, documents, contact queries) live in the same file so that catalog
/// queries can join documents with their owners. The connection is guarded by a mutex:
/// every store operation holds the lock for its whole duration, including the
/// transactions used for check-and-set updates.
#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        Self::open_with_schemas(db_path, PORTAL_VERSIONED_SCHEMAS)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(&conn)?;
        latest_schema(PORTAL_VERSIONED_SCHEMAS)?.create(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn open_with_schemas<P: AsRef<Path>>(
        db_path: P,
        schemas: &'static [VersionedSchema],
    ) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        let mut conn = Connection::open(path)
            .with_context(|| format!("Failed to open portal database at {:?}", path))?;
        Self::configure(&conn)?;

        if is_new_db {
            info!("Creating new portal database at {:?}", path);
            latest_schema(schemas)?.create(&conn)?;
        } else {
            let raw_version: i64 =
                conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
            let db_version = raw_version - BASE_DB_VERSION as i64;
            if db_version < 0 {
                bail!(
                    "Database at {:?} has version {}, which does not contain base version {}",
                    path,
                    raw_version,
                    BASE_DB_VERSION
                );
            }
            let db_version = db_version as usize;

            let schema = schemas
                .iter()
                .find(|s| s.version == db_version)
                .with_context(|| format!("Unknown portal database version {}", db_version))?;
            schema.validate(&conn).with_context(|| {
                format!(
                    "Portal database schema validation failed for version {}",
                    db_version
                )
            })?;

            Self::migrate_if_needed(&mut conn, schemas, db_version)?;
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn configure(conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys = ON;", [])?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.create_scalar_function(
            CONTAINS_CI_FUNCTION,
            2,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let haystack = ctx.get::<Option<String>>(0)?;
                let needle = ctx.get::<String>(1)?;
                Ok(haystack
                    .map(|h| contains_case_insensitive(&h, &needle))
                    .unwrap_or(false))
            },
        )?;
        Ok(())
    }

    fn migrate_if_needed(
        conn: &mut Connection,
        schemas: &'static [VersionedSchema],
        from_version: usize,
    ) -> Result<()> {
        let tx = conn.transaction()?;
        let mut latest_from = from_version;
        for schema in schemas.iter().filter(|s| s.version > from_version) {
            info!(
                "Running portal database migration from version {} to {}",
                latest_from, schema.version
            );
            if let Some(migration_fn) = schema.migration {
                migration_fn(&tx).with_context(|| {
                    format!("Failed to run migration to version {}", schema.version)
                })?;
            }
            latest_from = schema.version;
        }
        tx.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

fn latest_schema(schemas: &'static [VersionedSchema]) -> Result<&'static VersionedSchema> {
    schemas
        .last()
        .context("No versioned schema defined for the portal database")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reopens_existing_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portal.db");

        {
            let db = SqliteDatabase::open(&path).unwrap();
            db.lock()
                .execute(
                    "INSERT INTO user (email, first_name, last_name, contact, branch, role) VALUES ('a@b.c', 'A', 'B', '0123456789', 'Civil', 'Student')",
                    [],
                )
                .unwrap();
        }

        let db = SqliteDatabase::open(&path).unwrap();
        let count: i64 = db
            .lock()
            .query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn refuses_foreign_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute("CREATE TABLE something (id INTEGER)", [])
                .unwrap();
        }

        assert!(SqliteDatabase::open(&path).is_err());
    }

    #[test]
    fn registers_case_insensitive_contains() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let conn = db.lock();
        let hit: bool = conn
            .query_row("SELECT contains_ci('Algorithms 101', 'ALGO')", [], |row| {
                row.get(0)
            })
            .unwrap();
        let null_hit: bool = conn
            .query_row("SELECT contains_ci(NULL, 'algo')", [], |row| row.get(0))
            .unwrap();
        assert!(hit);
        assert!(!null_hit);
    }
}
