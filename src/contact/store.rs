use super::models::{ContactQuery, NewContactQuery};
use crate::sqlite_column;
use crate::sqlite_persistence::{SqlType, SqliteDatabase, Table};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

/// V 0
pub const CONTACT_QUERY_TABLE_V_0: Table = Table {
    name: "contact_query",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("full_name", &SqlType::Text, non_null = true),
        sqlite_column!("email", &SqlType::Text, non_null = true),
        sqlite_column!("mobile", &SqlType::Text, non_null = true),
        sqlite_column!("subject", &SqlType::Text, non_null = true),
        sqlite_column!("message", &SqlType::Text, non_null = true),
        sqlite_column!("date", &SqlType::Text, non_null = true),
        sqlite_column!(
            "is_read",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
    ],
    indices: &[("idx_contact_query_is_read", "is_read")],
};

const CONTACT_QUERY_COLUMNS: &str = "id, full_name, email, mobile, subject, message, date, is_read";

pub trait ContactStore: Send + Sync {
    fn create_query(&self, query: &NewContactQuery, date: NaiveDate) -> Result<ContactQuery>;

    /// Returns Ok(None) if the query does not exist.
    fn get_query(&self, id: usize) -> Result<Option<ContactQuery>>;

    /// Returns false if the query does not exist.
    fn mark_read(&self, id: usize) -> Result<bool>;

    fn count_queries(&self, is_read: bool) -> Result<usize>;

    /// Returns a window of queries with the given read flag, newest first.
    fn list_queries(&self, is_read: bool, offset: usize, limit: usize)
        -> Result<Vec<ContactQuery>>;
}

fn query_from_row(row: &Row) -> rusqlite::Result<ContactQuery> {
    Ok(ContactQuery {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        mobile: row.get(3)?,
        subject: row.get(4)?,
        message: row.get(5)?,
        date: row.get(6)?,
        is_read: row.get(7)?,
    })
}

pub struct SqliteContactStore {
    db: SqliteDatabase,
}

impl SqliteContactStore {
    pub fn new(db: SqliteDatabase) -> Self {
        Self { db }
    }
}

impl ContactStore for SqliteContactStore {
    fn create_query(&self, query: &NewContactQuery, date: NaiveDate) -> Result<ContactQuery> {
        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO contact_query (full_name, email, mobile, subject, message, date) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                query.full_name,
                query.email,
                query.mobile,
                query.subject,
                query.message,
                date
            ],
        )
        .context("Failed to store contact query")?;
        Ok(ContactQuery {
            id: conn.last_insert_rowid() as usize,
            full_name: query.full_name.clone(),
            email: query.email.clone(),
            mobile: query.mobile.clone(),
            subject: query.subject.clone(),
            message: query.message.clone(),
            date,
            is_read: false,
        })
    }

    fn get_query(&self, id: usize) -> Result<Option<ContactQuery>> {
        let conn = self.db.lock();
        let query = conn
            .query_row(
                &format!(
                    "SELECT {} FROM contact_query WHERE id = ?1",
                    CONTACT_QUERY_COLUMNS
                ),
                params![id],
                query_from_row,
            )
            .optional()?;
        Ok(query)
    }

    fn mark_read(&self, id: usize) -> Result<bool> {
        let conn = self.db.lock();
        let updated = conn.execute(
            "UPDATE contact_query SET is_read = 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(updated > 0)
    }

    fn count_queries(&self, is_read: bool) -> Result<usize> {
        let conn = self.db.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM contact_query WHERE is_read = ?1",
            params![is_read],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn list_queries(
        &self,
        is_read: bool,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ContactQuery>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM contact_query WHERE is_read = ?1 ORDER BY date DESC, id DESC LIMIT ?2 OFFSET ?3",
            CONTACT_QUERY_COLUMNS
        ))?;
        let queries = stmt
            .query_map(
                params![is_read, limit as i64, offset as i64],
                query_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(queries)
    }
}
