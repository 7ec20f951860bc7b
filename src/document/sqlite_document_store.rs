use super::models::{
    Document, DocumentListing, DocumentStatus, GuardedDelete, NewDocument, StatusCounts,
    StatusTransition,
};
use super::store::DocumentStore;
use crate::catalog_query::{CatalogQuery, Predicate};
use crate::sqlite_column;
use crate::sqlite_persistence::{
    ForeignKey, ForeignKeyOnChange, SqlType, SqliteDatabase, Table, CONTAINS_CI_FUNCTION,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{
    params, params_from_iter, types::Value, Connection, OptionalExtension, Row,
    TransactionBehavior,
};
use tracing::debug;

/// V 0
pub const DOCUMENT_TABLE_V_0: Table = Table {
    name: "document",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!(
            "owner_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("upload_date", &SqlType::Text, non_null = true),
        sqlite_column!("branch", &SqlType::Text, non_null = true),
        sqlite_column!("subject", &SqlType::Text, non_null = true),
        sqlite_column!("category", &SqlType::Text, non_null = true),
        sqlite_column!("file_type", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!(
            "status",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'pending'")
        ),
        sqlite_column!(
            "download_count",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("file_name", &SqlType::Text, non_null = true),
    ],
    indices: &[
        ("idx_document_owner", "owner_id"),
        ("idx_document_status", "status"),
        ("idx_document_upload_date", "upload_date"),
    ],
};

const DOCUMENT_COLUMNS: &str = "d.id, d.owner_id, d.upload_date, d.branch, d.subject, d.category, \
     d.file_type, d.description, d.status, d.download_count, d.file_name";

fn document_from_row(row: &Row) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        upload_date: row.get(2)?,
        branch: row.get(3)?,
        subject: row.get(4)?,
        category: row.get(5)?,
        file_type: row.get(6)?,
        description: row.get(7)?,
        status: row.get(8)?,
        download_count: row.get::<_, i64>(9)?.max(0) as u64,
        file_name: row.get(10)?,
    })
}

fn listing_from_row(row: &Row) -> rusqlite::Result<DocumentListing> {
    Ok(DocumentListing {
        document: document_from_row(row)?,
        owner_first_name: row.get(11)?,
        owner_last_name: row.get(12)?,
    })
}

fn select_document(conn: &Connection, id: usize) -> rusqlite::Result<Option<Document>> {
    conn.query_row(
        &format!("SELECT {} FROM document d WHERE d.id = ?1", DOCUMENT_COLUMNS),
        params![id],
        document_from_row,
    )
    .optional()
}

/// SQL rendering of a catalog query: a WHERE clause (empty when unfiltered) and its
/// positional parameters.
pub(crate) fn render_where(query: &CatalogQuery) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();
    for predicate in query.predicates() {
        let n = values.len() + 1;
        let (clause, value) = match predicate {
            Predicate::StatusIs(status) => (
                format!("d.status = ?{}", n),
                Value::Text(status.as_str().to_string()),
            ),
            Predicate::OwnerIs(owner_id) => {
                (format!("d.owner_id = ?{}", n), Value::Integer(owner_id as i64))
            }
            Predicate::BranchIs(branch) => (
                format!("d.branch = ?{}", n),
                Value::Text(branch.as_str().to_string()),
            ),
            Predicate::CategoryIs(category) => (
                format!("d.category = ?{}", n),
                Value::Text(category.as_str().to_string()),
            ),
            Predicate::FileTypeIs(file_type) => (
                format!("d.file_type = ?{}", n),
                Value::Text(file_type.as_str().to_string()),
            ),
            Predicate::TextContains(needle) => (
                format!(
                    "({f}(d.subject, ?{n}) OR {f}(d.description, ?{n}) \
                     OR {f}(u.first_name, ?{n}) OR {f}(u.last_name, ?{n}))",
                    f = CONTAINS_CI_FUNCTION,
                    n = n
                ),
                Value::Text(needle),
            ),
        };
        clauses.push(clause);
        values.push(value);
    }
    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!("WHERE {}", clauses.join(" AND ")), values)
    }
}

/// Documents in the portal database.
pub struct SqliteDocumentStore {
    db: SqliteDatabase,
}

impl SqliteDocumentStore {
    pub fn new(db: SqliteDatabase) -> Self {
        Self { db }
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn create_document(
        &self,
        document: &NewDocument,
        upload_date: NaiveDate,
    ) -> Result<Document> {
        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO document (owner_id, upload_date, branch, subject, category, file_type, description, status, file_name) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                document.owner_id,
                upload_date,
                document.branch,
                document.subject,
                document.category,
                document.file_type,
                document.description,
                DocumentStatus::Pending,
                document.file_name,
            ],
        )
        .with_context(|| format!("Failed to create document for user {}", document.owner_id))?;
        let id = conn.last_insert_rowid() as usize;
        select_document(&conn, id)?
            .with_context(|| format!("Document {} vanished right after insert", id))
    }

    fn get_document(&self, id: usize) -> Result<Option<Document>> {
        let conn = self.db.lock();
        Ok(select_document(&conn, id)?)
    }

    fn update_status(
        &self,
        id: usize,
        status: DocumentStatus,
    ) -> Result<Option<StatusTransition>> {
        let mut conn = self.db.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(mut document) = select_document(&tx, id)? else {
            return Ok(None);
        };
        let previous = document.status;
        tx.execute(
            "UPDATE document SET status = ?1 WHERE id = ?2",
            params![status, id],
        )?;
        tx.commit()?;
        debug!("Document {} status {} -> {}", id, previous, status);
        document.status = status;
        Ok(Some(StatusTransition { previous, document }))
    }

    fn delete_document_if(
        &self,
        id: usize,
        allow: &dyn Fn(&Document) -> bool,
    ) -> Result<GuardedDelete> {
        let mut conn = self.db.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(document) = select_document(&tx, id)? else {
            return Ok(GuardedDelete::NotFound);
        };
        if !allow(&document) {
            return Ok(GuardedDelete::Refused);
        }
        tx.execute("DELETE FROM document WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(GuardedDelete::Deleted(document))
    }

    fn remove_document(&self, id: usize) -> Result<bool> {
        let conn = self.db.lock();
        let deleted = conn.execute("DELETE FROM document WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn increment_download_count(&self, id: usize) -> Result<Option<u64>> {
        let conn = self.db.lock();
        let count = conn
            .query_row(
                "UPDATE document SET download_count = download_count + 1 WHERE id = ?1 RETURNING download_count",
                params![id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(count.map(|c| c.max(0) as u64))
    }

    fn count_matching(&self, query: &CatalogQuery) -> Result<usize> {
        let (where_clause, values) = render_where(query);
        let conn = self.db.lock();
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM document d JOIN user u ON u.id = d.owner_id {}",
                where_clause
            ),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn fetch_matching(
        &self,
        query: &CatalogQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<DocumentListing>> {
        let (where_clause, mut values) = render_where(query);
        let limit_index = values.len() + 1;
        values.push(Value::Integer(limit as i64));
        values.push(Value::Integer(offset as i64));

        let conn = self.db.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {}, u.first_name, u.last_name FROM document d JOIN user u ON u.id = d.owner_id {} \
             ORDER BY d.upload_date DESC, d.id ASC LIMIT ?{} OFFSET ?{}",
            DOCUMENT_COLUMNS,
            where_clause,
            limit_index,
            limit_index + 1
        ))?;
        let listings = stmt
            .query_map(params_from_iter(values.iter()), listing_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(listings)
    }

    fn count_by_status(&self) -> Result<StatusCounts> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM document GROUP BY status")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, DocumentStatus>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            let count = count as usize;
            match status {
                DocumentStatus::Pending => counts.pending = count,
                DocumentStatus::Accept => counts.accepted = count,
                DocumentStatus::Reject => counts.rejected = count,
            }
        }
        Ok(counts)
    }

    fn get_document_ids_by_owner(&self, owner_id: usize) -> Result<Vec<usize>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare("SELECT id FROM document WHERE owner_id = ?1 ORDER BY id")?;
        let ids = stmt
            .query_map(params![owner_id], |row| row.get::<_, usize>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }
}
