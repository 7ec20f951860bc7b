//! Shared fixtures for unit tests backed by an in-memory database.

use crate::document::{
    Branch, Category, DocumentStatus, DocumentStore, FileType, NewDocument, SqliteDocumentStore,
};
use crate::sqlite_persistence::SqliteDatabase;
use crate::user::{NewUser, SqliteUserStore, UserRole, UserStore};
use chrono::NaiveDate;
use std::sync::Arc;

pub struct TestStores {
    pub db: SqliteDatabase,
    pub users: Arc<SqliteUserStore>,
    pub documents: Arc<SqliteDocumentStore>,
}

impl TestStores {
    pub fn new() -> Self {
        let db = SqliteDatabase::open_in_memory().unwrap();
        Self {
            users: Arc::new(SqliteUserStore::new(db.clone())),
            documents: Arc::new(SqliteDocumentStore::new(db.clone())),
            db,
        }
    }
}

fn add_user(stores: &TestStores, email: &str, first: &str, last: &str, role: UserRole) -> usize {
    stores
        .users
        .create_user(
            &NewUser {
                email: email.to_string(),
                first_name: first.to_string(),
                last_name: last.to_string(),
                contact: "0123456789".to_string(),
                branch: Branch::ComputerScience,
            },
            role,
        )
        .unwrap()
}

pub fn add_student(stores: &TestStores, email: &str, first: &str, last: &str) -> usize {
    add_user(stores, email, first, last, UserRole::Student)
}

pub fn add_admin(stores: &TestStores, email: &str) -> usize {
    add_user(stores, email, "Site", "Admin", UserRole::Admin)
}

/// Inserts a Computer Science PDF of notes and moves it to `status`.
pub fn add_document(
    stores: &TestStores,
    owner_id: usize,
    subject: &str,
    description: Option<&str>,
    upload_date: NaiveDate,
    status: DocumentStatus,
) -> usize {
    let document = stores
        .documents
        .create_document(
            &NewDocument {
                owner_id,
                branch: Branch::ComputerScience,
                subject: subject.to_string(),
                category: Category::Notes,
                file_type: FileType::Pdf,
                description: description.map(str::to_string),
                file_name: "doc.pdf".to_string(),
            },
            upload_date,
        )
        .unwrap();
    if status != DocumentStatus::Pending {
        stores
            .documents
            .update_status(document.id, status)
            .unwrap()
            .unwrap();
    }
    document.id
}
