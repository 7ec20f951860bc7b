//! Test data seeding
//!
//! Creates the accounts every test server starts with, and documents inserted directly
//! into the stores for tests that need many of them or specific upload dates.

use super::constants::*;
use chrono::NaiveDate;
use docportal_server::document::{
    BlobStore, Branch, Category, DocumentStatus, DocumentStore, FileType, FsBlobStore,
    NewDocument, SqliteDocumentStore,
};
use docportal_server::user::{Registration, User, UserManager, UserRole};

/// Accounts created for each test server
pub struct SeededUsers {
    pub student: User,
    pub other_student: User,
    pub admin: User,
}

fn registration(
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
) -> Registration {
    Registration {
        email: email.to_string(),
        password: password.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        contact: TEST_CONTACT.to_string(),
        branch: Branch::ComputerScience,
    }
}

pub fn seed_users(user_manager: &UserManager) -> anyhow::Result<SeededUsers> {
    let student = user_manager.add_user(
        &registration(TEST_USER, TEST_PASS, TEST_USER_FIRST_NAME, TEST_USER_LAST_NAME),
        UserRole::Student,
    )?;
    let other_student = user_manager.add_user(
        &registration(
            OTHER_USER,
            OTHER_PASS,
            OTHER_USER_FIRST_NAME,
            OTHER_USER_LAST_NAME,
        ),
        UserRole::Student,
    )?;
    let admin = user_manager.add_user(
        &registration(ADMIN_USER, ADMIN_PASS, "Site", "Admin"),
        UserRole::Admin,
    )?;
    Ok(SeededUsers {
        student,
        other_student,
        admin,
    })
}

/// Description of a document inserted directly into the stores
pub struct DocumentSeed<'a> {
    pub owner_id: usize,
    pub subject: &'a str,
    pub description: Option<&'a str>,
    pub branch: Branch,
    pub category: Category,
    pub upload_date: NaiveDate,
    pub status: DocumentStatus,
}

impl<'a> DocumentSeed<'a> {
    pub fn new(owner_id: usize, subject: &'a str, status: DocumentStatus) -> Self {
        Self {
            owner_id,
            subject,
            description: None,
            branch: Branch::ComputerScience,
            category: Category::Notes,
            upload_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            status,
        }
    }

    pub fn on(mut self, year: i32, month: u32, day: u32) -> Self {
        self.upload_date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        self
    }

    pub fn branch(mut self, branch: Branch) -> Self {
        self.branch = branch;
        self
    }

    pub fn description(mut self, description: &'a str) -> Self {
        self.description = Some(description);
        self
    }
}

/// Inserts the document with a PDF file and moves it to the requested status
pub async fn seed_document(
    documents: &SqliteDocumentStore,
    blobs: &FsBlobStore,
    seed: DocumentSeed<'_>,
) -> anyhow::Result<usize> {
    let document = documents.create_document(
        &NewDocument {
            owner_id: seed.owner_id,
            branch: seed.branch,
            subject: seed.subject.to_string(),
            category: seed.category,
            file_type: FileType::Pdf,
            description: seed.description.map(str::to_string),
            file_name: format!("{}.pdf", seed.subject),
        },
        seed.upload_date,
    )?;
    blobs.put(document.id, PDF_BYTES).await?;
    if seed.status != DocumentStatus::Pending {
        documents.update_status(document.id, seed.status)?;
    }
    Ok(document.id)
}
