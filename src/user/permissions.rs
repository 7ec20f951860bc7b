use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    BrowseCatalog,
    UploadDocuments,
    ModerateDocuments,
    ManageUsers,
    ReadContactQueries,
}

impl Permission {
    pub fn as_int(self) -> i32 {
        match self {
            Permission::BrowseCatalog => 1,
            Permission::UploadDocuments => 2,
            Permission::ModerateDocuments => 3,
            Permission::ManageUsers => 4,
            Permission::ReadContactQueries => 5,
        }
    }

    pub fn from_int(value: i32) -> Option<Self> {
        match value {
            1 => Some(Permission::BrowseCatalog),
            2 => Some(Permission::UploadDocuments),
            3 => Some(Permission::ModerateDocuments),
            4 => Some(Permission::ManageUsers),
            5 => Some(Permission::ReadContactQueries),
            _ => None,
        }
    }
}

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::BrowseCatalog,
    Permission::UploadDocuments,
    Permission::ModerateDocuments,
    Permission::ManageUsers,
    Permission::ReadContactQueries,
];
const STUDENT_PERMISSIONS: &[Permission] =
    &[Permission::BrowseCatalog, Permission::UploadDocuments];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Student,
    Admin,
}

impl UserRole {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            UserRole::Admin => ADMIN_PERMISSIONS,
            UserRole::Student => STUDENT_PERMISSIONS,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Student => "Student",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "student" => Some(UserRole::Student),
            _ => None,
        }
    }
}

impl ToSql for UserRole {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for UserRole {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        UserRole::from_str(s)
            .ok_or_else(|| FromSqlError::Other(format!("invalid user role: {}", s).into()))
    }
}
