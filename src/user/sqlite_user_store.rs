use super::auth::{AuthToken, AuthTokenValue, PasswordCredentials, PortalHasher};
use super::user_models::{NewUser, ProfileUpdate, User};
use super::user_store::{UserAuthCredentialsStore, UserAuthTokenStore, UserStore};
use super::UserRole;
use crate::sqlite_column;
use crate::sqlite_persistence::{
    ForeignKey, ForeignKeyOnChange, SqlType, SqliteDatabase, Table, DEFAULT_TIMESTAMP,
};
use anyhow::{Context, Result};
use chrono::DateTime;
use rusqlite::{params, OptionalExtension, Row};
use std::{
    str::FromStr,
    time::{Duration, SystemTime},
};

/// V 0
pub const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("email", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("first_name", &SqlType::Text, non_null = true),
        sqlite_column!("last_name", &SqlType::Text, non_null = true),
        sqlite_column!("contact", &SqlType::Text, non_null = true),
        sqlite_column!("branch", &SqlType::Text, non_null = true),
        sqlite_column!("role", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_user_email", "email")],
};
pub const AUTH_TOKEN_TABLE_V_0: Table = Table {
    name: "auth_token",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("value", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    indices: &[("idx_auth_token_value", "value")],
};
pub const USER_PASSWORD_CREDENTIALS_TABLE_V_0: Table = Table {
    name: "user_password_credentials",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("salt", &SqlType::Text, non_null = true),
        sqlite_column!("hash", &SqlType::Text, non_null = true),
        sqlite_column!("hasher", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_tried", &SqlType::Integer),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    indices: &[],
};

const USER_COLUMNS: &str = "id, email, first_name, last_name, contact, branch, role, created";

fn system_time_from_column_result(value: i64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(value.max(0) as u64)
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        contact: row.get(4)?,
        branch: row.get(5)?,
        role: row.get(6)?,
        created: DateTime::from_timestamp(row.get(7)?, 0).unwrap_or_default(),
    })
}

fn auth_token_from_row(row: &Row) -> rusqlite::Result<AuthToken> {
    Ok(AuthToken {
        user_id: row.get(0)?,
        value: AuthTokenValue(row.get(1)?),
        created: system_time_from_column_result(row.get(2)?),
        last_used: row
            .get::<usize, Option<i64>>(3)?
            .map(system_time_from_column_result),
    })
}

/// User accounts, password credentials and session tokens in the portal database.
pub struct SqliteUserStore {
    db: SqliteDatabase,
}

impl SqliteUserStore {
    pub fn new(db: SqliteDatabase) -> Self {
        Self { db }
    }
}

impl UserStore for SqliteUserStore {
    fn create_user(&self, user: &NewUser, role: UserRole) -> Result<usize> {
        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO user (email, first_name, last_name, contact, branch, role) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.email,
                user.first_name,
                user.last_name,
                user.contact,
                user.branch,
                role
            ],
        )
        .with_context(|| format!("Failed to create user {}", user.email))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user(&self, user_id: usize) -> Result<Option<User>> {
        let conn = self.db.lock();
        let user = conn
            .query_row(
                &format!("SELECT {} FROM user WHERE id = ?1", USER_COLUMNS),
                params![user_id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.db.lock();
        let user = conn
            .query_row(
                &format!("SELECT {} FROM user WHERE email = ?1", USER_COLUMNS),
                params![email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn update_profile(&self, user_id: usize, update: &ProfileUpdate) -> Result<bool> {
        let conn = self.db.lock();
        let updated = conn.execute(
            "UPDATE user SET first_name = ?1, last_name = ?2, contact = ?3, branch = ?4 WHERE id = ?5",
            params![
                update.first_name,
                update.last_name,
                update.contact,
                update.branch,
                user_id
            ],
        )?;
        Ok(updated > 0)
    }

    fn set_user_role(&self, user_id: usize, role: UserRole) -> Result<bool> {
        let conn = self.db.lock();
        let updated = conn.execute(
            "UPDATE user SET role = ?1 WHERE id = ?2",
            params![role, user_id],
        )?;
        Ok(updated > 0)
    }

    fn count_users(&self) -> Result<usize> {
        let conn = self.db.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn list_users(&self, offset: usize, limit: usize) -> Result<Vec<User>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM user ORDER BY created DESC, id DESC LIMIT ?1 OFFSET ?2",
            USER_COLUMNS
        ))?;
        let users = stmt
            .query_map(params![limit as i64, offset as i64], user_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    fn delete_user(&self, user_id: usize) -> Result<bool> {
        let conn = self.db.lock();
        let deleted = conn.execute("DELETE FROM user WHERE id = ?1", params![user_id])?;
        Ok(deleted > 0)
    }
}

impl UserAuthTokenStore for SqliteUserStore {
    fn get_user_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.db.lock();
        let token = conn
            .query_row(
                "SELECT user_id, value, created, last_used FROM auth_token WHERE value = ?1",
                params![value.0],
                auth_token_from_row,
            )
            .optional()?;
        Ok(token)
    }

    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let Some(token) = self.get_user_auth_token(token)? else {
            return Ok(None);
        };
        let conn = self.db.lock();
        conn.execute(
            "DELETE FROM auth_token WHERE value = ?1",
            params![token.value.0],
        )?;
        Ok(Some(token))
    }

    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()> {
        let conn = self.db.lock();
        conn.execute(
            "UPDATE auth_token SET last_used = ?1 WHERE value = ?2",
            params![now_secs(), token.0],
        )?;
        Ok(())
    }

    fn add_user_auth_token(&self, token: &AuthToken) -> Result<()> {
        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO auth_token (value, user_id) VALUES (?1, ?2)",
            params![token.value.0, token.user_id],
        )?;
        Ok(())
    }
}

impl UserAuthCredentialsStore for SqliteUserStore {
    fn get_password_credentials(&self, user_id: usize) -> Result<Option<PasswordCredentials>> {
        let conn = self.db.lock();
        let raw = conn
            .query_row(
                "SELECT user_id, salt, hash, hasher, created, last_tried, last_used FROM user_password_credentials WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, usize>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, Option<i64>>(5)?,
                        row.get::<_, Option<i64>>(6)?,
                    ))
                },
            )
            .optional()?;

        let Some((user_id, salt, hash, hasher, created, last_tried, last_used)) = raw else {
            return Ok(None);
        };
        Ok(Some(PasswordCredentials {
            user_id,
            salt,
            hash,
            hasher: PortalHasher::from_str(&hasher)?,
            created: system_time_from_column_result(created),
            last_tried: last_tried.map(system_time_from_column_result),
            last_used: last_used.map(system_time_from_column_result),
        }))
    }

    fn set_password_credentials(&self, credentials: &PasswordCredentials) -> Result<()> {
        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO user_password_credentials (user_id, salt, hash, hasher) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET salt = excluded.salt, hash = excluded.hash, hasher = excluded.hasher",
            params![
                credentials.user_id,
                credentials.salt,
                credentials.hash,
                credentials.hasher.to_string()
            ],
        )
        .with_context(|| {
            format!(
                "Failed to store password credentials for user {}",
                credentials.user_id
            )
        })?;
        Ok(())
    }

    fn touch_password_credentials(&self, user_id: usize, succeeded: bool) -> Result<()> {
        let conn = self.db.lock();
        let sql = if succeeded {
            "UPDATE user_password_credentials SET last_tried = ?1, last_used = ?1 WHERE user_id = ?2"
        } else {
            "UPDATE user_password_credentials SET last_tried = ?1 WHERE user_id = ?2"
        };
        conn.execute(sql, params![now_secs(), user_id])?;
        Ok(())
    }
}
