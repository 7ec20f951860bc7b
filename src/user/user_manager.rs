use super::{
    auth::{AuthToken, AuthTokenValue, PasswordCredentials},
    user_models::{
        normalize_email, validate_contact, validate_name, validate_password, NewUser,
        ProfileUpdate, User,
    },
    UserAuthCredentialsStore, UserAuthTokenStore, UserRole, UserStore,
};
use crate::catalog_query::{paginate, Page, PageRequest};
use crate::document::{BlobStore, Branch, DocumentStore};
use crate::notifications::{Notification, Notifier};
use serde::Deserialize;
use std::{sync::Arc, time::SystemTime};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Invalid(String),
    #[error("An account with email {0} already exists")]
    EmailTaken(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("User {0} not found")]
    NotFound(usize),
    #[error("Administrator accounts cannot be deleted")]
    AdminProtected,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub contact: String,
    pub branch: Branch,
}

pub struct UserManager {
    user_store: Arc<dyn UserStore>,
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    notifier: Arc<dyn Notifier>,
}

impl UserManager {
    pub fn new(
        user_store: Arc<dyn UserStore>,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            user_store,
            documents,
            blobs,
            notifier,
        }
    }

    /// Creates an account with password credentials, without any notification.
    pub fn add_user(&self, registration: &Registration, role: UserRole) -> Result<User, AccountError> {
        let email = normalize_email(&registration.email).map_err(AccountError::Invalid)?;
        validate_name("First name", &registration.first_name).map_err(AccountError::Invalid)?;
        validate_name("Last name", &registration.last_name).map_err(AccountError::Invalid)?;
        validate_contact(&registration.contact).map_err(AccountError::Invalid)?;
        validate_password(&registration.password).map_err(AccountError::Invalid)?;

        if self.user_store.get_user_by_email(&email)?.is_some() {
            return Err(AccountError::EmailTaken(email));
        }

        let user_id = self.user_store.create_user(
            &NewUser {
                email: email.clone(),
                first_name: registration.first_name.trim().to_string(),
                last_name: registration.last_name.trim().to_string(),
                contact: registration.contact.clone(),
                branch: registration.branch,
            },
            role,
        )?;
        self.user_store
            .set_password_credentials(&PasswordCredentials::create(
                user_id,
                &registration.password,
            )?)?;
        info!("Created {} account {} ({})", role.as_str(), user_id, email);

        self.get_user(user_id)
    }

    /// Self-service registration of a student, followed by a best-effort welcome email.
    pub async fn register(&self, registration: Registration) -> Result<User, AccountError> {
        let user = self.add_user(&registration, UserRole::Student)?;
        let welcome = Notification::Welcome {
            first_name: user.first_name.clone(),
        };
        if let Err(err) = self.notifier.notify(&user.email, &welcome).await {
            warn!("Failed to send welcome email to {}: {}", user.email, err);
        }
        Ok(user)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<(User, AuthToken), AccountError> {
        let email = email.trim().to_lowercase();
        let user = self
            .user_store
            .get_user_by_email(&email)?
            .ok_or(AccountError::InvalidCredentials)?;
        let credentials = self
            .user_store
            .get_password_credentials(user.id)?
            .ok_or(AccountError::InvalidCredentials)?;

        let verified = credentials.verify(password)?;
        self.user_store
            .touch_password_credentials(user.id, verified)?;
        if !verified {
            return Err(AccountError::InvalidCredentials);
        }

        let token = AuthToken {
            user_id: user.id,
            created: SystemTime::now(),
            last_used: None,
            value: AuthTokenValue::generate(),
        };
        self.user_store.add_user_auth_token(&token)?;
        Ok((user, token))
    }

    /// Resolves a session token, marking it as used.
    pub fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>, AccountError> {
        let token = self.user_store.get_user_auth_token(value)?;
        if token.is_some() {
            self.user_store
                .update_user_auth_token_last_used_timestamp(value)?;
        }
        Ok(token)
    }

    /// Deletes the token if it belongs to `user_id`. Returns whether a token was deleted.
    pub fn logout(&self, user_id: usize, value: &AuthTokenValue) -> Result<bool, AccountError> {
        match self.user_store.get_user_auth_token(value)? {
            Some(token) if token.user_id == user_id => {
                self.user_store.delete_user_auth_token(value)?;
                Ok(true)
            }
            Some(token) => {
                warn!(
                    "User {} tried to delete a token owned by user {}",
                    user_id, token.user_id
                );
                Ok(false)
            }
            None => Ok(false),
        }
    }

    pub fn get_user(&self, user_id: usize) -> Result<User, AccountError> {
        self.user_store
            .get_user(user_id)?
            .ok_or(AccountError::NotFound(user_id))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AccountError> {
        Ok(self
            .user_store
            .get_user_by_email(&email.trim().to_lowercase())?)
    }

    pub fn update_profile(&self, user_id: usize, update: ProfileUpdate) -> Result<User, AccountError> {
        validate_name("First name", &update.first_name).map_err(AccountError::Invalid)?;
        validate_name("Last name", &update.last_name).map_err(AccountError::Invalid)?;
        validate_contact(&update.contact).map_err(AccountError::Invalid)?;

        let update = ProfileUpdate {
            first_name: update.first_name.trim().to_string(),
            last_name: update.last_name.trim().to_string(),
            ..update
        };
        if !self.user_store.update_profile(user_id, &update)? {
            return Err(AccountError::NotFound(user_id));
        }
        self.get_user(user_id)
    }

    pub fn change_password(
        &self,
        user_id: usize,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let credentials = self
            .user_store
            .get_password_credentials(user_id)?
            .ok_or(AccountError::InvalidCredentials)?;
        if !credentials.verify(old_password)? {
            return Err(AccountError::InvalidCredentials);
        }
        self.set_password(user_id, new_password)
    }

    /// Replaces the password without checking the old one.
    pub fn set_password(&self, user_id: usize, password: &str) -> Result<(), AccountError> {
        validate_password(password).map_err(AccountError::Invalid)?;
        self.get_user(user_id)?;
        self.user_store
            .set_password_credentials(&PasswordCredentials::create(user_id, password)?)?;
        Ok(())
    }

    pub fn set_role(&self, user_id: usize, role: UserRole) -> Result<(), AccountError> {
        if !self.user_store.set_user_role(user_id, role)? {
            return Err(AccountError::NotFound(user_id));
        }
        info!("User {} is now {}", user_id, role.as_str());
        Ok(())
    }

    pub fn count_users(&self) -> Result<usize, AccountError> {
        Ok(self.user_store.count_users()?)
    }

    pub fn list_users(&self, page: PageRequest, page_size: usize) -> Result<Page<User>, AccountError> {
        Ok(paginate(
            page_size,
            page,
            || self.user_store.count_users(),
            |offset, limit| self.user_store.list_users(offset, limit),
        )?)
    }

    /// Deletes a student account with all of its documents.
    ///
    /// Documents go away with the user row; their stored files are removed afterwards,
    /// and failures there are only logged.
    pub async fn delete_user(&self, user_id: usize) -> Result<User, AccountError> {
        let user = self.get_user(user_id)?;
        if user.role.is_admin() {
            return Err(AccountError::AdminProtected);
        }

        let document_ids = self.documents.get_document_ids_by_owner(user_id)?;
        if !self.user_store.delete_user(user_id)? {
            return Err(AccountError::NotFound(user_id));
        }
        info!(
            "Deleted user {} ({}) and {} documents",
            user_id,
            user.email,
            document_ids.len()
        );

        for document_id in document_ids {
            if let Err(err) = self.blobs.delete(document_id).await {
                warn!(
                    "Failed to delete file of document {} owned by deleted user {}: {}",
                    document_id, user_id, err
                );
            }
        }
        Ok(user)
    }
}
