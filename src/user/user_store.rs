use super::auth::{AuthToken, AuthTokenValue, PasswordCredentials};
use super::user_models::{NewUser, ProfileUpdate, User};
use super::UserRole;
use anyhow::Result;

pub trait UserAuthCredentialsStore: Send + Sync {
    /// Returns the password credentials of a user.
    /// Returns Ok(None) if the user has none.
    fn get_password_credentials(&self, user_id: usize) -> Result<Option<PasswordCredentials>>;

    /// Inserts or replaces the password credentials of a user.
    fn set_password_credentials(&self, credentials: &PasswordCredentials) -> Result<()>;

    /// Records a login attempt, successful or not.
    fn touch_password_credentials(&self, user_id: usize, succeeded: bool) -> Result<()>;
}

pub trait UserAuthTokenStore: Send + Sync {
    /// Returns a user's authentication token given an AuthTokenValue.
    /// Returns Ok(None) if the token does not exist.
    fn get_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Deletes an auth token given the token value.
    /// Returns Ok(None) if the token does not exist.
    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Updates an auth token with the latest timestamp.
    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()>;

    /// Adds a new auth token.
    fn add_user_auth_token(&self, token: &AuthToken) -> Result<()>;
}

pub trait UserStore: UserAuthTokenStore + UserAuthCredentialsStore + Send + Sync {
    /// Creates a new user and returns the user id.
    /// Fails if the email is already registered.
    fn create_user(&self, user: &NewUser, role: UserRole) -> Result<usize>;

    /// Returns Ok(None) if the user does not exist.
    fn get_user(&self, user_id: usize) -> Result<Option<User>>;

    /// Returns Ok(None) if no user has the given (normalized) email.
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Returns false if the user does not exist.
    fn update_profile(&self, user_id: usize, update: &ProfileUpdate) -> Result<bool>;

    /// Returns false if the user does not exist.
    fn set_user_role(&self, user_id: usize, role: UserRole) -> Result<bool>;

    fn count_users(&self) -> Result<usize>;

    /// Returns a window of users, newest first.
    fn list_users(&self, offset: usize, limit: usize) -> Result<Vec<User>>;

    /// Deletes a user together with everything that references it.
    /// Returns false if the user does not exist.
    fn delete_user(&self, user_id: usize) -> Result<bool>;
}
