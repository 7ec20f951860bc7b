pub mod auth;
mod context;
pub mod permissions;
mod sqlite_user_store;
mod user_manager;
pub mod user_models;
mod user_store;

pub use auth::{AuthToken, AuthTokenValue, PasswordCredentials};
pub use context::AuthContext;
pub use permissions::{Permission, UserRole};
pub use sqlite_user_store::{
    SqliteUserStore, AUTH_TOKEN_TABLE_V_0, USER_PASSWORD_CREDENTIALS_TABLE_V_0, USER_TABLE_V_0,
};
pub use user_manager::{AccountError, Registration, UserManager};
pub use user_models::{NewUser, ProfileUpdate, User};
pub use user_store::{UserAuthCredentialsStore, UserAuthTokenStore, UserStore};
