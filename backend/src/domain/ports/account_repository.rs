//! Driven port for accounts and auth tokens.
//!
//! The router asks this port whether handles exist, creates accounts, checks
//! credentials, and issues or revokes the tokens carried by session cookies.
//! Password storage is entirely the adapter's concern.

use async_trait::async_trait;
use pagination::PageWindow;

use crate::domain::{AuthToken, Identity, LoginCredentials, UserId, UserName};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum AccountRepositoryError for "account repository"
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Whether an account with this handle exists.
    async fn user_exists(&self, name: &UserName) -> Result<bool, AccountRepositoryError>;

    /// Resolve a handle to its user id.
    async fn find_user_id(&self, name: &UserName)
    -> Result<Option<UserId>, AccountRepositoryError>;

    /// Create an account and issue its first auth token.
    async fn add_user(
        &self,
        name: &UserName,
        password: &str,
    ) -> Result<AuthToken, AccountRepositoryError>;

    /// Check a handle/password pair.
    async fn verify_password(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<bool, AccountRepositoryError>;

    /// Issue a new auth token for an existing account, replacing any earlier
    /// token.
    async fn add_auth(&self, name: &UserName) -> Result<AuthToken, AccountRepositoryError>;

    /// Revoke the account's current auth token.
    async fn delete_auth(&self, name: &UserName) -> Result<(), AccountRepositoryError>;

    /// Identity owning a live auth token, if any.
    async fn identity_for_token(
        &self,
        token: &AuthToken,
    ) -> Result<Option<Identity>, AccountRepositoryError>;

    /// Most recently registered handles, newest first.
    async fn newest_users(
        &self,
        window: &PageWindow,
    ) -> Result<Vec<UserName>, AccountRepositoryError>;
}
