//! Driven port for user account persistence.

use async_trait::async_trait;

use crate::domain::auth::PasswordHash;
use crate::domain::user::{Email, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// The username is already taken.
        DuplicateUsername { username: String } =>
            "username {username} is already taken",
    }
}

/// A user to be created, with its credential digest.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Caller-assigned identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// Salted credential digest.
    pub password: PasswordHash,
    /// Whether this account came through the guest flow.
    pub is_guest: bool,
    /// Optional contact email.
    pub email: Option<Email>,
}

impl NewUser {
    /// The [`User`] this record becomes once stored.
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            is_guest: self.is_guest,
            email: self.email.clone(),
        }
    }
}

/// A stored user together with its credential digest, as needed by login.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    /// The stored account.
    pub user: User,
    /// Salted digest to verify candidates against.
    pub password: PasswordHash,
}

/// Port for user account storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    ///
    /// Fails with [`UserRepositoryError::DuplicateUsername`] when the
    /// username is already present.
    async fn create(&self, user: NewUser) -> Result<User, UserRepositoryError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch an account and its credential digest by username.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, UserRepositoryError>;
}

/// Fixture repository for tests that do not exercise accounts.
///
/// Lookups return `None`; `create` echoes the stored shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserRepositoryError> {
        Ok(user.to_user())
    }

    async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn find_by_username(
        &self,
        _username: &str,
    ) -> Result<Option<CredentialRecord>, UserRepositoryError> {
        Ok(None)
    }
}
