//! Driving port for authentication use-cases.
//!
//! Inbound adapters call this port to authenticate, register, and restore
//! sessions without knowing the backing infrastructure, which keeps handler
//! tests deterministic: they substitute a test double instead of wiring a
//! repository.

use async_trait::async_trait;

use crate::domain::auth::{LoginCredentials, Registration};
use crate::domain::error::Error;
use crate::domain::user::{User, UserId, Username};

/// Domain use-case port for authentication and account lifecycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable: both
    /// fail with `Unauthorized("invalid credentials")`.
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Create a registered account.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Create an anonymous guest account.
    async fn create_guest(&self) -> Result<User, Error>;

    /// Restore a user from a session-held identifier.
    async fn user_by_id(&self, id: &UserId) -> Result<Option<User>, Error>;
}

/// In-memory authenticator for handler tests.
///
/// `edith` / `hunter2` authenticates to a fixed user id; everything else is
/// rejected. Registration echoes the requested account, and guests get a
/// random identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthService;

/// Fixed user id produced by [`FixtureAuthService`].
pub const FIXTURE_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

#[async_trait]
impl AuthService for FixtureAuthService {
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        if credentials.username() == "edith" && credentials.password() == "hunter2" {
            Ok(User {
                id: UserId::new(FIXTURE_USER_ID)
                    .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))?,
                username: Username::new("edith")
                    .map_err(|err| Error::internal(format!("invalid fixture username: {err}")))?,
                is_guest: false,
                email: None,
            })
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }

    async fn register(&self, registration: Registration) -> Result<User, Error> {
        Ok(User {
            id: UserId::random(),
            username: registration.username().clone(),
            is_guest: false,
            email: registration.email().cloned(),
        })
    }

    async fn create_guest(&self) -> Result<User, Error> {
        Ok(User {
            id: UserId::random(),
            username: Username::new("Guest")
                .map_err(|err| Error::internal(format!("invalid fixture username: {err}")))?,
            is_guest: true,
            email: None,
        })
    }

    async fn user_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        if id.to_string() == FIXTURE_USER_ID {
            self.login(
                &LoginCredentials::try_from_parts("edith", "hunter2")
                    .map_err(|err| Error::internal(format!("invalid fixture creds: {err}")))?,
            )
            .await
            .map(Some)
        } else {
            Ok(None)
        }
    }
}
