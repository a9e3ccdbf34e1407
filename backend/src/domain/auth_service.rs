//! Credential-backed implementation of the authentication driving port.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::auth::{LoginCredentials, PasswordHash, Registration};
use crate::domain::error::Error;
use crate::domain::ports::{AuthService, NewUser, UserRepository, UserRepositoryError};
use crate::domain::user::{User, UserId, Username};

/// Authentication service over a [`UserRepository`].
///
/// Registered accounts carry a salted credential digest; guests are
/// anonymous accounts with an unguessable credential, reachable only while
/// their session cookie lives.
#[derive(Clone)]
pub struct CredentialAuthService<R> {
    users: Arc<R>,
}

impl<R> CredentialAuthService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateUsername { .. } => {
            Error::conflict("username is already taken")
        }
    }
}

#[async_trait]
impl<R> AuthService for CredentialAuthService<R>
where
    R: UserRepository,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let record = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_repository_error)?;

        // Unknown usernames and wrong passwords fail identically.
        match record {
            Some(record) if record.password.verify(credentials.password()) => Ok(record.user),
            _ => Err(Error::unauthorized("invalid credentials")),
        }
    }

    async fn register(&self, registration: Registration) -> Result<User, Error> {
        self.users
            .create(NewUser {
                id: UserId::random(),
                username: registration.username().clone(),
                password: PasswordHash::digest(registration.password()),
                is_guest: false,
                email: registration.email().cloned(),
            })
            .await
            .map_err(map_repository_error)
    }

    async fn create_guest(&self) -> Result<User, Error> {
        let id = UserId::random();
        // Unique per guest; the session cookie is the only way back in.
        let username = Username::new(format!("guest-{}", id.as_uuid().simple()))
            .map_err(|err| Error::internal(format!("invalid guest username: {err}")))?;
        let throwaway = PasswordHash::digest(&hex::encode(rand::random::<[u8; 32]>()));

        self.users
            .create(NewUser {
                id,
                username,
                password: throwaway,
                is_guest: true,
                email: None,
            })
            .await
            .map_err(map_repository_error)
    }

    async fn user_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_repository_error)
    }
}
