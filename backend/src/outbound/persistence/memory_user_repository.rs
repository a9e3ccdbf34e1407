//! In-memory user repository.
//!
//! The account backend when no database URL is configured. Accounts live
//! for the process lifetime only; sessions pointing at a restarted process
//! resolve to no user and fall back to the login screen.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::auth::PasswordHash;
use crate::domain::ports::{CredentialRecord, NewUser, UserRepository, UserRepositoryError};
use crate::domain::user::{User, UserId};

#[derive(Debug, Clone)]
struct StoredAccount {
    user: User,
    password: PasswordHash,
}

/// Mutex-guarded map of user id to account.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    accounts: Mutex<HashMap<UserId, StoredAccount>>,
}

impl MemoryUserRepository {
    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, StoredAccount>> {
        match self.accounts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserRepositoryError> {
        let mut accounts = self.lock();
        if accounts
            .values()
            .any(|account| account.user.username == user.username)
        {
            return Err(UserRepositoryError::duplicate_username(
                user.username.to_string(),
            ));
        }

        let stored = StoredAccount {
            user: user.to_user(),
            password: user.password,
        };
        let created = stored.user.clone();
        accounts.insert(user.id, stored);
        Ok(created)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock().get(id).map(|account| account.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, UserRepositoryError> {
        Ok(self
            .lock()
            .values()
            .find(|account| account.user.username.as_ref() == username)
            .map(|account| CredentialRecord {
                user: account.user.clone(),
                password: account.password.clone(),
            }))
    }
}
