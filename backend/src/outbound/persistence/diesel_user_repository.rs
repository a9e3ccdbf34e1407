//! PostgreSQL-backed `UserRepository` implementation using Diesel.
//!
//! Registered-mode account storage. Unique-violation on the username column
//! is surfaced as the port's `DuplicateUsername` variant so the domain can
//! answer with a conflict instead of a generic failure.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::auth::PasswordHash;
use crate::domain::ports::{CredentialRecord, NewUser, UserRepository, UserRepositoryError};
use crate::domain::user::{Email, User, UserId, Username};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error, username: &str) -> UserRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            UserRepositoryError::duplicate_username(username)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserRepositoryError::connection("database connection error")
        }
        DieselError::NotFound => UserRepositoryError::query("record not found"),
        _ => UserRepositoryError::query("database error"),
    }
}

fn row_to_user(row: &UserRow) -> Result<User, UserRepositoryError> {
    let username = Username::new(row.username.clone())
        .map_err(|err| UserRepositoryError::query(format!("invalid username in database: {err}")))?;
    let email = row
        .email
        .as_deref()
        .map(Email::new)
        .transpose()
        .map_err(|err| UserRepositoryError::query(format!("invalid email in database: {err}")))?;

    Ok(User {
        id: UserId::from_uuid(row.id),
        username,
        is_guest: row.is_guest,
        email,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewUserRow {
            id: *user.id.as_uuid(),
            username: user.username.as_ref(),
            password: user.password.as_encoded(),
            is_guest: user.is_guest,
            email: user.email.as_ref().map(AsRef::as_ref),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, user.username.as_ref()))?;

        Ok(user.to_user())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, ""))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, username))?;

        row.map(|row| {
            Ok(CredentialRecord {
                user: row_to_user(&row)?,
                password: PasswordHash::from_encoded(row.password),
            })
        })
        .transpose()
    }
}
