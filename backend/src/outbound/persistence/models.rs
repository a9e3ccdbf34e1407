//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and are
//! never exposed to the domain; the repository converts them at the edge.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::users;

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password: String,
    pub is_guest: bool,
    pub email: Option<String>,
    #[expect(dead_code, reason = "schema field retained for audit queries")]
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub password: &'a str,
    pub is_guest: bool,
    pub email: Option<&'a str>,
}
