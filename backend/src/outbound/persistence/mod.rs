//! Persistence adapters: medication stores and user repositories.
//!
//! Two conforming implementations exist for each driven port; startup
//! configuration picks one explicitly (see `crate::server`).

mod diesel_user_repository;
mod json_medication_store;
mod memory_medication_store;
mod memory_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use json_medication_store::JsonFileMedicationStore;
pub use memory_medication_store::MemoryMedicationStore;
pub use memory_user_repository::MemoryUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

/// Migrations compiled into the binary from `migrations/`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Apply pending migrations over a short-lived synchronous connection.
///
/// Runs before the async pool is built; call it from a blocking context.
pub fn run_migrations(database_url: &str) -> Result<(), PoolError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| PoolError::build(format!("migration connection failed: {err}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| PoolError::build(format!("migrations failed: {err}")))?;
    Ok(())
}
