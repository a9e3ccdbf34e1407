//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe how the domain expects to reach adapters (stores,
//! repositories, notification channels); driving ports describe the
//! use-cases inbound adapters invoke. Each trait exposes strongly typed
//! errors so adapters map their failures into predictable variants instead
//! of returning `anyhow::Result`.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_service;
mod medication_store;
mod notifier;
mod user_repository;

pub use auth_service::{AuthService, FIXTURE_USER_ID, FixtureAuthService};
#[cfg(test)]
pub use auth_service::MockAuthService;
pub use medication_store::{FixtureMedicationStore, MedicationStore, MedicationStoreError};
#[cfg(test)]
pub use medication_store::MockMedicationStore;
pub use notifier::{
    FixtureNotifier, Notifier, NotifierPermission, NotifyError, REMINDER_AUTO_DISMISS,
    ReminderNotification,
};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use user_repository::{
    CredentialRecord, FixtureUserRepository, NewUser, UserRepository, UserRepositoryError,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
