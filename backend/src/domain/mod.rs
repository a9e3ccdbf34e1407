//! Domain primitives, aggregates, services, and ports.
//!
//! Purpose: define the medication-reminder domain independently of any
//! transport or storage technology. Inbound adapters translate HTTP into
//! calls on driving ports; outbound adapters implement the driven ports.
//! Keep types immutable where practical and document invariants and serde
//! contracts in each type's Rustdoc.

pub mod auth;
pub mod auth_service;
pub mod error;
pub mod medication;
pub mod ports;
pub mod reminders;
pub mod schedule;
pub mod timeline;
pub mod user;

pub use self::auth::{
    AuthValidationError, LoginCredentials, PasswordHash, Registration,
};
pub use self::auth_service::CredentialAuthService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::medication::{
    COLOR_PALETTE, Color, Medication, MedicationDraft, MedicationId, MedicationValidationError,
    ScheduleEntry, sample_medications,
};
pub use self::reminders::ReminderScheduler;
pub use self::schedule::{
    ScheduleValidationError, TimeOfDay, WeekdaySet, day_abbrev, day_name, week_dates,
    weekday_number,
};
pub use self::timeline::{
    DailySlot, ParseViewModeError, SlotStatus, Timeline, ViewMode, WeeklyRow, project,
};
pub use self::user::{Email, User, UserId, UserValidationError, Username};
