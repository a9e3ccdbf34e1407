//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend
//! only on domain ports and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ReminderScheduler;
use crate::domain::ports::{AuthService, MedicationStore};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Authentication use-cases.
    pub auth: Arc<dyn AuthService>,
    /// Medication persistence.
    pub medications: Arc<dyn MedicationStore>,
    /// Reminder arrangement for the current day.
    pub reminders: Arc<ReminderScheduler>,
    /// Wall-clock source for timeline projections.
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Bundle the port implementations handlers need.
    pub fn new(
        auth: Arc<dyn AuthService>,
        medications: Arc<dyn MedicationStore>,
        reminders: Arc<ReminderScheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            auth,
            medications,
            reminders,
            clock,
        }
    }
}
