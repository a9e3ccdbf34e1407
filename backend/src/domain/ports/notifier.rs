//! Driven port for the platform notification capability.
//!
//! The scheduler does not know how reminders reach the user; it only asks
//! this port whether delivery is permitted and hands over a payload when a
//! dose comes due. Adapters decide what "display" means: a structured log
//! line, a webhook POST, or nothing at all on platforms without a channel.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::medication::{Color, Medication};
use crate::domain::schedule::TimeOfDay;

use super::define_port_error;

/// How long a delivered reminder should stay visible before auto-dismissal.
pub const REMINDER_AUTO_DISMISS: Duration = Duration::from_secs(10);

/// Tri-state delivery capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierPermission {
    /// The platform has no notification channel at all.
    Unsupported,
    /// The user has not decided yet, or has declined.
    Undecided,
    /// Delivery is allowed.
    Granted,
}

impl NotifierPermission {
    /// The wire representation used in status payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::Undecided => "undecided",
            Self::Granted => "granted",
        }
    }
}

define_port_error! {
    /// Errors raised while delivering a reminder.
    pub enum NotifyError {
        /// The delivery channel rejected or dropped the payload.
        Delivery { message: String } =>
            "reminder delivery failed: {message}",
    }
}

/// Payload describing one due dose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderNotification {
    /// Medication display name.
    pub medication: String,
    /// Dosage text.
    pub dosage: String,
    /// The scheduled dose time.
    pub time: TimeOfDay,
    /// Colour tag of the medication.
    pub color: Color,
    /// Visibility hint for the delivering adapter.
    pub auto_dismiss: Duration,
}

impl ReminderNotification {
    /// Build the payload for a medication due at `time`.
    pub fn for_dose(medication: &Medication, time: TimeOfDay) -> Self {
        Self {
            medication: medication.name.clone(),
            dosage: medication.dosage.clone(),
            time,
            color: medication.color.clone(),
            auto_dismiss: REMINDER_AUTO_DISMISS,
        }
    }

    /// Title line shared by every reminder.
    pub fn title(&self) -> &'static str {
        "Time to take your medication!"
    }

    /// Body line, for example "Lisinopril - 10mg at 8:00 AM".
    pub fn body(&self) -> String {
        format!(
            "{} - {} at {}",
            self.medication,
            self.dosage,
            self.time.format_12h()
        )
    }
}

/// Port for querying permission and delivering reminders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Current delivery capability.
    fn permission(&self) -> NotifierPermission;

    /// Ask the platform for permission; returns the resulting state.
    async fn request_permission(&self) -> NotifierPermission;

    /// Deliver one reminder.
    async fn deliver(&self, reminder: &ReminderNotification) -> Result<(), NotifyError>;
}

/// Fixture notifier: always granted, deliveries vanish.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotifier;

#[async_trait]
impl Notifier for FixtureNotifier {
    fn permission(&self) -> NotifierPermission {
        NotifierPermission::Granted
    }

    async fn request_permission(&self) -> NotifierPermission {
        NotifierPermission::Granted
    }

    async fn deliver(&self, _reminder: &ReminderNotification) -> Result<(), NotifyError> {
        Ok(())
    }
}
