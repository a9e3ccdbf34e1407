//! Log-backed notification adapter.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{Notifier, NotifierPermission, NotifyError, ReminderNotification};

/// Notifier that emits each reminder as a structured log line.
///
/// Always granted; useful in development and on headless deployments where
/// the operator tails the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    fn permission(&self) -> NotifierPermission {
        NotifierPermission::Granted
    }

    async fn request_permission(&self) -> NotifierPermission {
        NotifierPermission::Granted
    }

    async fn deliver(&self, reminder: &ReminderNotification) -> Result<(), NotifyError> {
        info!(
            medication = %reminder.medication,
            dosage = %reminder.dosage,
            time = %reminder.time,
            auto_dismiss_secs = reminder.auto_dismiss.as_secs(),
            "{}: {}",
            reminder.title(),
            reminder.body(),
        );
        Ok(())
    }
}
