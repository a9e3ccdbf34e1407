//! Notification adapters implementing the `Notifier` port.
//!
//! Startup configuration selects exactly one channel: structured log lines,
//! a webhook endpoint, or nothing at all on deployments without a channel.

mod log;
mod webhook;

pub use log::TracingNotifier;
pub use webhook::WebhookNotifier;

use async_trait::async_trait;

use crate::domain::ports::{Notifier, NotifierPermission, NotifyError, ReminderNotification};

/// Notifier for deployments without any notification channel.
///
/// Permission reports `Unsupported`, so the scheduler never arranges
/// reminders and delivery is unreachable in practice.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedNotifier;

#[async_trait]
impl Notifier for UnsupportedNotifier {
    fn permission(&self) -> NotifierPermission {
        NotifierPermission::Unsupported
    }

    async fn request_permission(&self) -> NotifierPermission {
        NotifierPermission::Unsupported
    }

    async fn deliver(&self, _reminder: &ReminderNotification) -> Result<(), NotifyError> {
        Err(NotifyError::delivery("no notification channel configured"))
    }
}
