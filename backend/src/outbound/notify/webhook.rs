//! Webhook notification adapter.
//!
//! Reminders are POSTed as JSON to a configured endpoint. Permission starts
//! `Undecided` and becomes `Granted` once a handshake POST is accepted, so
//! a misconfigured endpoint disables reminders instead of queueing timers
//! that can never deliver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::domain::ports::{Notifier, NotifierPermission, NotifyError, ReminderNotification};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Notifier that delivers reminders to an HTTP endpoint.
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: String,
    granted: AtomicBool,
}

impl WebhookNotifier {
    /// Create a notifier targeting `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
            granted: AtomicBool::new(false),
        }
    }

    async fn post(&self, body: serde_json::Value) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| NotifyError::delivery(err.to_string()))?;

        response
            .error_for_status()
            .map(|_| ())
            .map_err(|err| NotifyError::delivery(err.to_string()))
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn permission(&self) -> NotifierPermission {
        if self.granted.load(Ordering::Relaxed) {
            NotifierPermission::Granted
        } else {
            NotifierPermission::Undecided
        }
    }

    async fn request_permission(&self) -> NotifierPermission {
        match self.post(json!({ "type": "handshake" })).await {
            Ok(()) => {
                self.granted.store(true, Ordering::Relaxed);
                NotifierPermission::Granted
            }
            Err(err) => {
                warn!(error = %err, endpoint = %self.endpoint, "webhook handshake failed");
                NotifierPermission::Undecided
            }
        }
    }

    async fn deliver(&self, reminder: &ReminderNotification) -> Result<(), NotifyError> {
        self.post(json!({
            "type": "reminder",
            "title": reminder.title(),
            "body": reminder.body(),
            "medication": reminder.medication,
            "dosage": reminder.dosage,
            "time": reminder.time.to_string(),
            "color": reminder.color.as_ref(),
            "autoDismissSeconds": reminder.auto_dismiss.as_secs(),
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn permission_starts_undecided() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/hook");
        assert_eq!(notifier.permission(), NotifierPermission::Undecided);
    }

    #[tokio::test]
    async fn handshake_against_a_dead_endpoint_stays_undecided() {
        // Port 9 (discard) refuses connections on loopback.
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/hook");
        assert_eq!(
            notifier.request_permission().await,
            NotifierPermission::Undecided
        );
        assert_eq!(notifier.permission(), NotifierPermission::Undecided);
    }

    #[tokio::test]
    async fn delivery_against_a_dead_endpoint_fails() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/hook");
        let med = crate::domain::Medication::from_draft(
            crate::domain::MedicationId::random(),
            crate::domain::MedicationDraft::try_new(
                "Lisinopril",
                "10mg",
                Vec::new(),
                crate::domain::Color::new("#3b82f6").expect("colour"),
                None,
            )
            .expect("valid draft"),
        );
        let reminder =
            ReminderNotification::for_dose(&med, "08:00".parse().expect("time"));
        let err = notifier.deliver(&reminder).await.expect_err("dead endpoint");
        assert!(matches!(err, NotifyError::Delivery { .. }));
    }
}
