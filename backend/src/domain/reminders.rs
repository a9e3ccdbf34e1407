//! Reminder scheduling for the remainder of the current day.
//!
//! One [`ReminderScheduler`] instance lives in the server state and owns
//! every pending reminder task. Rescheduling an owner is cancel-all-then-
//! arrange-all under a single lock, so callers never observe a partially
//! replaced set and repeated calls with the same list never accumulate
//! duplicate reminders.
//!
//! The mechanism is deliberately best-effort: handles are in-memory tokio
//! timers, a process restart clears them, and the next reschedule re-derives
//! them from the stored list. Only doses later today are ever arranged.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use mockable::Clock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::medication::Medication;
use crate::domain::ports::{Notifier, NotifierPermission, ReminderNotification};
use crate::domain::schedule::weekday_number;
use crate::domain::user::UserId;

/// Arranges and cancels deferred reminder deliveries per owner.
pub struct ReminderScheduler {
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    pending: Mutex<HashMap<UserId, Vec<JoinHandle<()>>>>,
}

impl ReminderScheduler {
    /// Create a scheduler delivering through `notifier` on `clock` time.
    pub fn new(notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifier,
            clock,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Current delivery capability.
    pub fn permission(&self) -> NotifierPermission {
        self.notifier.permission()
    }

    /// Ask the notification capability for permission.
    pub async fn request_permission(&self) -> NotifierPermission {
        self.notifier.request_permission().await
    }

    /// Replace the owner's arranged reminders with ones derived from
    /// `medications`, returning how many were arranged.
    ///
    /// Every previously arranged reminder for the owner is cancelled first.
    /// Without granted permission nothing is arranged and the call is a
    /// silent no-op beyond the cancellation.
    pub fn reschedule(&self, owner: &UserId, medications: &[Medication]) -> usize {
        let mut pending = self.lock_pending();
        Self::cancel_entry(pending.remove(owner));

        if self.notifier.permission() != NotifierPermission::Granted {
            debug!(owner = %owner, "reminders not arranged: permission not granted");
            return 0;
        }

        let now = self.clock.local().naive_local();
        let today = now.date();
        let weekday = weekday_number(today);

        let mut handles = Vec::new();
        for medication in medications {
            for entry in &medication.schedule {
                if !entry.days.contains(weekday) {
                    continue;
                }
                let due = entry.time.on(today);
                if due <= now {
                    continue;
                }
                let Ok(delay) = (due - now).to_std() else {
                    continue;
                };

                let notifier = Arc::clone(&self.notifier);
                let reminder = ReminderNotification::for_dose(medication, entry.time);
                handles.push(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Err(err) = notifier.deliver(&reminder).await {
                        warn!(error = %err, medication = %reminder.medication, "reminder delivery failed");
                    }
                }));
            }
        }

        let arranged = handles.len();
        debug!(owner = %owner, arranged, "reminders rescheduled");
        if arranged > 0 {
            pending.insert(*owner, handles);
        }
        arranged
    }

    /// Number of reminders currently arranged for the owner.
    pub fn pending(&self, owner: &UserId) -> usize {
        self.lock_pending().get(owner).map_or(0, Vec::len)
    }

    /// Cancel every arranged reminder for the owner without rearranging.
    pub fn cancel_all(&self, owner: &UserId) {
        Self::cancel_entry(self.lock_pending().remove(owner));
    }

    fn cancel_entry(handles: Option<Vec<JoinHandle<()>>>) {
        for handle in handles.into_iter().flatten() {
            handle.abort();
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<UserId, Vec<JoinHandle<()>>>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            // A panic while holding the lock only drops timer handles; the
            // map itself is still structurally sound.
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        for handles in self.lock_pending().values() {
            for handle in handles {
                handle.abort();
            }
        }
    }
}
