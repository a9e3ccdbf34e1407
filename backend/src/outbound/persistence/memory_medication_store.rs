//! In-memory medication store.
//!
//! The default backend when no data file is configured, and the store
//! double unit tests reach for. Semantics match the file-backed adapter:
//! one list per owner, mutated wholesale.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::medication::{Medication, MedicationDraft, MedicationId};
use crate::domain::ports::{MedicationStore, MedicationStoreError};
use crate::domain::user::UserId;

/// Mutex-guarded map of owner id to medication list.
#[derive(Debug, Default)]
pub struct MemoryMedicationStore {
    lists: Mutex<HashMap<UserId, Vec<Medication>>>,
}

impl MemoryMedicationStore {
    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, Vec<Medication>>> {
        match self.lists.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl MedicationStore for MemoryMedicationStore {
    async fn list(&self, owner: &UserId) -> Result<Vec<Medication>, MedicationStoreError> {
        Ok(self.lock().get(owner).cloned().unwrap_or_default())
    }

    async fn get(
        &self,
        owner: &UserId,
        id: &MedicationId,
    ) -> Result<Option<Medication>, MedicationStoreError> {
        Ok(self
            .lock()
            .get(owner)
            .and_then(|list| list.iter().find(|med| med.id == *id).cloned()))
    }

    async fn add(
        &self,
        owner: &UserId,
        draft: MedicationDraft,
    ) -> Result<Medication, MedicationStoreError> {
        let medication = Medication::from_draft(MedicationId::random(), draft);
        self.lock()
            .entry(*owner)
            .or_default()
            .push(medication.clone());
        Ok(medication)
    }

    async fn update(
        &self,
        owner: &UserId,
        id: &MedicationId,
        draft: MedicationDraft,
    ) -> Result<Medication, MedicationStoreError> {
        let mut lists = self.lock();
        let list = lists
            .get_mut(owner)
            .ok_or_else(|| MedicationStoreError::not_found(id.to_string()))?;
        let slot = list
            .iter_mut()
            .find(|med| med.id == *id)
            .ok_or_else(|| MedicationStoreError::not_found(id.to_string()))?;
        *slot = Medication::from_draft(*id, draft);
        Ok(slot.clone())
    }

    async fn remove(
        &self,
        owner: &UserId,
        id: &MedicationId,
    ) -> Result<(), MedicationStoreError> {
        let mut lists = self.lock();
        let list = lists
            .get_mut(owner)
            .ok_or_else(|| MedicationStoreError::not_found(id.to_string()))?;
        let before = list.len();
        list.retain(|med| med.id != *id);
        if list.len() == before {
            return Err(MedicationStoreError::not_found(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::medication::{Color, ScheduleEntry};
    use crate::domain::schedule::WeekdaySet;

    fn draft(name: &str) -> MedicationDraft {
        MedicationDraft::try_new(
            name,
            "10mg",
            vec![ScheduleEntry::new(
                "08:00".parse().expect("time"),
                WeekdaySet::full_week(),
            )],
            Color::new("#3b82f6").expect("colour"),
            None,
        )
        .expect("valid draft")
    }

    #[tokio::test]
    async fn add_then_get_round_trips_the_draft() {
        let store = MemoryMedicationStore::default();
        let owner = UserId::random();

        let added = store.add(&owner, draft("Lisinopril")).await.expect("add");
        let fetched = store
            .get(&owner, &added.id)
            .await
            .expect("get")
            .expect("present");
        assert_eq!(fetched, added);
        assert_eq!(fetched.name, "Lisinopril");
    }

    #[tokio::test]
    async fn update_replaces_all_fields_except_the_id() {
        let store = MemoryMedicationStore::default();
        let owner = UserId::random();
        let added = store.add(&owner, draft("Lisinopril")).await.expect("add");

        let updated = store
            .update(&owner, &added.id, draft("Ibuprofen"))
            .await
            .expect("update");
        assert_eq!(updated.id, added.id);
        assert_eq!(updated.name, "Ibuprofen");
        assert_eq!(store.list(&owner).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn update_of_unknown_id_leaves_the_store_unchanged() {
        let store = MemoryMedicationStore::default();
        let owner = UserId::random();
        let added = store.add(&owner, draft("Lisinopril")).await.expect("add");

        let missing = MedicationId::random();
        let err = store
            .update(&owner, &missing, draft("Ibuprofen"))
            .await
            .expect_err("unknown id");
        assert_eq!(err, MedicationStoreError::not_found(missing.to_string()));
        assert_eq!(store.list(&owner).await.expect("list"), vec![added]);
    }

    #[tokio::test]
    async fn remove_deletes_only_the_named_record() {
        let store = MemoryMedicationStore::default();
        let owner = UserId::random();
        let first = store.add(&owner, draft("Lisinopril")).await.expect("add");
        let second = store.add(&owner, draft("Ibuprofen")).await.expect("add");

        store.remove(&owner, &first.id).await.expect("remove");
        assert_eq!(store.list(&owner).await.expect("list"), vec![second]);

        let err = store
            .remove(&owner, &first.id)
            .await
            .expect_err("already gone");
        assert_eq!(err, MedicationStoreError::not_found(first.id.to_string()));
    }

    #[tokio::test]
    async fn owners_do_not_see_each_other() {
        let store = MemoryMedicationStore::default();
        let alice = UserId::random();
        let bob = UserId::random();
        store.add(&alice, draft("Lisinopril")).await.expect("add");

        assert!(store.list(&bob).await.expect("list").is_empty());
    }
}
