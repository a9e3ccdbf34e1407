//! Driven port for medication persistence.
//!
//! The store keeps each owner's medications as one list and mutates it
//! wholesale: adapters read the full list, apply the change, and write the
//! full list back. There is no partial update and no isolation between
//! concurrent writers; the last write wins. Within a single process the
//! handlers serialise access, so the hazard only exists across processes.

use async_trait::async_trait;

use crate::domain::medication::{Medication, MedicationDraft, MedicationId};
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by medication store adapters.
    pub enum MedicationStoreError {
        /// Reading or writing the backing blob failed.
        Io { message: String } =>
            "medication store I/O failed: {message}",
        /// Serialising or deserialising the stored list failed.
        Serialization { message: String } =>
            "medication store serialisation failed: {message}",
        /// The identified medication does not exist for this owner.
        NotFound { id: String } =>
            "medication {id} not found",
    }
}

/// Port for per-owner medication CRUD.
///
/// `update` and `remove` on an unknown id fail with
/// [`MedicationStoreError::NotFound`] and leave the store unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MedicationStore: Send + Sync {
    /// All medications belonging to `owner`, in insertion order.
    async fn list(&self, owner: &UserId) -> Result<Vec<Medication>, MedicationStoreError>;

    /// A single medication, or `None` when the id is unknown.
    async fn get(
        &self,
        owner: &UserId,
        id: &MedicationId,
    ) -> Result<Option<Medication>, MedicationStoreError>;

    /// Persist a new medication, assigning its identifier.
    async fn add(
        &self,
        owner: &UserId,
        draft: MedicationDraft,
    ) -> Result<Medication, MedicationStoreError>;

    /// Replace every field except the id of an existing medication.
    async fn update(
        &self,
        owner: &UserId,
        id: &MedicationId,
        draft: MedicationDraft,
    ) -> Result<Medication, MedicationStoreError>;

    /// Delete a medication.
    async fn remove(&self, owner: &UserId, id: &MedicationId)
    -> Result<(), MedicationStoreError>;
}

/// Fixture implementation for tests that do not exercise persistence.
///
/// Lists are always empty, `add` echoes the draft with a fresh id, and
/// id-addressed operations report `NotFound`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMedicationStore;

#[async_trait]
impl MedicationStore for FixtureMedicationStore {
    async fn list(&self, _owner: &UserId) -> Result<Vec<Medication>, MedicationStoreError> {
        Ok(Vec::new())
    }

    async fn get(
        &self,
        _owner: &UserId,
        _id: &MedicationId,
    ) -> Result<Option<Medication>, MedicationStoreError> {
        Ok(None)
    }

    async fn add(
        &self,
        _owner: &UserId,
        draft: MedicationDraft,
    ) -> Result<Medication, MedicationStoreError> {
        Ok(Medication::from_draft(MedicationId::random(), draft))
    }

    async fn update(
        &self,
        _owner: &UserId,
        id: &MedicationId,
        _draft: MedicationDraft,
    ) -> Result<Medication, MedicationStoreError> {
        Err(MedicationStoreError::not_found(id.to_string()))
    }

    async fn remove(
        &self,
        _owner: &UserId,
        id: &MedicationId,
    ) -> Result<(), MedicationStoreError> {
        Err(MedicationStoreError::not_found(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::medication::Color;

    fn draft() -> MedicationDraft {
        MedicationDraft::try_new(
            "Lisinopril",
            "10mg",
            Vec::new(),
            Color::new("#3b82f6").expect("colour"),
            None,
        )
        .expect("valid draft")
    }

    #[tokio::test]
    async fn fixture_list_is_empty() {
        let store = FixtureMedicationStore;
        let listed = store.list(&UserId::random()).await.expect("list");
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn fixture_add_assigns_an_id() {
        let store = FixtureMedicationStore;
        let added = store.add(&UserId::random(), draft()).await.expect("add");
        assert_eq!(added.name, "Lisinopril");
    }

    #[tokio::test]
    async fn fixture_update_reports_not_found() {
        let store = FixtureMedicationStore;
        let id = MedicationId::random();
        let err = store
            .update(&UserId::random(), &id, draft())
            .await
            .expect_err("unknown id");
        assert_eq!(err, MedicationStoreError::not_found(id.to_string()));
    }
}
