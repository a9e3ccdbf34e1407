//! File-backed medication store.
//!
//! The whole store is one JSON document mapping owner ids to medication
//! lists. Every mutation reads the document, applies the change in memory,
//! and writes the document back through a staging file that replaces the
//! original. Concurrent writers from separate processes can lose updates;
//! the last write wins.
//!
//! File access goes through `cap_std` so the adapter can only touch the
//! directory it was opened with.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use uuid::Uuid;

use crate::domain::medication::{Medication, MedicationDraft, MedicationId};
use crate::domain::ports::{MedicationStore, MedicationStoreError};
use crate::domain::user::UserId;

type Document = HashMap<String, Vec<Medication>>;

/// JSON-document store rooted at a single file.
#[derive(Debug, Clone)]
pub struct JsonFileMedicationStore {
    parent: PathBuf,
    file_name: PathBuf,
}

impl JsonFileMedicationStore {
    /// Open a store over `path`, creating parent directories as needed.
    ///
    /// The file itself is created lazily on the first write; a missing file
    /// reads as an empty store.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| io::Error::other("data file path has no file name"))?;

        Dir::create_ambient_dir_all(&parent, ambient_authority())?;
        Ok(Self { parent, file_name })
    }

    fn open_dir(&self) -> Result<Dir, MedicationStoreError> {
        Dir::open_ambient_dir(&self.parent, ambient_authority())
            .map_err(|err| MedicationStoreError::io(err.to_string()))
    }

    fn load(&self) -> Result<Document, MedicationStoreError> {
        let dir = self.open_dir()?;
        let raw = match dir.read_to_string(&self.file_name) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(err) => return Err(MedicationStoreError::io(err.to_string())),
        };
        serde_json::from_str(&raw).map_err(|err| MedicationStoreError::serialization(err.to_string()))
    }

    fn persist(&self, document: &Document) -> Result<(), MedicationStoreError> {
        let dir = self.open_dir()?;
        let raw = serde_json::to_vec_pretty(document)
            .map_err(|err| MedicationStoreError::serialization(err.to_string()))?;

        let staging = PathBuf::from(format!(".tmp-medications-{}", Uuid::new_v4().simple()));
        dir.write(&staging, &raw)
            .map_err(|err| MedicationStoreError::io(err.to_string()))?;

        let result = replace_file(&dir, &staging, &self.file_name);
        if result.is_err() {
            let _cleanup = dir.remove_file(&staging);
        }
        result.map_err(|err| MedicationStoreError::io(err.to_string()))
    }

    fn owner_key(owner: &UserId) -> String {
        owner.to_string()
    }
}

fn replace_file(dir: &Dir, from: &Path, to: &Path) -> io::Result<()> {
    match dir.remove_file(to) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(from, dir, to)
}

#[async_trait]
impl MedicationStore for JsonFileMedicationStore {
    async fn list(&self, owner: &UserId) -> Result<Vec<Medication>, MedicationStoreError> {
        Ok(self
            .load()?
            .remove(&Self::owner_key(owner))
            .unwrap_or_default())
    }

    async fn get(
        &self,
        owner: &UserId,
        id: &MedicationId,
    ) -> Result<Option<Medication>, MedicationStoreError> {
        Ok(self
            .load()?
            .remove(&Self::owner_key(owner))
            .and_then(|list| list.into_iter().find(|med| med.id == *id)))
    }

    async fn add(
        &self,
        owner: &UserId,
        draft: MedicationDraft,
    ) -> Result<Medication, MedicationStoreError> {
        let medication = Medication::from_draft(MedicationId::random(), draft);
        let mut document = self.load()?;
        document
            .entry(Self::owner_key(owner))
            .or_default()
            .push(medication.clone());
        self.persist(&document)?;
        Ok(medication)
    }

    async fn update(
        &self,
        owner: &UserId,
        id: &MedicationId,
        draft: MedicationDraft,
    ) -> Result<Medication, MedicationStoreError> {
        let mut document = self.load()?;
        let list = document
            .get_mut(&Self::owner_key(owner))
            .ok_or_else(|| MedicationStoreError::not_found(id.to_string()))?;
        let slot = list
            .iter_mut()
            .find(|med| med.id == *id)
            .ok_or_else(|| MedicationStoreError::not_found(id.to_string()))?;
        *slot = Medication::from_draft(*id, draft);
        let updated = slot.clone();
        self.persist(&document)?;
        Ok(updated)
    }

    async fn remove(
        &self,
        owner: &UserId,
        id: &MedicationId,
    ) -> Result<(), MedicationStoreError> {
        let mut document = self.load()?;
        let list = document
            .get_mut(&Self::owner_key(owner))
            .ok_or_else(|| MedicationStoreError::not_found(id.to_string()))?;
        let before = list.len();
        list.retain(|med| med.id != *id);
        if list.len() == before {
            return Err(MedicationStoreError::not_found(id.to_string()));
        }
        self.persist(&document)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::medication::{Color, ScheduleEntry};
    use crate::domain::schedule::WeekdaySet;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> JsonFileMedicationStore {
        JsonFileMedicationStore::open(dir.path().join("medications.json")).expect("open store")
    }

    fn draft(name: &str) -> MedicationDraft {
        MedicationDraft::try_new(
            name,
            "10mg",
            vec![ScheduleEntry::new(
                "08:00".parse().expect("time"),
                WeekdaySet::full_week(),
            )],
            Color::new("#3b82f6").expect("colour"),
            Some("Take with food".to_owned()),
        )
        .expect("valid draft")
    }

    #[tokio::test]
    async fn missing_file_reads_as_an_empty_store() {
        let dir = TempDir::new().expect("temp dir");
        let store = store(&dir);
        let listed = store.list(&UserId::random()).await.expect("list");
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn add_then_get_round_trips_through_the_file() {
        let dir = TempDir::new().expect("temp dir");
        let owner = UserId::random();
        let added = store(&dir)
            .add(&owner, draft("Lisinopril"))
            .await
            .expect("add");

        // A fresh adapter over the same path sees the persisted record.
        let reopened = store(&dir);
        let fetched = reopened
            .get(&owner, &added.id)
            .await
            .expect("get")
            .expect("present");
        assert_eq!(fetched, added);
    }

    #[tokio::test]
    async fn update_of_unknown_id_leaves_the_file_unchanged() {
        let dir = TempDir::new().expect("temp dir");
        let owner = UserId::random();
        let s = store(&dir);
        let added = s.add(&owner, draft("Lisinopril")).await.expect("add");

        let missing = MedicationId::random();
        let err = s
            .update(&owner, &missing, draft("Ibuprofen"))
            .await
            .expect_err("unknown id");
        assert_eq!(err, MedicationStoreError::not_found(missing.to_string()));
        assert_eq!(s.list(&owner).await.expect("list"), vec![added]);
    }

    #[tokio::test]
    async fn remove_rewrites_the_document_without_the_record() {
        let dir = TempDir::new().expect("temp dir");
        let owner = UserId::random();
        let s = store(&dir);
        let first = s.add(&owner, draft("Lisinopril")).await.expect("add");
        let second = s.add(&owner, draft("Ibuprofen")).await.expect("add");

        s.remove(&owner, &first.id).await.expect("remove");
        assert_eq!(s.list(&owner).await.expect("list"), vec![second]);
    }

    #[tokio::test]
    async fn corrupt_documents_surface_as_serialisation_errors() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("medications.json");
        std::fs::write(&path, b"{ not json").expect("write corrupt file");

        let s = JsonFileMedicationStore::open(&path).expect("open store");
        let err = s.list(&UserId::random()).await.expect_err("corrupt file");
        assert!(matches!(err, MedicationStoreError::Serialization { .. }));
    }

    #[tokio::test]
    async fn owners_are_partitioned_within_one_document() {
        let dir = TempDir::new().expect("temp dir");
        let s = store(&dir);
        let alice = UserId::random();
        let bob = UserId::random();
        s.add(&alice, draft("Lisinopril")).await.expect("add");
        s.add(&bob, draft("Ibuprofen")).await.expect("add");

        let alice_list = s.list(&alice).await.expect("list");
        assert_eq!(alice_list.len(), 1);
        assert_eq!(alice_list[0].name, "Lisinopril");
    }
}
