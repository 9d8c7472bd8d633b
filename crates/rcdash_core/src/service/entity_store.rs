//! Entity store: the single owner of the dashboard dataset.
//!
//! # Responsibility
//! - Provide generic list/get/add/update/delete over the five collections.
//! - Route every delete through the integrity engine.
//! - Persist changed collections through a `CollectionStore`.
//!
//! # Invariants
//! - Mutations run on a working copy. Changed collections are written with
//!   exactly one `save_batch`, and memory is swapped only after it succeeds.
//! - `update` replaces a record in place and never cascades.
//! - Deleting an absent id is a no-op that still reports success.

use crate::clock::Clock;
use crate::integrity::{apply_delete, CascadeSummary};
use crate::model::{
    ComputeResource, Dataset, Entity, EntityKind, EntityRef, Grant, Lab, NoteId, Project,
    Researcher, ResearcherId, ValidationError,
};
use crate::repo::collection_repo::{CollectionStore, RepoError};
use crate::seed::default_dataset;
use crate::service::transfer::{parse_import, validate_dataset};
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure.
#[derive(Debug)]
pub enum StoreError {
    /// Target record does not exist.
    NotFound { kind: EntityKind, id: String },
    /// Researcher exists but holds no note with this id.
    NoteNotFound {
        researcher_id: ResearcherId,
        note_id: NoteId,
    },
    /// `add` was given an id already present in the collection.
    DuplicateId { kind: EntityKind, id: String },
    Validation(ValidationError),
    /// Persistence failed; memory and storage keep their prior state.
    Storage(RepoError),
    /// A stored collection payload could not be decoded or encoded.
    Corrupt { key: &'static str, message: String },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::NoteNotFound {
                researcher_id,
                note_id,
            } => write!(f, "note `{note_id}` not found for researcher `{researcher_id}`"),
            Self::DuplicateId { kind, id } => write!(f, "{kind} `{id}` already exists"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Corrupt { key, message } => {
                write!(f, "stored collection `{key}` is corrupt: {message}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound { .. }
            | Self::NoteNotFound { .. }
            | Self::DuplicateId { .. }
            | Self::Corrupt { .. } => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// `false` when the target was already absent.
    pub removed: bool,
    /// Dependents edited by the cascade. Empty when nothing was removed.
    pub cascade: CascadeSummary,
}

/// In-memory dataset backed by a durable collection store.
pub struct EntityStore<S: CollectionStore, C: Clock> {
    store: S,
    clock: C,
    data: Dataset,
}

impl<S: CollectionStore, C: Clock> EntityStore<S, C> {
    /// Loads all five collections from `store`.
    ///
    /// Collections that were never persisted start from the default dataset
    /// and are written back in one batch. Stored payloads that fail to
    /// decode or validate abort the open with `StoreError::Corrupt`.
    pub fn open(mut store: S, clock: C) -> StoreResult<Self> {
        info!("event=store_open module=store status=start");
        let seed = default_dataset(clock.now());
        let mut data = Dataset::default();
        let mut missing = BTreeSet::new();

        data.researchers = load_collection(&store, &seed, &mut missing)?;
        data.labs = load_collection(&store, &seed, &mut missing)?;
        data.projects = load_collection(&store, &seed, &mut missing)?;
        data.compute_resources = load_collection(&store, &seed, &mut missing)?;
        data.grants = load_collection(&store, &seed, &mut missing)?;

        if !missing.is_empty() {
            let entries = encode_kinds(&data, &missing)?;
            store.save_batch(&entries).map_err(|err| {
                error!("event=store_open module=store status=error stage=seed error={err}");
                StoreError::Storage(err)
            })?;
            info!(
                "event=store_seed module=store status=ok seeded_collections={}",
                missing.len()
            );
        }

        info!(
            "event=store_open module=store status=ok records={} notes={}",
            data.len(),
            data.note_count()
        );
        Ok(Self { store, clock, data })
    }

    /// Current state of every collection.
    pub fn snapshot(&self) -> &Dataset {
        &self.data
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Backend the store persists through.
    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Records of one kind in insertion order.
    pub fn list<T: Entity>(&self) -> &[T] {
        T::collection(&self.data)
    }

    pub fn get<T: Entity>(&self, id: &T::Id) -> Option<&T> {
        self.data.find::<T>(id)
    }

    /// Appends a new record.
    ///
    /// # Errors
    /// - `Validation` when the record is malformed. New grants need a PI.
    /// - `DuplicateId` when the id is already taken.
    /// - `Storage` when persisting fails.
    pub fn add<T: Entity>(&mut self, record: T) -> StoreResult<T> {
        record.validate_new()?;
        if self.data.contains::<T>(record.id()) {
            warn!(
                "event=entity_add module=store status=error kind={} id={} reason=duplicate_id",
                T::KIND.collection_key(),
                record.id()
            );
            return Err(StoreError::DuplicateId {
                kind: T::KIND,
                id: record.id().to_string(),
            });
        }

        let mut working = self.data.clone();
        T::collection_mut(&mut working).push(record.clone());
        self.commit(working, BTreeSet::from([T::KIND]))?;
        info!(
            "event=entity_add module=store status=ok kind={} id={}",
            T::KIND.collection_key(),
            record.id()
        );
        Ok(record)
    }

    /// Replaces the stored record with the same id, keeping its position.
    ///
    /// Never touches other records, even when references changed.
    pub fn update<T: Entity>(&mut self, record: T) -> StoreResult<T> {
        record.validate()?;
        let mut working = self.data.clone();
        if !working.replace(record.clone()) {
            return Err(StoreError::NotFound {
                kind: T::KIND,
                id: record.id().to_string(),
            });
        }

        self.commit(working, BTreeSet::from([T::KIND]))?;
        info!(
            "event=entity_update module=store status=ok kind={} id={}",
            T::KIND.collection_key(),
            record.id()
        );
        Ok(record)
    }

    /// Deletes one record and cascades to its dependents.
    pub fn delete<T: Entity>(&mut self, id: &T::Id) -> StoreResult<DeleteOutcome> {
        self.delete_ref(&T::reference(id))
    }

    /// Untyped form of [`EntityStore::delete`].
    pub fn delete_ref(&mut self, target: &EntityRef) -> StoreResult<DeleteOutcome> {
        let mut working = self.data.clone();
        let Some(cascade) = apply_delete(&mut working, target) else {
            debug!(
                "event=entity_delete module=store status=ok kind={} id={} removed=false",
                target.kind().collection_key(),
                target.id_str()
            );
            return Ok(DeleteOutcome::default());
        };

        let mut touched: BTreeSet<EntityKind> = cascade.edited.keys().copied().collect();
        touched.insert(target.kind());
        self.commit(working, touched)?;

        info!(
            "event=entity_delete module=store status=ok kind={} id={} removed=true",
            target.kind().collection_key(),
            target.id_str()
        );
        debug!(
            "event=cascade_apply module=integrity status=ok kind={} id={} edited={} collections={}",
            target.kind().collection_key(),
            target.id_str(),
            cascade.edited_count(),
            cascade.edited.len()
        );
        Ok(DeleteOutcome {
            removed: true,
            cascade,
        })
    }

    /// Replaces all five collections at once. Nothing is merged.
    pub fn replace_all(&mut self, dataset: Dataset) -> StoreResult<()> {
        validate_dataset(&dataset)?;
        self.commit(dataset, EntityKind::ALL.into_iter().collect())?;
        info!(
            "event=store_replace_all module=store status=ok records={}",
            self.data.len()
        );
        Ok(())
    }

    /// Parses an export document and installs it with [`EntityStore::replace_all`].
    ///
    /// Collections missing from the document fall back to the default
    /// dataset. On any failure memory and storage stay untouched.
    pub fn import_document(&mut self, json: &str) -> StoreResult<()> {
        let fallback = default_dataset(self.clock.now());
        let dataset = parse_import(json, &fallback).map_err(|err| {
            warn!("event=store_import module=transfer status=error reason=invalid_document");
            StoreError::Validation(err)
        })?;
        self.replace_all(dataset)
    }

    /// Persists `touched` collections of `working`, then installs it.
    pub(crate) fn commit(
        &mut self,
        working: Dataset,
        touched: BTreeSet<EntityKind>,
    ) -> StoreResult<()> {
        let entries = encode_kinds(&working, &touched)?;
        if let Err(err) = self.store.save_batch(&entries) {
            error!(
                "event=store_commit module=store status=error collections={} error={err}",
                entries.len()
            );
            return Err(StoreError::Storage(err));
        }
        self.data = working;
        Ok(())
    }
}

fn load_collection<T: Entity>(
    store: &impl CollectionStore,
    seed: &Dataset,
    missing: &mut BTreeSet<EntityKind>,
) -> StoreResult<Vec<T>> {
    let key = T::KIND.collection_key();
    let Some(payload) = store.load(key)? else {
        missing.insert(T::KIND);
        return Ok(T::collection(seed).to_vec());
    };

    let records: Vec<T> = serde_json::from_str(&payload).map_err(|err| {
        error!("event=store_open module=store status=error key={key} reason=decode");
        StoreError::Corrupt {
            key,
            message: err.to_string(),
        }
    })?;
    for record in &records {
        record.validate().map_err(|err| StoreError::Corrupt {
            key,
            message: err.to_string(),
        })?;
    }
    Ok(records)
}

fn encode_kinds(
    data: &Dataset,
    kinds: &BTreeSet<EntityKind>,
) -> StoreResult<Vec<(&'static str, String)>> {
    kinds
        .iter()
        .map(|kind| match kind {
            EntityKind::Researcher => encode::<Researcher>(data),
            EntityKind::Lab => encode::<Lab>(data),
            EntityKind::Project => encode::<Project>(data),
            EntityKind::ComputeResource => encode::<ComputeResource>(data),
            EntityKind::Grant => encode::<Grant>(data),
        })
        .collect()
}

fn encode<T: Entity>(data: &Dataset) -> StoreResult<(&'static str, String)> {
    let key = T::KIND.collection_key();
    let payload = serde_json::to_string(T::collection(data)).map_err(|err| StoreError::Corrupt {
        key,
        message: err.to_string(),
    })?;
    Ok((key, payload))
}

#[cfg(test)]
mod tests {
    use super::{EntityStore, StoreError};
    use crate::clock::FixedClock;
    use crate::model::{EntityKind, Lab, Researcher};
    use crate::repo::collection_repo::{CollectionStore, MemoryCollectionStore};
    use chrono::{TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn first_open_seeds_and_persists_every_collection() {
        let store = EntityStore::open(MemoryCollectionStore::new(), clock()).unwrap();
        assert_eq!(store.list::<Researcher>().len(), 3);
        assert_eq!(store.backend().write_count(), 1);
        for kind in EntityKind::ALL {
            assert!(store.backend().get(kind.collection_key()).is_some());
        }
    }

    #[test]
    fn reopen_reads_persisted_state_without_reseeding() {
        let mut store = EntityStore::open(MemoryCollectionStore::new(), clock()).unwrap();
        store.delete::<Lab>(&"l1".into()).unwrap();
        let backend = store.backend().clone();

        let reopened = EntityStore::open(backend, clock()).unwrap();
        assert!(reopened.get::<Lab>(&"l1".into()).is_none());
        assert_eq!(reopened.backend().write_count(), 2);
    }

    #[test]
    fn corrupt_payload_fails_open() {
        let mut backend = MemoryCollectionStore::new();
        backend.insert_raw("labs", "{not json");
        let err = EntityStore::open(backend, clock()).err().unwrap();
        assert!(matches!(err, StoreError::Corrupt { key: "labs", .. }));
    }

    #[test]
    fn partially_persisted_backend_only_seeds_missing_keys() {
        let mut backend = MemoryCollectionStore::new();
        backend.insert_raw("labs", "[]");
        let store = EntityStore::open(backend, clock()).unwrap();
        assert!(store.list::<Lab>().is_empty());
        assert_eq!(store.list::<Researcher>().len(), 3);
        assert_eq!(store.backend().load("labs").unwrap().as_deref(), Some("[]"));
    }
}
