//! Note use-cases on top of the entity store.
//!
//! # Responsibility
//! - Create, edit, delete and list notes owned by one researcher.
//! - Stamp timestamps from the store clock.
//!
//! # Invariants
//! - A note is reachable only through its owning researcher.
//! - `created_at` never changes after creation; `updated_at` moves on edit.
//! - Only the `researchers` collection is written by note operations.

use super::entity_store::{EntityStore, StoreError, StoreResult};
use crate::clock::Clock;
use crate::model::{Entity, Note, NoteId, Researcher, ResearcherId};
use crate::repo::collection_repo::CollectionStore;
use log::{debug, info};
use std::collections::BTreeSet;

impl<S: CollectionStore, C: Clock> EntityStore<S, C> {
    /// Notes of one researcher in creation order.
    pub fn notes(&self, researcher_id: &ResearcherId) -> StoreResult<&[Note]> {
        self.get::<Researcher>(researcher_id)
            .map(|researcher| researcher.notes.as_slice())
            .ok_or_else(|| researcher_not_found(researcher_id))
    }

    /// Appends a new note to `researcher_id`.
    ///
    /// # Errors
    /// - `NotFound` when the researcher does not exist.
    /// - `Storage` when persisting fails.
    pub fn add_note(
        &mut self,
        researcher_id: &ResearcherId,
        content: impl Into<String>,
    ) -> StoreResult<Note> {
        let note = Note::new(researcher_id.clone(), content, self.clock().now());
        let created = note.clone();
        self.edit_researcher(researcher_id, move |researcher| {
            researcher.notes.push(note);
            Ok(())
        })?;
        info!(
            "event=note_add module=notes status=ok researcher_id={researcher_id} note_id={}",
            created.id
        );
        Ok(created)
    }

    /// Replaces the content of an existing note.
    ///
    /// The stored `created_at` is kept, the owner is forced to
    /// `researcher_id` and `updated_at` is refreshed.
    pub fn update_note(&mut self, researcher_id: &ResearcherId, note: Note) -> StoreResult<Note> {
        let now = self.clock().now();
        let mut updated = None;
        self.edit_researcher(researcher_id, |researcher| {
            let slot = researcher
                .notes
                .iter_mut()
                .find(|existing| existing.id == note.id)
                .ok_or_else(|| StoreError::NoteNotFound {
                    researcher_id: researcher_id.clone(),
                    note_id: note.id.clone(),
                })?;
            *slot = Note {
                id: note.id.clone(),
                researcher_id: researcher_id.clone(),
                content: note.content.clone(),
                created_at: slot.created_at,
                updated_at: now,
            };
            updated = Some(slot.clone());
            Ok(())
        })?;

        let updated = updated.ok_or_else(|| StoreError::NoteNotFound {
            researcher_id: researcher_id.clone(),
            note_id: note.id.clone(),
        })?;
        info!(
            "event=note_update module=notes status=ok researcher_id={researcher_id} note_id={}",
            updated.id
        );
        Ok(updated)
    }

    /// Removes one note. Returns `false` when the note was already gone.
    pub fn delete_note(
        &mut self,
        researcher_id: &ResearcherId,
        note_id: &NoteId,
    ) -> StoreResult<bool> {
        let researcher = self
            .get::<Researcher>(researcher_id)
            .ok_or_else(|| researcher_not_found(researcher_id))?;
        if researcher.note(note_id).is_none() {
            debug!(
                "event=note_delete module=notes status=ok researcher_id={researcher_id} note_id={note_id} removed=false"
            );
            return Ok(false);
        }

        self.edit_researcher(researcher_id, |researcher| {
            researcher.notes.retain(|note| &note.id != note_id);
            Ok(())
        })?;
        info!(
            "event=note_delete module=notes status=ok researcher_id={researcher_id} note_id={note_id} removed=true"
        );
        Ok(true)
    }

    fn edit_researcher<F>(&mut self, researcher_id: &ResearcherId, edit: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Researcher) -> StoreResult<()>,
    {
        let mut working = self.snapshot().clone();
        let researcher = Researcher::collection_mut(&mut working)
            .iter_mut()
            .find(|researcher| &researcher.id == researcher_id)
            .ok_or_else(|| researcher_not_found(researcher_id))?;
        edit(researcher)?;
        self.commit(working, BTreeSet::from([Researcher::KIND]))
    }
}

fn researcher_not_found(researcher_id: &ResearcherId) -> StoreError {
    StoreError::NotFound {
        kind: Researcher::KIND,
        id: researcher_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::clock::{Clock, FixedClock};
    use crate::model::{EntityKind, NoteId, Researcher, ResearcherId};
    use crate::repo::collection_repo::MemoryCollectionStore;
    use crate::service::entity_store::{EntityStore, StoreError};
    use chrono::{Duration, TimeZone, Utc};

    fn open() -> EntityStore<MemoryCollectionStore, FixedClock> {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        EntityStore::open(MemoryCollectionStore::new(), clock).unwrap()
    }

    #[test]
    fn add_note_stamps_both_timestamps_and_appends() {
        let mut store = open();
        let r2 = ResearcherId::from("r2");
        let note = store.add_note(&r2, "Budget review").unwrap();

        assert_eq!(note.researcher_id, r2);
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(store.notes(&r2).unwrap(), &[note]);
    }

    #[test]
    fn add_note_for_unknown_researcher_is_an_error() {
        let mut store = open();
        let writes = store.backend().write_count();
        let err = store.add_note(&"ghost".into(), "x").unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound { kind: EntityKind::Researcher, .. }
        ));
        assert_eq!(store.backend().write_count(), writes);
    }

    #[test]
    fn update_note_keeps_created_at_and_forces_owner() {
        let mut store = open();
        let r1 = ResearcherId::from("r1");
        let original = store.notes(&r1).unwrap()[0].clone();

        store.clock().advance(Duration::hours(3));
        let mut edit = original.clone();
        edit.content = "Revised".to_string();
        edit.researcher_id = "r3".into();
        edit.created_at = edit.created_at + Duration::days(30);

        let updated = store.update_note(&r1, edit).unwrap();
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.researcher_id, r1);
        assert_eq!(updated.updated_at, store.clock().now());
        assert_eq!(store.notes(&r1).unwrap()[0].content, "Revised");
    }

    #[test]
    fn update_unknown_note_is_an_error() {
        let mut store = open();
        let r1 = ResearcherId::from("r1");
        let mut ghost = store.notes(&r1).unwrap()[0].clone();
        ghost.id = NoteId::from("n_missing");
        assert!(matches!(
            store.update_note(&r1, ghost).unwrap_err(),
            StoreError::NoteNotFound { .. }
        ));
    }

    #[test]
    fn delete_note_is_idempotent() {
        let mut store = open();
        let r1 = ResearcherId::from("r1");
        let n1 = NoteId::from("n1_1");

        assert!(store.delete_note(&r1, &n1).unwrap());
        assert!(!store.delete_note(&r1, &n1).unwrap());
        assert_eq!(store.notes(&r1).unwrap().len(), 1);
        assert!(store.delete_note(&"ghost".into(), &n1).is_err());
    }

    #[test]
    fn notes_vanish_with_their_researcher() {
        let mut store = open();
        let r1 = ResearcherId::from("r1");
        store.delete::<Researcher>(&r1).unwrap();
        assert!(store.notes(&r1).is_err());
        assert_eq!(store.snapshot().note_count(), 0);
    }
}
