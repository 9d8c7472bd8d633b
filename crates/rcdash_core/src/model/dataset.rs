//! The five collections as one snapshot value.

use super::{ComputeResource, Entity, Grant, Lab, Project, Researcher};
use serde::{Deserialize, Serialize};

/// Full in-memory state: the unit persisted, exported and imported.
///
/// Field names double as the export document keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub researchers: Vec<Researcher>,
    pub labs: Vec<Lab>,
    pub projects: Vec<Project>,
    pub compute_resources: Vec<ComputeResource>,
    pub grants: Vec<Grant>,
}

impl Dataset {
    pub fn find<T: Entity>(&self, id: &T::Id) -> Option<&T> {
        T::collection(self).iter().find(|record| record.id() == id)
    }

    pub fn position<T: Entity>(&self, id: &T::Id) -> Option<usize> {
        T::collection(self).iter().position(|record| record.id() == id)
    }

    pub fn contains<T: Entity>(&self, id: &T::Id) -> bool {
        self.position::<T>(id).is_some()
    }

    /// Replaces a record with the same id in place. Returns `false` when no
    /// record matches.
    pub fn replace<T: Entity>(&mut self, record: T) -> bool {
        let collection = T::collection_mut(self);
        match collection.iter().position(|existing| existing.id() == record.id()) {
            Some(index) => {
                collection[index] = record;
                true
            }
            None => false,
        }
    }

    /// Total number of top-level records.
    pub fn len(&self) -> usize {
        self.researchers.len()
            + self.labs.len()
            + self.projects.len()
            + self.compute_resources.len()
            + self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of notes across all researchers.
    pub fn note_count(&self) -> usize {
        self.researchers.iter().map(|r| r.notes.len()).sum()
    }
}
