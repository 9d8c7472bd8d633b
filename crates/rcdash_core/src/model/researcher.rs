//! Researcher record and its embedded notes.
//!
//! # Invariants
//! - `name` is non-blank.
//! - Every embedded note names this researcher as its owner.
//! - Note ids are unique within one researcher.

use super::ids::{optional_ref, LabId, NoteId, ResearcherId};
use super::validation::{check_id, check_name, check_optional_ref, ValidationError};
use super::{Dataset, Entity, EntityKind, EntityRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A person tracked by the research office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Researcher {
    pub id: ResearcherId,
    /// Full display name, e.g. "Dr. Alice Wonderland".
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ucr_cid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub div: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Free-text research interests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    /// Weak reference to the researcher's home lab.
    #[serde(
        default,
        deserialize_with = "optional_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub lab_id: Option<LabId>,
    /// Owned notes in creation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
}

impl Researcher {
    /// Creates a researcher with a generated id and no metadata.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(ResearcherId::generate(), name)
    }

    /// Creates a researcher with a caller-provided id.
    pub fn with_id(id: impl Into<ResearcherId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            first_name: None,
            last_name: None,
            net_id: None,
            title: None,
            email: None,
            employee_id: None,
            ucr_cid: None,
            org: None,
            div: None,
            department: None,
            research: None,
            profile_url: None,
            lab_id: None,
            notes: Vec::new(),
        }
    }

    /// Sets the home lab reference.
    pub fn in_lab(mut self, lab_id: impl Into<LabId>) -> Self {
        self.lab_id = Some(lab_id.into());
        self
    }

    pub fn note(&self, note_id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == note_id)
    }
}

impl Entity for Researcher {
    type Id = ResearcherId;

    const KIND: EntityKind = EntityKind::Researcher;

    fn id(&self) -> &ResearcherId {
        &self.id
    }

    fn reference(id: &ResearcherId) -> EntityRef {
        EntityRef::Researcher(id.clone())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_id(Self::KIND, self.id.as_str())?;
        check_name(Self::KIND, self.id.as_str(), &self.name)?;
        check_optional_ref(EntityKind::Lab, self.lab_id.as_ref())?;

        let mut seen = HashSet::with_capacity(self.notes.len());
        for note in &self.notes {
            if note.researcher_id != self.id {
                return Err(ValidationError::NoteOwnerMismatch {
                    note_id: note.id.clone(),
                    owner: self.id.clone(),
                    claimed: note.researcher_id.clone(),
                });
            }
            if !seen.insert(&note.id) {
                return Err(ValidationError::DuplicateNoteId {
                    researcher_id: self.id.clone(),
                    note_id: note.id.clone(),
                });
            }
        }
        Ok(())
    }

    fn collection(dataset: &Dataset) -> &[Self] {
        &dataset.researchers
    }

    fn collection_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.researchers
    }
}

/// Free-text note owned by exactly one researcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    /// Owning researcher. A note never outlives it.
    pub researcher_id: ResearcherId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every edit.
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates a note whose timestamps are both `now`.
    pub fn new(researcher_id: ResearcherId, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: NoteId::generate(),
            researcher_id,
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
