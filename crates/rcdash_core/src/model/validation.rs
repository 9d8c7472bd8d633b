//! Validation errors shared by model construction and import.

use super::ids::{GrantId, NoteId, ResearcherId};
use super::EntityKind;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Structural problem with a record or an import payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Record id is empty or uses characters outside the id charset.
    InvalidId { kind: EntityKind, id: String },
    /// Display name/title is blank after trim.
    BlankName { kind: EntityKind, id: String },
    /// A new grant must name its principal investigator.
    MissingGrantPrincipalInvestigator(GrantId),
    /// End date precedes start date.
    InvertedDateRange {
        kind: EntityKind,
        id: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// Grant amount is negative, NaN or infinite.
    InvalidAmount { id: GrantId, amount: f64 },
    /// Embedded note claims a different owner than the researcher holding it.
    NoteOwnerMismatch {
        note_id: NoteId,
        owner: ResearcherId,
        claimed: ResearcherId,
    },
    /// Two notes inside one researcher share an id.
    DuplicateNoteId {
        researcher_id: ResearcherId,
        note_id: NoteId,
    },
    /// Import payload is not valid JSON.
    MalformedDocument(String),
    /// Import payload top level is not a JSON object.
    NotAnObject,
    /// A present collection key does not hold an array.
    NotAnArray { collection: &'static str },
    /// A record inside a collection could not be decoded or validated.
    InvalidRecord {
        collection: &'static str,
        index: usize,
        message: String,
    },
    /// Two records in one imported collection share an id.
    DuplicateRecordId {
        collection: &'static str,
        id: String,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId { kind, id } => write!(f, "invalid {kind} id: `{id}`"),
            Self::BlankName { kind, id } => write!(f, "{kind} `{id}` must have a non-blank name"),
            Self::MissingGrantPrincipalInvestigator(id) => {
                write!(f, "grant `{id}` requires a principal investigator")
            }
            Self::InvertedDateRange {
                kind,
                id,
                start,
                end,
            } => write!(
                f,
                "{kind} `{id}` ends ({end}) before it starts ({start})"
            ),
            Self::InvalidAmount { id, amount } => {
                write!(f, "grant `{id}` has invalid amount {amount}")
            }
            Self::NoteOwnerMismatch {
                note_id,
                owner,
                claimed,
            } => write!(
                f,
                "note `{note_id}` is held by researcher `{owner}` but claims `{claimed}`"
            ),
            Self::DuplicateNoteId {
                researcher_id,
                note_id,
            } => write!(
                f,
                "researcher `{researcher_id}` holds note `{note_id}` more than once"
            ),
            Self::MalformedDocument(message) => write!(f, "malformed import document: {message}"),
            Self::NotAnObject => write!(f, "import document must be a JSON object"),
            Self::NotAnArray { collection } => {
                write!(f, "import key `{collection}` must be an array")
            }
            Self::InvalidRecord {
                collection,
                index,
                message,
            } => write!(f, "invalid record {collection}[{index}]: {message}"),
            Self::DuplicateRecordId { collection, id } => {
                write!(f, "duplicate id `{id}` in `{collection}`")
            }
        }
    }
}

impl Error for ValidationError {}

/// Checks an id against the shared charset.
pub(crate) fn check_id(kind: EntityKind, raw: &str) -> Result<(), ValidationError> {
    if super::ids::is_well_formed_id(raw) {
        Ok(())
    } else {
        Err(ValidationError::InvalidId {
            kind,
            id: raw.to_string(),
        })
    }
}

/// Checks a stored reference. A blank or ill-formed target id is rejected so
/// it never reads back as an absent reference.
pub(crate) fn check_ref(target: EntityKind, id: &impl AsRef<str>) -> Result<(), ValidationError> {
    check_id(target, id.as_ref())
}

pub(crate) fn check_optional_ref(
    target: EntityKind,
    id: Option<&impl AsRef<str>>,
) -> Result<(), ValidationError> {
    id.map_or(Ok(()), |id| check_ref(target, id))
}

pub(crate) fn check_refs<I: AsRef<str>>(
    target: EntityKind,
    ids: &[I],
) -> Result<(), ValidationError> {
    ids.iter().try_for_each(|id| check_ref(target, id))
}

pub(crate) fn check_name(kind: EntityKind, id: &str, name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        Err(ValidationError::BlankName {
            kind,
            id: id.to_string(),
        })
    } else {
        Ok(())
    }
}

pub(crate) fn check_date_range(
    kind: EntityKind,
    id: &str,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match end {
        Some(end) if end < start => Err(ValidationError::InvertedDateRange {
            kind,
            id: id.to_string(),
            start,
            end,
        }),
        _ => Ok(()),
    }
}
