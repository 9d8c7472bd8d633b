//! Domain model for the research dashboard.
//!
//! # Responsibility
//! - Define the five top-level entity records plus embedded notes.
//! - Provide construction-time validation for required fields.
//! - Expose the `Entity` trait used by the store to stay generic.
//!
//! # Invariants
//! - Cross-entity links are typed weak references (`ids`), never embedded
//!   records.
//! - Notes are the only strongly owned child records.
//! - Absent optionals and empty link lists are omitted on serialization.

pub mod compute;
pub mod dataset;
pub mod grant;
pub mod ids;
pub mod lab;
pub mod project;
pub mod researcher;
pub mod validation;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Debug, Display, Formatter};

pub use compute::{ComputeResource, ComputeResourceStatus, ComputeResourceType};
pub use dataset::Dataset;
pub use grant::{Grant, GrantStatus};
pub use ids::{ComputeResourceId, GrantId, LabId, NoteId, ProjectId, ResearcherId};
pub use lab::Lab;
pub use project::Project;
pub use researcher::{Note, Researcher};
pub use validation::ValidationError;

/// Top-level entity categories held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Researcher,
    Lab,
    Project,
    ComputeResource,
    Grant,
}

impl EntityKind {
    /// All kinds in persistence/export order.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Researcher,
        EntityKind::Lab,
        EntityKind::Project,
        EntityKind::ComputeResource,
        EntityKind::Grant,
    ];

    /// Storage key and export document key for this kind's collection.
    pub fn collection_key(self) -> &'static str {
        match self {
            Self::Researcher => "researchers",
            Self::Lab => "labs",
            Self::Project => "projects",
            Self::ComputeResource => "computeResources",
            Self::Grant => "grants",
        }
    }

    /// Parses a collection key, accepting a few CLI-friendly aliases.
    pub fn from_collection_key(value: &str) -> Option<Self> {
        match value.trim() {
            "researchers" | "researcher" => Some(Self::Researcher),
            "labs" | "lab" => Some(Self::Lab),
            "projects" | "project" => Some(Self::Project),
            "computeResources" | "compute-resources" | "compute" => Some(Self::ComputeResource),
            "grants" | "grant" => Some(Self::Grant),
            _ => None,
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Researcher => "researcher",
            Self::Lab => "lab",
            Self::Project => "project",
            Self::ComputeResource => "compute resource",
            Self::Grant => "grant",
        };
        f.write_str(label)
    }
}

/// Typed reference to any top-level record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Researcher(ResearcherId),
    Lab(LabId),
    Project(ProjectId),
    ComputeResource(ComputeResourceId),
    Grant(GrantId),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Researcher(_) => EntityKind::Researcher,
            Self::Lab(_) => EntityKind::Lab,
            Self::Project(_) => EntityKind::Project,
            Self::ComputeResource(_) => EntityKind::ComputeResource,
            Self::Grant(_) => EntityKind::Grant,
        }
    }

    pub fn id_str(&self) -> &str {
        match self {
            Self::Researcher(id) => id.as_str(),
            Self::Lab(id) => id.as_str(),
            Self::Project(id) => id.as_str(),
            Self::ComputeResource(id) => id.as_str(),
            Self::Grant(id) => id.as_str(),
        }
    }

    /// Builds a reference from a collection kind and a raw id.
    pub fn parse(kind: EntityKind, raw: &str) -> Self {
        match kind {
            EntityKind::Researcher => Self::Researcher(ResearcherId::from(raw)),
            EntityKind::Lab => Self::Lab(LabId::from(raw)),
            EntityKind::Project => Self::Project(ProjectId::from(raw)),
            EntityKind::ComputeResource => Self::ComputeResource(ComputeResourceId::from(raw)),
            EntityKind::Grant => Self::Grant(GrantId::from(raw)),
        }
    }
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} `{}`", self.kind(), self.id_str())
    }
}

/// Common surface of the five top-level records.
///
/// The store is generic over this trait so CRUD, persistence and logging are
/// written once. Collection accessors tie each type to its slot in `Dataset`.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned {
    type Id: Clone + Debug + Display + PartialEq + AsRef<str>;

    const KIND: EntityKind;

    fn id(&self) -> &Self::Id;

    /// Wraps an id of this kind into an untyped-kind reference.
    fn reference(id: &Self::Id) -> EntityRef;

    /// Structural validation applied on every write path.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Validation for records entering the store through `add`.
    fn validate_new(&self) -> Result<(), ValidationError> {
        self.validate()
    }

    fn collection(dataset: &Dataset) -> &[Self];

    fn collection_mut(dataset: &mut Dataset) -> &mut Vec<Self>;
}

/// Deserializes an optional date, mapping `""` to `None`.
pub(crate) fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Resolves a weak reference for display, rendering dangling or absent
/// references as `N/A`.
pub fn display_or_na<'a, T, F>(record: Option<&'a T>, label: F) -> String
where
    F: FnOnce(&'a T) -> &'a str,
{
    record.map_or_else(|| "N/A".to_string(), |value| label(value).to_string())
}
