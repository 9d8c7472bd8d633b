//! Lab record.

use super::ids::{optional_ref, LabId, ProjectId, ResearcherId};
use super::validation::{check_id, check_name, check_optional_ref, check_refs, ValidationError};
use super::{Dataset, Entity, EntityKind, EntityRef};
use serde::{Deserialize, Serialize};

/// A research group, optionally led by a principal investigator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lab {
    pub id: LabId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "optional_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub principal_investigator_id: Option<ResearcherId>,
    /// Linked projects, insertion order kept for display.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_ids: Vec<ProjectId>,
}

impl Lab {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_id(LabId::generate(), name, description)
    }

    pub fn with_id(
        id: impl Into<LabId>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            principal_investigator_id: None,
            project_ids: Vec::new(),
        }
    }

    pub fn led_by(mut self, researcher_id: impl Into<ResearcherId>) -> Self {
        self.principal_investigator_id = Some(researcher_id.into());
        self
    }
}

impl Entity for Lab {
    type Id = LabId;

    const KIND: EntityKind = EntityKind::Lab;

    fn id(&self) -> &LabId {
        &self.id
    }

    fn reference(id: &LabId) -> EntityRef {
        EntityRef::Lab(id.clone())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_id(Self::KIND, self.id.as_str())?;
        check_name(Self::KIND, self.id.as_str(), &self.name)?;
        check_optional_ref(
            EntityKind::Researcher,
            self.principal_investigator_id.as_ref(),
        )?;
        check_refs(EntityKind::Project, &self.project_ids)
    }

    fn collection(dataset: &Dataset) -> &[Self] {
        &dataset.labs
    }

    fn collection_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.labs
    }
}
