//! Project record.
//!
//! # Invariants
//! - `end_date`, when set, is not earlier than `start_date`.

use super::ids::{optional_ref, ComputeResourceId, GrantId, LabId, ProjectId, ResearcherId};
use super::optional_date;
use super::validation::{
    check_date_range, check_id, check_name, check_optional_ref, check_refs, ValidationError,
};
use super::{Dataset, Entity, EntityKind, EntityRef};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A funded or unfunded research effort spanning labs and compute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    #[serde(
        default,
        deserialize_with = "optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "optional_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub lead_researcher_id: Option<ResearcherId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lab_ids: Vec<LabId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compute_resource_ids: Vec<ComputeResourceId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grant_ids: Vec<GrantId>,
}

impl Project {
    pub fn new(name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self::with_id(ProjectId::generate(), name, start_date)
    }

    pub fn with_id(id: impl Into<ProjectId>, name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            start_date,
            end_date: None,
            lead_researcher_id: None,
            lab_ids: Vec::new(),
            compute_resource_ids: Vec::new(),
            grant_ids: Vec::new(),
        }
    }
}

impl Entity for Project {
    type Id = ProjectId;

    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> &ProjectId {
        &self.id
    }

    fn reference(id: &ProjectId) -> EntityRef {
        EntityRef::Project(id.clone())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_id(Self::KIND, self.id.as_str())?;
        check_name(Self::KIND, self.id.as_str(), &self.name)?;
        check_optional_ref(EntityKind::Researcher, self.lead_researcher_id.as_ref())?;
        check_refs(EntityKind::Lab, &self.lab_ids)?;
        check_refs(EntityKind::ComputeResource, &self.compute_resource_ids)?;
        check_refs(EntityKind::Grant, &self.grant_ids)?;
        check_date_range(Self::KIND, self.id.as_str(), self.start_date, self.end_date)
    }

    fn collection(dataset: &Dataset) -> &[Self] {
        &dataset.projects
    }

    fn collection_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.projects
    }
}
