//! Compute resource record.
//!
//! Capacity attributes carry no cross-entity meaning; only `project_ids`
//! participates in referential integrity.

use super::ids::{ComputeResourceId, ProjectId};
use super::validation::{check_id, check_name, check_refs, ValidationError};
use super::{Dataset, Entity, EntityKind, EntityRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComputeResourceType {
    Cluster,
    #[serde(rename = "High-End Workstation")]
    HighEndWorkstation,
    #[serde(rename = "Cloud VM")]
    CloudVm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComputeResourceStatus {
    Available,
    #[serde(rename = "In Use")]
    InUse,
    Maintenance,
}

/// A cluster, workstation or cloud VM allocated to projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeResource {
    pub id: ComputeResourceId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ComputeResourceType,
    /// Human-readable hardware summary.
    #[serde(default)]
    pub specification: String,
    pub status: ComputeResourceStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_ids: Vec<ProjectId>,
    /// e.g. "HPC", "HTC", "Kubernetes".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpus: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpus_per_node: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_ram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpus: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpus_per_node: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cores: Option<u32>,
}

impl ComputeResource {
    pub fn new(name: impl Into<String>, kind: ComputeResourceType) -> Self {
        Self::with_id(ComputeResourceId::generate(), name, kind)
    }

    pub fn with_id(
        id: impl Into<ComputeResourceId>,
        name: impl Into<String>,
        kind: ComputeResourceType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            specification: String::new(),
            status: ComputeResourceStatus::Available,
            project_ids: Vec::new(),
            cluster_type: None,
            nodes: None,
            cpus: None,
            cpus_per_node: None,
            node_memory: None,
            total_ram: None,
            gpus: None,
            gpus_per_node: None,
            cluster_name: None,
            total_cores: None,
        }
    }
}

impl Entity for ComputeResource {
    type Id = ComputeResourceId;

    const KIND: EntityKind = EntityKind::ComputeResource;

    fn id(&self) -> &ComputeResourceId {
        &self.id
    }

    fn reference(id: &ComputeResourceId) -> EntityRef {
        EntityRef::ComputeResource(id.clone())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_id(Self::KIND, self.id.as_str())?;
        check_name(Self::KIND, self.id.as_str(), &self.name)?;
        check_refs(EntityKind::Project, &self.project_ids)
    }

    fn collection(dataset: &Dataset) -> &[Self] {
        &dataset.compute_resources
    }

    fn collection_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.compute_resources
    }
}
