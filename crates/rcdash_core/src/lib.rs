//! Core domain logic for the research dashboard.
//! This crate is the single source of truth for records, their references
//! and the cascade rules that keep those references consistent.

pub mod clock;
pub mod config;
pub mod db;
pub mod integrity;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use integrity::{plan_delete, CascadePlan, CascadeSummary};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{
    ComputeResource, ComputeResourceId, ComputeResourceStatus, ComputeResourceType, Dataset,
    Entity, EntityKind, EntityRef, Grant, GrantId, GrantStatus, Lab, LabId, Note, NoteId, Project,
    ProjectId, Researcher, ResearcherId, ValidationError,
};
pub use repo::collection_repo::{
    CollectionStore, MemoryCollectionStore, RepoError, RepoResult, SqliteCollectionStore,
};
pub use service::entity_store::{DeleteOutcome, EntityStore, StoreError, StoreResult};
pub use service::summary::{summarize, DanglingReference, DashboardSummary, GrantDeadline};
pub use service::transfer::{export_document, parse_import};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
