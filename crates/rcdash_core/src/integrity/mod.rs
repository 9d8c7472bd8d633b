//! Referential integrity engine.
//!
//! # Responsibility
//! - Own the single table of cascade rules applied when a record is deleted.
//! - Compute cascades as pure functions over a dataset snapshot.
//!
//! # Invariants
//! - Cascades are one hop: dependents are edited, never deleted.
//! - Planning never fails; missing ids are simply not matched.
//! - Applying a plan twice is equivalent to applying it once.

pub mod cascade;

pub use cascade::{apply_delete, plan_delete, CascadePlan, CascadeSummary};
