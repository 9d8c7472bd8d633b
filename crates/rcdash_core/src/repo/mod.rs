//! Persistence adapters for entity collections.
//!
//! # Responsibility
//! - Define the key-value contract the entity store persists through.
//! - Keep SQLite details inside the persistence boundary.
//!
//! # Invariants
//! - One key per collection; the value is that collection's JSON array.
//! - `save_batch` is all-or-nothing.

pub mod collection_repo;
