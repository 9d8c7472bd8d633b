//! Core use-case services.
//!
//! # Responsibility
//! - Own the dataset through `EntityStore` and expose CRUD, notes and
//!   import/export as use-case level APIs.
//! - Keep CLI callers decoupled from storage details.

pub mod entity_store;
pub mod note_service;
pub mod summary;
pub mod transfer;
