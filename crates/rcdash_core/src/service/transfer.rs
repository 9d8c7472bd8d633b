//! Export/import of the whole dataset as one JSON document.
//!
//! # Responsibility
//! - Serialize the five collections under their collection keys.
//! - Parse and fully validate an import document before anything is stored.
//!
//! # Invariants
//! - Import replaces, never merges.
//! - A key missing from the document takes the fallback collection.
//! - Any structural or record-level problem rejects the whole document.

use crate::model::{
    ComputeResource, Dataset, Entity, Grant, Lab, Project, Researcher, ValidationError,
};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Pretty-printed export document with keys `researchers`, `labs`,
/// `projects`, `computeResources` and `grants`.
pub fn export_document(dataset: &Dataset) -> serde_json::Result<String> {
    serde_json::to_string_pretty(dataset)
}

/// Parses an export document into a complete dataset.
///
/// # Errors
/// - `MalformedDocument` when `json` is not valid JSON.
/// - `NotAnObject` when the top level is not an object.
/// - `NotAnArray` when a present collection key holds something else.
/// - `InvalidRecord` when a record cannot be decoded or fails validation.
/// - `DuplicateRecordId` when one collection repeats an id.
pub fn parse_import(json: &str, fallback: &Dataset) -> Result<Dataset, ValidationError> {
    let document: Value = serde_json::from_str(json)
        .map_err(|err| ValidationError::MalformedDocument(err.to_string()))?;
    let Value::Object(document) = document else {
        return Err(ValidationError::NotAnObject);
    };

    let dataset = Dataset {
        researchers: decode_collection::<Researcher>(&document, fallback)?,
        labs: decode_collection::<Lab>(&document, fallback)?,
        projects: decode_collection::<Project>(&document, fallback)?,
        compute_resources: decode_collection::<ComputeResource>(&document, fallback)?,
        grants: decode_collection::<Grant>(&document, fallback)?,
    };
    validate_dataset(&dataset)?;
    Ok(dataset)
}

/// Validates every record and rejects repeated ids within a collection.
pub fn validate_dataset(dataset: &Dataset) -> Result<(), ValidationError> {
    check_collection::<Researcher>(dataset)?;
    check_collection::<Lab>(dataset)?;
    check_collection::<Project>(dataset)?;
    check_collection::<ComputeResource>(dataset)?;
    check_collection::<Grant>(dataset)
}

fn decode_collection<T: Entity>(
    document: &Map<String, Value>,
    fallback: &Dataset,
) -> Result<Vec<T>, ValidationError> {
    let collection = T::KIND.collection_key();
    match document.get(collection) {
        None => Ok(T::collection(fallback).to_vec()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                T::deserialize(item).map_err(|err| ValidationError::InvalidRecord {
                    collection,
                    index,
                    message: err.to_string(),
                })
            })
            .collect(),
        Some(_) => Err(ValidationError::NotAnArray { collection }),
    }
}

fn check_collection<T: Entity>(dataset: &Dataset) -> Result<(), ValidationError> {
    let collection = T::KIND.collection_key();
    let mut seen = HashSet::new();
    for (index, record) in T::collection(dataset).iter().enumerate() {
        record
            .validate()
            .map_err(|err| ValidationError::InvalidRecord {
                collection,
                index,
                message: err.to_string(),
            })?;
        let id = record.id().as_ref();
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateRecordId {
                collection,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
