//! Typed weak-reference identifiers.
//!
//! # Responsibility
//! - Give every entity kind its own id type so references cannot be mixed up.
//! - Generate fresh ids for newly created records.
//!
//! # Invariants
//! - An id is only a lookup key. Holding one never implies the target exists.
//! - Ids serialize as bare JSON strings (`#[serde(transparent)]`).
//! - Blank optional references read from storage normalize to `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.:\-]*$").expect("valid id regex"));

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier (import, sync, or fixtures).
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generates a fresh, collision-resistant identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            /// Returns whether the raw value is an acceptable identifier.
            pub fn is_well_formed(&self) -> bool {
                is_well_formed_id(self.0.as_str())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.0.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }
    };
}

typed_id!(
    /// Identifier of a `Researcher`.
    ResearcherId
);
typed_id!(
    /// Identifier of a `Lab`.
    LabId
);
typed_id!(
    /// Identifier of a `Project`.
    ProjectId
);
typed_id!(
    /// Identifier of a `ComputeResource`.
    ComputeResourceId
);
typed_id!(
    /// Identifier of a `Grant`.
    GrantId
);
typed_id!(
    /// Identifier of a `Note` embedded in a researcher.
    NoteId
);

/// Checks the id charset: starts alphanumeric, then `[A-Za-z0-9_.:-]`.
pub fn is_well_formed_id(value: &str) -> bool {
    ID_RE.is_match(value)
}

/// Deserializes an optional reference, mapping `""` (written by older
/// front-ends for "no selection") to `None`.
pub(crate) fn optional_ref<'de, D, I>(deserializer: D) -> Result<Option<I>, D::Error>
where
    D: Deserializer<'de>,
    I: From<String>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(I::from))
}

/// Removes every occurrence of `target` from `ids`. Returns whether anything
/// was removed.
pub(crate) fn strip_ref<I: PartialEq>(ids: &mut Vec<I>, target: &I) -> bool {
    let before = ids.len();
    ids.retain(|id| id != target);
    ids.len() != before
}

/// Clears `slot` when it points at `target`. Returns whether it was cleared.
pub(crate) fn clear_ref<I: PartialEq>(slot: &mut Option<I>, target: &I) -> bool {
    if slot.as_ref() == Some(target) {
        *slot = None;
        true
    } else {
        false
    }
}
