use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured document carried by a record (one FHIR resource)
pub type Document = Map<String, Value>;

/// Opaque record identifier assigned by the source store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Source category (collection) a record was read from
///
/// Cloning shares the underlying name, so every record of a category points
/// at the same allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(Arc<str>);

impl Category {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Label used for routing writes and counting results
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unit of work flowing through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub payload: Document,
    pub origin: Category,
}

impl Record {
    pub fn new(id: impl Into<RecordId>, payload: Document, origin: Category) -> Self {
        Self {
            id: id.into(),
            payload,
            origin,
        }
    }

    /// Replace the payload, keeping identity and origin
    pub fn into_transformed(self, payload: Document) -> TransformedRecord {
        TransformedRecord {
            id: self.id,
            payload,
            origin: self.origin,
        }
    }
}

/// Record after the transform service replaced its payload
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedRecord {
    id: RecordId,
    payload: Document,
    origin: Category,
}

impl TransformedRecord {
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn payload(&self) -> &Document {
        &self.payload
    }

    pub fn origin(&self) -> &Category {
        &self.origin
    }

    pub fn into_parts(self) -> (RecordId, Document, Category) {
        (self.id, self.payload, self.origin)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
