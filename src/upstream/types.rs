//! Snapshot data model.
//!
//! Records are schema-less: whatever fields the upstream returns for a fetch,
//! in the order it returned them. Column headers come from the first record.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// One operational record: ordered field name to value.
pub type Record = IndexMap<String, Scalar>;

/// The complete record set captured by one fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Vec<Record>);

/// Body shapes the data endpoint is known to return.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Many(Vec<Record>),
    One(Record),
}

impl Snapshot {
    pub fn new(records: Vec<Record>) -> Self {
        Self(records)
    }

    /// Parse a response body. A lone object becomes a one-element snapshot.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::from_slice::<Payload>(body)? {
            Payload::Many(records) => Self(records),
            Payload::One(record) => Self(vec![record]),
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Column headers, taken from the first record.
    pub fn columns(&self) -> Vec<&str> {
        self.0
            .first()
            .map(|r| r.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
