//! Generic coordination-store record.
//!
//! Every value in the store is a [`Record`]: an id plus three families of
//! named fields. Typed views ([`LeaderHistory`](super::LeaderHistory),
//! [`StateModelDefinition`](super::StateModelDefinition)) read and write
//! their data through these fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cluster::ClusterResult;

/// A record stored at a coordination-store path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    id: String,
    #[serde(default)]
    simple_fields: BTreeMap<String, String>,
    #[serde(default)]
    list_fields: BTreeMap<String, Vec<String>>,
    /// Carried through encoding unchanged.
    #[serde(default)]
    map_fields: BTreeMap<String, BTreeMap<String, String>>,
}

impl Record {
    /// Create an empty record.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// The record id.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn simple_field(&self, key: &str) -> Option<&str> {
        self.simple_fields.get(key).map(String::as_str)
    }

    pub fn set_simple_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.simple_fields.insert(key.into(), value.into());
    }

    pub fn list_field(&self, key: &str) -> Option<&[String]> {
        self.list_fields.get(key).map(Vec::as_slice)
    }

    pub fn set_list_field(&mut self, key: impl Into<String>, value: Vec<String>) {
        self.list_fields.insert(key.into(), value);
    }

    /// Encode the record as JSON bytes for storage.
    pub fn to_json_bytes(&self) -> ClusterResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a record from stored JSON bytes.
    pub fn from_json_bytes(bytes: &[u8]) -> ClusterResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
