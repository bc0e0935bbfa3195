//! Resource groups and their partitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One partition of a resource group; the unit of transition scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKey(String);

impl ResourceKey {
    pub fn new(name: impl Into<String>) -> Self {
        ResourceKey(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKey {
    fn from(name: &str) -> Self {
        ResourceKey::new(name)
    }
}

/// A named set of partitions sharing one state model definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup {
    name: String,
    state_model_def_ref: String,
    resource_keys: Vec<ResourceKey>,
}

impl ResourceGroup {
    pub fn new(name: impl Into<String>, state_model_def_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state_model_def_ref: state_model_def_ref.into(),
            resource_keys: Vec::new(),
        }
    }

    /// Add a partition. Adding the same key twice has no effect.
    pub fn add_resource_key(&mut self, key: impl Into<ResourceKey>) {
        let key = key.into();
        if !self.resource_keys.contains(&key) {
            self.resource_keys.push(key);
        }
    }

    /// Builder-style variant of [`add_resource_key`](Self::add_resource_key).
    pub fn with_resource_key(mut self, key: impl Into<ResourceKey>) -> Self {
        self.add_resource_key(key);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the state model definition that governs these partitions.
    pub fn state_model_def_ref(&self) -> &str {
        &self.state_model_def_ref
    }

    pub fn resource_keys(&self) -> &[ResourceKey] {
        &self.resource_keys
    }
}
