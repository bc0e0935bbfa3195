//! Snapshot of cluster data read once per pass.

use std::collections::HashMap;

use tracing::debug;

use crate::cluster::{ClusterDataAccessor, ClusterResult};
use crate::model::StateModelDefinition;
use crate::types::PropertyType;

/// Cluster data shared by the stages of one pass.
#[derive(Debug, Clone, Default)]
pub struct ClusterDataCache {
    state_model_defs: HashMap<String, StateModelDefinition>,
}

impl ClusterDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every state model definition from the coordination store.
    pub async fn load(accessor: &dyn ClusterDataAccessor) -> ClusterResult<Self> {
        let records = accessor
            .get_child_properties(PropertyType::StateModelDefs)
            .await?;
        let mut cache = Self::new();
        for record in &records {
            cache.insert_state_model_def(StateModelDefinition::from_record(record));
        }
        debug!(
            state_model_defs = cache.state_model_defs.len(),
            "Loaded cluster data cache"
        );
        Ok(cache)
    }

    pub fn insert_state_model_def(&mut self, definition: StateModelDefinition) {
        self.state_model_defs
            .insert(definition.id().to_string(), definition);
    }

    /// Builder-style variant of [`insert_state_model_def`](Self::insert_state_model_def).
    pub fn with_state_model_def(mut self, definition: StateModelDefinition) -> Self {
        self.insert_state_model_def(definition);
        self
    }

    /// Resolve a state model definition by its reference name.
    pub fn state_model_def(&self, name: &str) -> Option<&StateModelDefinition> {
        self.state_model_defs.get(name)
    }

    pub fn state_model_def_count(&self) -> usize {
        self.state_model_defs.len()
    }
}
