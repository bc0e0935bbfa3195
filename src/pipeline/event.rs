//! Per-pass pipeline context.
//!
//! A [`ClusterEvent`] is created for every rebalancing pass and handed from
//! stage to stage. Stages read the attributes earlier stages produced and
//! insert their own results. Nothing in it outlives the pass.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::model::ResourceGroup;

use super::data_cache::ClusterDataCache;
use super::output::{MessageGenerationOutput, MessageSelectionOutput};

/// Names of the attributes stages exchange through a [`ClusterEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeName {
    /// Snapshot of cluster data, including state model definitions.
    ClusterDataCache,
    /// Resource groups handled in this pass, by name.
    ResourceGroups,
    /// Every candidate message produced by generation.
    MessagesAll,
    /// Messages chosen for dispatch.
    MessagesSelected,
}

impl AttributeName {
    pub const fn as_str(self) -> &'static str {
        match self {
            AttributeName::ClusterDataCache => "ClusterDataCache",
            AttributeName::ResourceGroups => "RESOURCE_GROUPS",
            AttributeName::MessagesAll => "MESSAGES_ALL",
            AttributeName::MessagesSelected => "MESSAGES_SELECTED",
        }
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed attribute value. Each variant belongs to exactly one
/// [`AttributeName`].
#[derive(Debug, Clone)]
pub enum EventAttribute {
    DataCache(Arc<ClusterDataCache>),
    ResourceGroups(BTreeMap<String, ResourceGroup>),
    MessagesAll(MessageGenerationOutput),
    MessagesSelected(MessageSelectionOutput),
}

impl EventAttribute {
    pub const fn name(&self) -> AttributeName {
        match self {
            EventAttribute::DataCache(_) => AttributeName::ClusterDataCache,
            EventAttribute::ResourceGroups(_) => AttributeName::ResourceGroups,
            EventAttribute::MessagesAll(_) => AttributeName::MessagesAll,
            EventAttribute::MessagesSelected(_) => AttributeName::MessagesSelected,
        }
    }
}

/// Attribute bag scoped to one pipeline pass.
#[derive(Debug, Clone)]
pub struct ClusterEvent {
    name: String,
    attributes: HashMap<AttributeName, EventAttribute>,
}

impl ClusterEvent {
    /// Create an empty event. The name identifies what triggered the pass.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert an attribute, returning the value it replaced.
    pub fn insert(&mut self, attribute: EventAttribute) -> Option<EventAttribute> {
        self.attributes.insert(attribute.name(), attribute)
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with(mut self, attribute: EventAttribute) -> Self {
        self.insert(attribute);
        self
    }

    pub fn contains(&self, name: AttributeName) -> bool {
        self.attributes.contains_key(&name)
    }

    pub fn get(&self, name: AttributeName) -> Option<&EventAttribute> {
        self.attributes.get(&name)
    }

    pub fn data_cache(&self) -> Option<&Arc<ClusterDataCache>> {
        match self.attributes.get(&AttributeName::ClusterDataCache) {
            Some(EventAttribute::DataCache(cache)) => Some(cache),
            _ => None,
        }
    }

    pub fn resource_groups(&self) -> Option<&BTreeMap<String, ResourceGroup>> {
        match self.attributes.get(&AttributeName::ResourceGroups) {
            Some(EventAttribute::ResourceGroups(groups)) => Some(groups),
            _ => None,
        }
    }

    pub fn messages_all(&self) -> Option<&MessageGenerationOutput> {
        match self.attributes.get(&AttributeName::MessagesAll) {
            Some(EventAttribute::MessagesAll(messages)) => Some(messages),
            _ => None,
        }
    }

    pub fn messages_selected(&self) -> Option<&MessageSelectionOutput> {
        match self.attributes.get(&AttributeName::MessagesSelected) {
            Some(EventAttribute::MessagesSelected(messages)) => Some(messages),
            _ => None,
        }
    }
}

impl fmt::Display for ClusterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.attributes.keys().map(|n| n.as_str()).collect();
        names.sort_unstable();
        write!(f, "{}[{}]", self.name, names.join(","))
    }
}
