//! Messages grouped by resource group and partition.

use std::collections::BTreeMap;

use crate::model::{Message, ResourceKey};

/// Messages keyed by resource group name, then by partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMessages {
    messages: BTreeMap<String, BTreeMap<ResourceKey, Vec<Message>>>,
}

/// Candidate messages produced by the generation stage.
pub type MessageGenerationOutput = ResourceMessages;

/// Messages chosen for dispatch by the selection stage.
pub type MessageSelectionOutput = ResourceMessages;

impl ResourceMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, resource_group: &str, resource_key: ResourceKey, message: Message) {
        self.entry(resource_group, resource_key).push(message);
    }

    /// Append messages for a partition. An empty list still records the
    /// partition, so consumers can tell "nothing selected" from "not visited".
    pub fn add_messages(
        &mut self,
        resource_group: &str,
        resource_key: ResourceKey,
        messages: Vec<Message>,
    ) {
        self.entry(resource_group, resource_key).extend(messages);
    }

    /// Messages for one partition; empty if none were recorded.
    pub fn messages(&self, resource_group: &str, resource_key: &ResourceKey) -> &[Message] {
        self.messages
            .get(resource_group)
            .and_then(|keys| keys.get(resource_key))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns true if the partition was recorded, even with no messages.
    pub fn contains_key(&self, resource_group: &str, resource_key: &ResourceKey) -> bool {
        self.messages
            .get(resource_group)
            .is_some_and(|keys| keys.contains_key(resource_key))
    }

    pub fn resource_groups(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    /// All messages of one resource group, by partition.
    pub fn resource_group(&self, resource_group: &str) -> Option<&BTreeMap<ResourceKey, Vec<Message>>> {
        self.messages.get(resource_group)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceKey, &[Message])> {
        self.messages.iter().flat_map(|(group, keys)| {
            keys.iter()
                .map(move |(key, messages)| (group.as_str(), key, messages.as_slice()))
        })
    }

    /// Total number of messages across all partitions.
    pub fn message_count(&self) -> usize {
        self.iter().map(|(_, _, messages)| messages.len()).sum()
    }

    fn entry(&mut self, resource_group: &str, resource_key: ResourceKey) -> &mut Vec<Message> {
        self.messages
            .entry(resource_group.to_string())
            .or_default()
            .entry(resource_key)
            .or_default()
    }
}
