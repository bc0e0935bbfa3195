//! Message selection stage.
//!
//! For every partition, at most one transition kind is dispatched per pass:
//! the first entry of the state model's transition priority list that any
//! candidate message performs. Everything else for that partition waits for
//! a later pass. This keeps e.g. a promotion and a demotion of the same
//! partition out of one pass, and lets the state model say declaratively
//! that `OFFLINE-SLAVE` work is finished before `SLAVE-MASTER` work starts.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::cluster::metrics;
use crate::model::{Message, ResourceGroup, StateModelDefinition};

use super::data_cache::ClusterDataCache;
use super::event::{AttributeName, ClusterEvent, EventAttribute};
use super::output::{MessageGenerationOutput, MessageSelectionOutput};
use super::{Stage, StageError, StageResult};

/// Filters `MESSAGES_ALL` down to `MESSAGES_SELECTED`.
///
/// Requires `ClusterDataCache`, `RESOURCE_GROUPS` and `MESSAGES_ALL` in the
/// event. Holds no state between passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageSelectionStage;

impl MessageSelectionStage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Stage for MessageSelectionStage {
    fn name(&self) -> &'static str {
        "MessageSelectionStage"
    }

    async fn process(&self, event: &mut ClusterEvent) -> StageResult<()> {
        let (Some(cache), Some(resource_groups), Some(candidates)) = (
            event.data_cache(),
            event.resource_groups(),
            event.messages_all(),
        ) else {
            let missing = [
                AttributeName::ClusterDataCache,
                AttributeName::ResourceGroups,
                AttributeName::MessagesAll,
            ]
            .into_iter()
            .filter(|name| !event.contains(*name))
            .collect();
            return Err(StageError::MissingAttributes {
                event: event.to_string(),
                missing,
            });
        };

        let selected = select(resource_groups, candidates, cache);
        debug!(
            event = %event.name(),
            candidates = candidates.message_count(),
            selected = selected.message_count(),
            "Selected messages for dispatch"
        );
        event.insert(EventAttribute::MessagesSelected(selected));
        Ok(())
    }
}

/// Select the messages to dispatch for every partition of every resource group.
///
/// Every partition listed in `resource_groups` gets an entry in the output,
/// possibly empty. A resource group whose state model is not in `cache` is
/// treated like a state model without a priority list: its candidates pass
/// through unfiltered.
pub fn select(
    resource_groups: &BTreeMap<String, ResourceGroup>,
    candidates: &MessageGenerationOutput,
    cache: &ClusterDataCache,
) -> MessageSelectionOutput {
    let mut output = MessageSelectionOutput::new();

    for (group_name, group) in resource_groups {
        let state_model = cache.state_model_def(group.state_model_def_ref());
        if state_model.is_none() {
            warn!(
                resource_group = %group_name,
                state_model = %group.state_model_def_ref(),
                "State model definition not found, messages pass through unfiltered"
            );
        }
        let priority_list = state_model.map(StateModelDefinition::transition_priority_list);

        for resource_key in group.resource_keys() {
            let messages = candidates.messages(group_name, resource_key);
            let selected = select_messages(messages, priority_list);
            metrics::record_selection(selected.len(), messages.len() - selected.len());
            output.add_messages(group_name, resource_key.clone(), selected);
        }
    }

    output
}

/// Select the messages to dispatch for one partition.
///
/// - No candidates: nothing is selected.
/// - No priority list, or an empty one: every candidate is selected.
/// - Otherwise the first priority label performed by some candidate wins
///   and exactly the candidates performing it are selected. If no label
///   matches, nothing is selected.
///
/// Labels are compared case-insensitively.
pub fn select_messages(messages: &[Message], priority_list: Option<&[String]>) -> Vec<Message> {
    if messages.is_empty() {
        return Vec::new();
    }

    // TODO: validate that the selected transitions keep the state model's
    // per-state replica bounds once those bounds are part of the definition.
    let priority_list = match priority_list {
        Some(list) if !list.is_empty() => list,
        _ => return messages.to_vec(),
    };

    let possible_transitions: HashSet<String> = messages
        .iter()
        .map(|m| m.transition().to_uppercase())
        .collect();

    let Some(preferred) = priority_list
        .iter()
        .find(|t| possible_transitions.contains(&t.to_uppercase()))
    else {
        return Vec::new();
    };

    messages
        .iter()
        .filter(|m| m.is_transition(preferred))
        .cloned()
        .collect()
}
