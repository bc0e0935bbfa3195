//! Proposed state transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::TRANSITION_SEPARATOR;

use super::ResourceKey;

/// Kind of message sent to a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Move one partition replica from one state to another.
    StateTransition,
}

/// A proposed state transition for one partition on one instance.
///
/// Messages are generated upstream of the selection stage, filtered by it
/// and forwarded to dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: Uuid,
    message_type: MessageType,
    from_state: String,
    to_state: String,
    resource_group: String,
    resource_key: ResourceKey,
    target_instance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state_model_def_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_instance: Option<String>,
    created_at: DateTime<Utc>,
}

impl Message {
    /// Create a state transition message with a fresh id.
    pub fn state_transition(
        resource_group: impl Into<String>,
        resource_key: impl Into<ResourceKey>,
        target_instance: impl Into<String>,
        from_state: impl Into<String>,
        to_state: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            message_type: MessageType::StateTransition,
            from_state: from_state.into(),
            to_state: to_state.into(),
            resource_group: resource_group.into(),
            resource_key: resource_key.into(),
            target_instance: target_instance.into(),
            target_session_id: None,
            state_model_def_ref: None,
            source_instance: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_target_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.target_session_id = Some(session_id.into());
        self
    }

    pub fn with_state_model_def_ref(mut self, def_ref: impl Into<String>) -> Self {
        self.state_model_def_ref = Some(def_ref.into());
        self
    }

    /// Record which controller produced this message.
    pub fn with_source_instance(mut self, instance: impl Into<String>) -> Self {
        self.source_instance = Some(instance.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn from_state(&self) -> &str {
        &self.from_state
    }

    pub fn to_state(&self) -> &str {
        &self.to_state
    }

    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    pub fn resource_key(&self) -> &ResourceKey {
        &self.resource_key
    }

    pub fn target_instance(&self) -> &str {
        &self.target_instance
    }

    pub fn target_session_id(&self) -> Option<&str> {
        self.target_session_id.as_deref()
    }

    pub fn state_model_def_ref(&self) -> Option<&str> {
        self.state_model_def_ref.as_deref()
    }

    pub fn source_instance(&self) -> Option<&str> {
        self.source_instance.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The `FROM-TO` label of this transition, as written by the generator.
    pub fn transition(&self) -> String {
        format!("{}{}{}", self.from_state, TRANSITION_SEPARATOR, self.to_state)
    }

    /// Case-insensitive comparison against a `FROM-TO` label.
    pub fn is_transition(&self, label: &str) -> bool {
        self.transition().to_uppercase() == label.to_uppercase()
    }
}
