//! State model definitions.
//!
//! A state model lists the legal states of a resource type and, more
//! importantly for the controller, the order in which pending transitions
//! should be dispatched. The transition priority list encodes safety
//! preferences such as "bring replicas up before promoting a master".

use crate::constants::{
    INITIAL_STATE_FIELD, STATE_PRIORITY_FIELD, STATE_TRANSITION_PRIORITY_FIELD,
    TRANSITION_SEPARATOR,
};

use super::Record;

/// Legal states and transition priority of a resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateModelDefinition {
    id: String,
    initial_state: Option<String>,
    state_priority_list: Vec<String>,
    transition_priority_list: Vec<String>,
}

impl StateModelDefinition {
    /// Start building a definition with the given id.
    pub fn builder(id: impl Into<String>) -> StateModelDefinitionBuilder {
        StateModelDefinitionBuilder {
            definition: StateModelDefinition {
                id: id.into(),
                ..Default::default()
            },
        }
    }

    /// Read a definition from its stored record.
    ///
    /// Missing fields are left empty; an empty transition priority list
    /// means "no ordering", not "no legal transitions".
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id().to_string(),
            initial_state: record.simple_field(INITIAL_STATE_FIELD).map(str::to_string),
            state_priority_list: record
                .list_field(STATE_PRIORITY_FIELD)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
            transition_priority_list: record
                .list_field(STATE_TRANSITION_PRIORITY_FIELD)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
        }
    }

    /// Encode this definition as a store record.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new(self.id.clone());
        if let Some(initial) = &self.initial_state {
            record.set_simple_field(INITIAL_STATE_FIELD, initial.clone());
        }
        record.set_list_field(STATE_PRIORITY_FIELD, self.state_priority_list.clone());
        record.set_list_field(
            STATE_TRANSITION_PRIORITY_FIELD,
            self.transition_priority_list.clone(),
        );
        record
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn initial_state(&self) -> Option<&str> {
        self.initial_state.as_deref()
    }

    pub fn state_priority_list(&self) -> &[String] {
        &self.state_priority_list
    }

    /// Ordered `FROM-TO` labels, highest priority first.
    pub fn transition_priority_list(&self) -> &[String] {
        &self.transition_priority_list
    }
}

/// Builder for [`StateModelDefinition`].
#[derive(Debug, Clone)]
pub struct StateModelDefinitionBuilder {
    definition: StateModelDefinition,
}

impl StateModelDefinitionBuilder {
    pub fn initial_state(mut self, state: impl Into<String>) -> Self {
        self.definition.initial_state = Some(state.into());
        self
    }

    /// Append a state; earlier states have higher priority.
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.definition.state_priority_list.push(state.into());
        self
    }

    /// Append a transition; earlier transitions are dispatched first.
    pub fn transition(mut self, from: &str, to: &str) -> Self {
        self.definition
            .transition_priority_list
            .push(format!("{from}{TRANSITION_SEPARATOR}{to}"));
        self
    }

    /// Append a raw `FROM-TO` label.
    pub fn transition_label(mut self, label: impl Into<String>) -> Self {
        self.definition.transition_priority_list.push(label.into());
        self
    }

    pub fn build(self) -> StateModelDefinition {
        self.definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn master_slave() -> StateModelDefinition {
        StateModelDefinition::builder("MasterSlave")
            .initial_state("OFFLINE")
            .state("MASTER")
            .state("SLAVE")
            .state("OFFLINE")
            .transition("OFFLINE", "SLAVE")
            .transition("SLAVE", "MASTER")
            .transition("MASTER", "SLAVE")
            .transition("SLAVE", "OFFLINE")
            .build()
    }

    #[test]
    fn test_builder_formats_transition_labels() {
        let def = master_slave();
        assert_eq!(
            def.transition_priority_list(),
            &["OFFLINE-SLAVE", "SLAVE-MASTER", "MASTER-SLAVE", "SLAVE-OFFLINE"]
        );
        assert_eq!(def.initial_state(), Some("OFFLINE"));
    }

    #[test]
    fn test_record_round_trip() {
        let def = master_slave();
        let record = def.to_record();
        assert_eq!(record.id(), "MasterSlave");
        assert_eq!(StateModelDefinition::from_record(&record), def);
    }

    #[test]
    fn test_from_record_without_priority_list() {
        let record = Record::new("Bare");
        let def = StateModelDefinition::from_record(&record);
        assert!(def.transition_priority_list().is_empty());
        assert!(def.initial_state().is_none());
    }
}
