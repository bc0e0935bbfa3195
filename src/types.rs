//! Type-safe enums for cluster membership roles and coordination-store paths.
//!
//! Both types round-trip through their upper-case wire names so they can be
//! read from configuration and written into store records unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The role a cluster member was started with.
///
/// Only [`InstanceType::Controller`] and
/// [`InstanceType::ControllerParticipant`] may contend for leadership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceType {
    /// A dedicated controller process.
    Controller,
    /// A participant that hosts partitions and executes transitions.
    Participant,
    /// A participant that may also become the cluster controller.
    ControllerParticipant,
    /// A read-only observer of cluster state.
    Spectator,
    /// An administrative client.
    Administrator,
}

impl InstanceType {
    /// Returns true if instances of this type may contend for leadership.
    #[inline]
    pub const fn can_lead(self) -> bool {
        matches!(
            self,
            InstanceType::Controller | InstanceType::ControllerParticipant
        )
    }

    /// Returns the wire name of this type.
    pub const fn as_str(self) -> &'static str {
        match self {
            InstanceType::Controller => "CONTROLLER",
            InstanceType::Participant => "PARTICIPANT",
            InstanceType::ControllerParticipant => "CONTROLLER_PARTICIPANT",
            InstanceType::Spectator => "SPECTATOR",
            InstanceType::Administrator => "ADMINISTRATOR",
        }
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CONTROLLER" => Ok(InstanceType::Controller),
            "PARTICIPANT" => Ok(InstanceType::Participant),
            "CONTROLLER_PARTICIPANT" => Ok(InstanceType::ControllerParticipant),
            "SPECTATOR" => Ok(InstanceType::Spectator),
            "ADMINISTRATOR" => Ok(InstanceType::Administrator),
            _ => Err(format!(
                "Unknown instance type '{}'. Valid types: CONTROLLER, PARTICIPANT, \
                 CONTROLLER_PARTICIPANT, SPECTATOR, ADMINISTRATOR",
                s
            )),
        }
    }
}

/// Well-known property paths in the coordination store.
///
/// Each cluster has exactly one record at the single-valued paths
/// ([`PropertyType::Leader`], [`PropertyType::History`]).
/// [`PropertyType::StateModelDefs`] is the parent of keyed children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyType {
    /// The leader record. Its existence is the leadership token.
    Leader,
    /// Bounded FIFO of past leaders.
    History,
    /// State model definitions, keyed by definition name.
    StateModelDefs,
}

impl PropertyType {
    /// Returns the path segment for this property.
    pub const fn as_str(self) -> &'static str {
        match self {
            PropertyType::Leader => "LEADER",
            PropertyType::History => "HISTORY",
            PropertyType::StateModelDefs => "STATEMODELDEFS",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
