//! Data model shared by leader election and the rebalancing pipeline.
//!
//! - [`Record`]: the generic value stored at a coordination-store path
//! - [`LeaderHistory`]: typed view over the history record
//! - [`ResourceGroup`] / [`ResourceKey`]: partitions grouped under one state model
//! - [`StateModelDefinition`]: legal states and transition priority
//! - [`Message`]: a proposed state transition for one partition

mod history;
mod message;
mod record;
mod resource;
mod state_model;

pub use history::LeaderHistory;
pub use message::{Message, MessageType};
pub use record::Record;
pub use resource::{ResourceGroup, ResourceKey};
pub use state_model::{StateModelDefinition, StateModelDefinitionBuilder};
