//! # Helmsman
//! Controller election and message selection for a partitioned cluster.
//!
//! Every member of a Helmsman cluster that may act as controller races to
//! create a single leader record in a shared coordination store. The winner
//! runs the rebalancing pipeline, which turns candidate state-transition
//! messages into the set that is actually dispatched in one pass.
//!
//! # Goals
//! - Easy to understand code
//! - At most one controller per cluster, enforced by the store alone
//! - Deterministic, per-partition message selection driven by the state model
//!
//! ## Getting started
//! Include the following snippet in your `Cargo.toml` dependencies:
//! ```toml
//! helmsman = "0.1"
//! ```
//!
//! ### Running for controller
//! Implement [`ClusterManager`](cluster::ClusterManager) and
//! [`ClusterManagerFactory`](cluster::ClusterManagerFactory) over your
//! coordination client, then forward its session notifications to a
//! [`ControllerElection`](cluster::ControllerElection):
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use helmsman::prelude::*;
//!
//! async fn on_session_event(
//!     election: &ControllerElection,
//!     manager: Arc<dyn ClusterManager>,
//!     expired: bool,
//! ) {
//!     let ctx = if expired {
//!         NotificationContext::finalize(manager)
//!     } else {
//!         NotificationContext::callback(manager)
//!     };
//!     election.on_controller_change(ctx).await;
//! }
//! ```
//!
//! ### Selecting messages
//! ```rust
//! use helmsman::prelude::*;
//!
//! let messages = vec![
//!     Message::state_transition("db", "db_0", "node1", "OFFLINE", "SLAVE"),
//!     Message::state_transition("db", "db_0", "node2", "SLAVE", "MASTER"),
//! ];
//! let priority = vec!["SLAVE-MASTER".to_string(), "OFFLINE-SLAVE".to_string()];
//! let selected = select_messages(&messages, Some(priority.as_slice()));
//! assert_eq!(selected.len(), 1);
//! assert_eq!(selected[0].to_state(), "MASTER");
//! ```

#![forbid(unsafe_code)]

pub mod cluster;
pub mod constants;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod telemetry;
pub mod types;

pub mod prelude {
    //! Main exports for embedding the controller.
    //!
    //! Brings the election, the controller role, the pipeline and the model
    //! types into scope with one `use helmsman::prelude::*;`.
    pub use crate::cluster::{
        ClusterDataAccessor, ClusterError, ClusterManager, ClusterManagerFactory,
        ClusterResult, ControllerConfig, ControllerConnection, ControllerElection,
        GenericClusterController, LeadershipResult, NotificationContext, NotificationType,
    };
    pub use crate::error::{Error, Result};
    pub use crate::model::{
        LeaderHistory, Message, MessageType, Record, ResourceGroup, ResourceKey,
        StateModelDefinition,
    };
    pub use crate::pipeline::{
        AttributeName, ClusterDataCache, ClusterEvent, EventAttribute, MessageGenerationOutput,
        MessageSelectionOutput, MessageSelectionStage, Pipeline, Stage, StageError, StageResult,
        select_messages,
    };
    pub use crate::types::{InstanceType, PropertyType};
}
