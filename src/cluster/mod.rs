//! Controller election and the controller role.
//!
//! This module holds everything that decides which process is the cluster
//! controller and what that process runs while it holds the role:
//! - **Coordination traits**: the narrow view of the coordination store the
//!   election and the pipeline need ([`ClusterDataAccessor`], [`ClusterManager`])
//! - **Election**: [`ControllerElection`], driven by session notifications
//! - **Controller**: [`GenericClusterController`], which owns the rebalancing pipeline
//!
//! # Architecture
//!
//! ```text
//!    ┌────────────┐   ┌────────────┐   ┌────────────┐
//!    │ Instance A │   │ Instance B │   │ Instance C │
//!    └─────┬──────┘   └─────┬──────┘   └─────┬──────┘
//!          │  create LEADER (conditional)    │
//!          └────────────────┼────────────────┘
//!                           ▼
//!                  ┌──────────────────┐
//!                  │ Coordination     │ ← LEADER, HISTORY,
//!                  │ store            │   STATEMODELDEFS, ...
//!                  └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use helmsman::cluster::{ControllerElection, NotificationContext};
//! # use helmsman::cluster::{ClusterManager, ClusterManagerFactory};
//! # async fn run(factory: Arc<dyn ClusterManagerFactory>, manager: Arc<dyn ClusterManager>) {
//! let election = ControllerElection::new(factory);
//! election.on_controller_change(NotificationContext::init(manager)).await;
//! if election.is_controller_active().await {
//!     // this process now drives the rebalancing pipeline
//! }
//! # }
//! ```

mod config;
mod controller;
mod election;
mod error;
pub mod metrics;
mod traits;

#[cfg(any(test, feature = "test-utilities"))]
pub mod mock_coordinator;

pub use config::ControllerConfig;
pub use controller::{ControllerConnection, GenericClusterController};
pub use election::{
    ControllerElection, LeadershipResult, NotificationContext, NotificationType,
    record_leader_history, try_claim_leadership,
};
pub use error::{ClusterError, ClusterResult};
#[cfg(any(test, feature = "test-utilities"))]
pub use mock_coordinator::{InMemoryDataAccessor, MockClusterManager, MockManagerFactory};
pub use traits::{ClusterDataAccessor, ClusterManager, ClusterManagerFactory};
