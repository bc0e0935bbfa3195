//! Centralized constants for leader election and the rebalancing pipeline.
//!
//! Keeping these in one place makes the coordination-store layout and the
//! election limits easy to audit.
//!
//! # Categories
//!
//! - **Election Constants**: leader history bounds and record field names
//! - **State Model Constants**: record fields that describe a state model
//! - **Configuration Defaults**: fallbacks used by `ControllerConfig`

// =============================================================================
// Election Constants
// =============================================================================

/// Maximum number of past leaders kept in the history record per cluster.
///
/// When a new leader is appended to a full history, the oldest entry is
/// evicted first so the list always holds the most recent winners in
/// arrival order.
pub const LEADER_HISTORY_SIZE: usize = 8;

/// Simple field of the leader record that names the current leader.
pub const LEADER_FIELD: &str = "LEADER";

// =============================================================================
// State Model Constants
// =============================================================================

/// Separator between the from-state and to-state of a transition label.
///
/// A transition from `OFFLINE` to `SLAVE` is labelled `OFFLINE-SLAVE`.
pub const TRANSITION_SEPARATOR: &str = "-";

/// List field holding the ordered transition priority labels.
pub const STATE_TRANSITION_PRIORITY_FIELD: &str = "STATE_TRANSITION_PRIORITYLIST";

/// List field holding the ordered state priority list.
pub const STATE_PRIORITY_FIELD: &str = "STATE_PRIORITY_LIST";

/// Simple field holding the initial state of a state model.
pub const INITIAL_STATE_FIELD: &str = "INITIAL_STATE";

// =============================================================================
// Configuration Defaults
// =============================================================================

/// Default cluster name when `CLUSTER_NAME` is unset.
pub const DEFAULT_CLUSTER_NAME: &str = "helmsman-cluster";

/// Default coordination service address when `COORDINATION_ADDRESS` is unset.
pub const DEFAULT_COORDINATION_ADDRESS: &str = "localhost:2181";

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";
