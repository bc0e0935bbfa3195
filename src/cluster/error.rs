//! Error types for coordination and leader election.
//!
//! # Error Handling Patterns
//!
//! Two patterns are used depending on how critical the operation is.
//!
//! ## Fail-Fast (Propagate Errors)
//!
//! Used where failure means the caller cannot safely continue:
//! - Reading the leader record
//! - The conditional create that claims leadership
//! - Connecting the dedicated controller connection
//!
//! ```text
//! let current = accessor.get_property(PropertyType::Leader).await?;
//! ```
//!
//! ## Best-Effort (Log and Continue)
//!
//! Used where a failure must not undo work that already succeeded:
//! - Appending to the leader history after a won election
//! - Disconnecting the dedicated connection on finalize
//!
//! ```text
//! if let Err(e) = record_leader_history(accessor, cluster, instance).await {
//!     warn!(error = %e, "Failed to update leader history");
//! }
//! ```
//!
//! Errors never cross the election notification handler: it logs and
//! swallows them so the watch-handling task survives any single failure.

use thiserror::Error;

use crate::types::{InstanceType, PropertyType};

/// Result type for coordination operations.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Errors that can occur while talking to the coordination store or
/// managing the controller role.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The coordination store rejected or failed an operation.
    #[error("Coordination store error on {property}: {message}")]
    Store {
        property: PropertyType,
        message: String,
    },

    /// The cluster manager handle is not connected.
    #[error("Cluster manager for {instance} in cluster {cluster} is not connected")]
    NotConnected { cluster: String, instance: String },

    /// A stored record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The instance type is not allowed to take the controller role.
    #[error("Instance {instance} has type {instance_type}, which cannot act as controller")]
    InvalidInstanceType {
        instance: String,
        instance_type: InstanceType,
    },
}

impl ClusterError {
    /// Build a store error for the given property.
    pub fn store(property: PropertyType, message: impl Into<String>) -> Self {
        ClusterError::Store {
            property,
            message: message.into(),
        }
    }

    /// Check if the next notification may succeed where this attempt failed.
    ///
    /// Store and connection failures are transient. Misconfigured instance
    /// types and encoding problems repeat until an operator intervenes.
    #[inline]
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ClusterError::Store { .. } | ClusterError::NotConnected { .. }
        )
    }

    /// Short label used for metrics.
    pub fn as_metric_label(&self) -> &'static str {
        match self {
            ClusterError::Store { .. } => "store",
            ClusterError::NotConnected { .. } => "not_connected",
            ClusterError::Serialization(_) => "serialization",
            ClusterError::InvalidInstanceType { .. } => "invalid_instance_type",
        }
    }
}
