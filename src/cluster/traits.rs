//! Coordination traits consumed by the election and pipeline code.
//!
//! These traits abstract the coordination service client, allowing for:
//! - Different backend implementations (a real coordination service, in-memory for testing)
//! - Easier testing with mock coordinators
//! - Clear separation between election logic and session management
//!
//! # Available Implementations
//!
//! - [`InMemoryDataAccessor`](super::mock_coordinator::InMemoryDataAccessor),
//!   [`MockClusterManager`](super::mock_coordinator::MockClusterManager) and
//!   [`MockManagerFactory`](super::mock_coordinator::MockManagerFactory):
//!   in-memory mocks for testing
//!
//! # Trait Hierarchy
//!
//! - [`ClusterDataAccessor`]: read, conditional-create and replace on property paths
//! - [`ClusterManager`]: one instance's handle on the cluster (identity, accessor, session)
//! - [`ClusterManagerFactory`]: opens the dedicated controller-only handle

use std::sync::Arc;

use async_trait::async_trait;

use super::error::ClusterResult;
use crate::model::Record;
use crate::types::{InstanceType, PropertyType};

/// Access to the coordination store of one cluster.
///
/// [`create_property`](Self::create_property) is the only mutual-exclusion
/// primitive in the system: it must fail when a record already exists at
/// the path, atomically with respect to every other writer.
#[async_trait]
pub trait ClusterDataAccessor: Send + Sync {
    /// Read the record at a single-valued path.
    async fn get_property(&self, property: PropertyType) -> ClusterResult<Option<Record>>;

    /// Create the record only if nothing exists at the path.
    ///
    /// Returns `Ok(true)` if this call created it, `Ok(false)` if another
    /// writer got there first.
    async fn create_property(&self, property: PropertyType, record: Record)
    -> ClusterResult<bool>;

    /// Replace the record at a path, creating it if absent.
    async fn set_property(&self, property: PropertyType, record: Record) -> ClusterResult<bool>;

    /// Read every child record under a keyed path.
    async fn get_child_properties(&self, property: PropertyType) -> ClusterResult<Vec<Record>>;

    /// Replace one child record under a keyed path.
    async fn set_child_property(
        &self,
        property: PropertyType,
        key: &str,
        record: Record,
    ) -> ClusterResult<bool>;
}

/// One instance's handle on a cluster.
#[async_trait]
pub trait ClusterManager: Send + Sync {
    fn instance_name(&self) -> &str;

    fn cluster_name(&self) -> &str;

    fn instance_type(&self) -> InstanceType;

    /// Accessor bound to this handle's session.
    fn data_accessor(&self) -> Arc<dyn ClusterDataAccessor>;

    /// Open the session with the coordination service.
    async fn connect(&self) -> ClusterResult<()>;

    /// Close the session. Closing an already closed handle is a no-op.
    async fn disconnect(&self) -> ClusterResult<()>;

    fn is_connected(&self) -> bool;
}

/// Creates the controller-only handle used when a
/// [`InstanceType::ControllerParticipant`] wins leadership.
///
/// The returned handle is not yet connected.
#[async_trait]
pub trait ClusterManagerFactory: Send + Sync {
    async fn controller_manager(
        &self,
        cluster_name: &str,
        instance_name: &str,
    ) -> ClusterResult<Arc<dyn ClusterManager>>;
}
