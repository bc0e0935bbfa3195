//! The in-process controller role.
//!
//! A [`GenericClusterController`] exists only while this process holds
//! leadership. It owns the rebalancing [`Pipeline`] and the connection the
//! pipeline reads cluster state through. Which connection that is gets
//! decided once, when the role is created, and is recorded in
//! [`ControllerConnection`].

use std::sync::Arc;

use tracing::{debug, info};

use super::traits::ClusterManager;
use crate::pipeline::{ClusterDataCache, ClusterEvent, EventAttribute, Pipeline, StageResult};

/// Connection backing the controller's pipeline.
#[derive(Clone)]
pub enum ControllerConnection {
    /// A dedicated controller process drives the pipeline through its own
    /// connection.
    Direct(Arc<dyn ClusterManager>),
    /// A controller-participant opened a second, controller-only connection
    /// so the participant session stays decoupled from controller duties.
    Dedicated(Arc<dyn ClusterManager>),
}

impl ControllerConnection {
    /// The handle the pipeline runs against.
    pub fn manager(&self) -> &Arc<dyn ClusterManager> {
        match self {
            ControllerConnection::Direct(manager) | ControllerConnection::Dedicated(manager) => {
                manager
            }
        }
    }

    /// Returns true if this connection was opened for the controller role
    /// and must be closed when the role ends.
    pub fn is_dedicated(&self) -> bool {
        matches!(self, ControllerConnection::Dedicated(_))
    }
}

impl std::fmt::Debug for ControllerConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (kind, manager) = match self {
            ControllerConnection::Direct(m) => ("Direct", m),
            ControllerConnection::Dedicated(m) => ("Dedicated", m),
        };
        f.debug_struct(kind)
            .field("cluster", &manager.cluster_name())
            .field("instance", &manager.instance_name())
            .field("connected", &manager.is_connected())
            .finish()
    }
}

/// This process acting as the authoritative controller of a cluster.
#[derive(Debug)]
pub struct GenericClusterController {
    connection: ControllerConnection,
    pipeline: Pipeline,
}

impl GenericClusterController {
    /// Create a controller running the default rebalancing pipeline.
    pub fn new(connection: ControllerConnection) -> Self {
        Self::with_pipeline(connection, Pipeline::rebalance())
    }

    pub fn with_pipeline(connection: ControllerConnection, pipeline: Pipeline) -> Self {
        info!(
            cluster = %connection.manager().cluster_name(),
            instance = %connection.manager().instance_name(),
            dedicated = connection.is_dedicated(),
            stages = ?pipeline.stage_names(),
            "Controller role started"
        );
        Self {
            connection,
            pipeline,
        }
    }

    pub fn connection(&self) -> &ControllerConnection {
        &self.connection
    }

    pub fn cluster_name(&self) -> &str {
        self.connection.manager().cluster_name()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run one pipeline pass over `event`.
    ///
    /// If the caller did not supply a data cache, one is loaded through the
    /// controller's connection first. The event is returned with every
    /// attribute the stages produced.
    pub async fn process_event(&self, mut event: ClusterEvent) -> StageResult<ClusterEvent> {
        if event.data_cache().is_none() {
            let accessor = self.connection.manager().data_accessor();
            let cache = ClusterDataCache::load(accessor.as_ref()).await?;
            event.insert(EventAttribute::DataCache(Arc::new(cache)));
        }

        debug!(cluster = %self.cluster_name(), event = %event, "Running pipeline pass");
        self.pipeline.handle(&mut event).await?;
        Ok(event)
    }
}
