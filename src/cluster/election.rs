//! Distributed controller election.
//!
//! Every controller-capable instance registers a [`ControllerElection`] with
//! the coordination layer. Whenever the local session initializes or a
//! watched leadership node changes, the election tries to claim the leader
//! record; the instance whose conditional create succeeds becomes the
//! controller for the cluster. When the local session is torn down the role
//! is released.
//!
//! # Mutual Exclusion
//!
//! The coordination store's conditional create is the only lock. At most
//! one create succeeds per vacancy of the leader record, so at most one
//! contender observes [`LeadershipResult::Won`]. Locally, every notification
//! runs inside one async mutex, so the controller role is created and
//! destroyed by one notification at a time.
//!
//! ```text
//!   Init / Callback ──▶ try_claim_leadership ──▶ Won ──▶ GenericClusterController
//!                                              └─▶ Lost ──▶ (nothing)
//!   Finalize ─────────▶ disconnect dedicated connection, drop controller role
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::controller::{ControllerConnection, GenericClusterController};
use super::error::{ClusterError, ClusterResult};
use super::metrics;
use super::traits::{ClusterDataAccessor, ClusterManager, ClusterManagerFactory};
use crate::constants::LEADER_FIELD;
use crate::model::{LeaderHistory, Record};
use crate::types::{InstanceType, PropertyType};

/// Why the election handler is being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    /// The local connection was just established.
    Init,
    /// A watched leadership node changed.
    Callback,
    /// The local connection is being torn down.
    Finalize,
}

/// A notification delivered to [`ControllerElection::on_controller_change`].
#[derive(Clone)]
pub struct NotificationContext {
    manager: Arc<dyn ClusterManager>,
    kind: NotificationType,
}

impl NotificationContext {
    pub fn new(manager: Arc<dyn ClusterManager>, kind: NotificationType) -> Self {
        Self { manager, kind }
    }

    pub fn init(manager: Arc<dyn ClusterManager>) -> Self {
        Self::new(manager, NotificationType::Init)
    }

    pub fn callback(manager: Arc<dyn ClusterManager>) -> Self {
        Self::new(manager, NotificationType::Callback)
    }

    pub fn finalize(manager: Arc<dyn ClusterManager>) -> Self {
        Self::new(manager, NotificationType::Finalize)
    }

    /// The local handle that received the notification.
    pub fn manager(&self) -> &Arc<dyn ClusterManager> {
        &self.manager
    }

    pub fn kind(&self) -> NotificationType {
        self.kind
    }
}

impl std::fmt::Debug for NotificationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationContext")
            .field("kind", &self.kind)
            .field("cluster", &self.manager.cluster_name())
            .field("instance", &self.manager.instance_name())
            .finish()
    }
}

/// Result of one leadership claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadershipResult {
    /// This instance created the leader record.
    Won,
    /// Leadership is held by another instance.
    Lost {
        /// Instance named by the leader record, if it could be read.
        current_leader: Option<String>,
    },
}

impl LeadershipResult {
    /// Returns true if leadership was won.
    #[must_use]
    pub const fn is_leader(&self) -> bool {
        matches!(self, Self::Won)
    }

    fn as_metric_label(&self) -> &'static str {
        match self {
            Self::Won => "won",
            Self::Lost { .. } => "lost",
        }
    }
}

/// Local controller state, only touched inside the election mutex.
#[derive(Default)]
struct ElectionState {
    controller: Option<Arc<GenericClusterController>>,
    /// Controller-only connection opened by a controller-participant
    leader: Option<Arc<dyn ClusterManager>>,
}

/// Reacts to leadership notifications for one local instance.
///
/// Safe to call from the coordination client's callback task and from an
/// explicit reset path at the same time: notifications are handled one at
/// a time, end to end.
pub struct ControllerElection {
    factory: Arc<dyn ClusterManagerFactory>,
    state: Mutex<ElectionState>,
}

impl ControllerElection {
    /// `factory` opens the controller-only connection used when a
    /// controller-participant wins.
    pub fn new(factory: Arc<dyn ClusterManagerFactory>) -> Self {
        Self {
            factory,
            state: Mutex::new(ElectionState::default()),
        }
    }

    /// The active controller role, if this instance holds it.
    pub async fn controller(&self) -> Option<Arc<GenericClusterController>> {
        self.state.lock().await.controller.clone()
    }

    /// The dedicated controller-only connection, if one is open.
    pub async fn leader(&self) -> Option<Arc<dyn ClusterManager>> {
        self.state.lock().await.leader.clone()
    }

    pub async fn is_controller_active(&self) -> bool {
        self.state.lock().await.controller.is_some()
    }

    /// Handle one leadership notification.
    ///
    /// Never fails: errors are logged and the next notification retries.
    pub async fn on_controller_change(&self, ctx: NotificationContext) {
        let mut state = self.state.lock().await;
        let manager = ctx.manager();

        let instance_type = manager.instance_type();
        if !instance_type.can_lead() {
            error!(
                cluster = %manager.cluster_name(),
                instance = %manager.instance_name(),
                instance_type = %instance_type,
                "Fail to set up controller because of incorrect instance type"
            );
            metrics::record_election("misconfigured");
            return;
        }

        let result = match ctx.kind() {
            NotificationType::Init | NotificationType::Callback => {
                self.handle_change(&mut state, manager).await
            }
            NotificationType::Finalize => Self::handle_finalize(&mut state).await,
        };

        if let Err(e) = result {
            error!(
                cluster = %manager.cluster_name(),
                instance = %manager.instance_name(),
                notification = ?ctx.kind(),
                error = %e,
                retriable = e.is_retriable(),
                "Exception when trying to become leader"
            );
            metrics::record_election("error");
        }

        metrics::set_controller_active(
            manager.cluster_name(),
            manager.instance_name(),
            state.controller.is_some(),
        );
    }

    async fn handle_change(
        &self,
        state: &mut ElectionState,
        manager: &Arc<dyn ClusterManager>,
    ) -> ClusterResult<()> {
        let result = try_claim_leadership(manager.as_ref()).await?;
        metrics::record_election(result.as_metric_label());

        if let LeadershipResult::Lost { current_leader } = &result {
            if state.controller.is_none()
                && current_leader.as_deref() == Some(manager.instance_name())
            {
                warn!(
                    cluster = %manager.cluster_name(),
                    instance = %manager.instance_name(),
                    "Leader record names this instance but no controller role is active"
                );
            }
            return Ok(());
        }

        if state.controller.is_some() || state.leader.is_some() {
            debug!(
                cluster = %manager.cluster_name(),
                instance = %manager.instance_name(),
                "Controller role already active"
            );
            return Ok(());
        }

        let connection = match manager.instance_type() {
            InstanceType::Controller => ControllerConnection::Direct(manager.clone()),
            InstanceType::ControllerParticipant => {
                let leader = self
                    .factory
                    .controller_manager(manager.cluster_name(), manager.instance_name())
                    .await?;
                leader.connect().await?;
                state.leader = Some(leader.clone());
                ControllerConnection::Dedicated(leader)
            }
            other => {
                return Err(ClusterError::InvalidInstanceType {
                    instance: manager.instance_name().to_string(),
                    instance_type: other,
                });
            }
        };

        state.controller = Some(Arc::new(GenericClusterController::new(connection)));
        Ok(())
    }

    async fn handle_finalize(state: &mut ElectionState) -> ClusterResult<()> {
        let controller = state.controller.take();
        let leader = state.leader.take();

        if let Some(controller) = &controller {
            info!(cluster = %controller.cluster_name(), "Releasing controller role");
        }

        if let Some(leader) = leader {
            info!(
                cluster = %leader.cluster_name(),
                instance = %leader.instance_name(),
                "Disconnecting controller-only connection"
            );
            leader.disconnect().await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ControllerElection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerElection").finish_non_exhaustive()
    }
}

/// Try to claim the leader record for the manager's cluster.
///
/// Reads the leader record; if it is absent, attempts the conditional
/// create. A successful create appends this instance to the leader history
/// and returns [`LeadershipResult::Won`]. A failed create means another
/// contender won the race: the record is read once more and the claim
/// returns [`LeadershipResult::Lost`]. The create is never retried within
/// one claim, so the loop runs at most twice.
pub async fn try_claim_leadership(manager: &dyn ClusterManager) -> ClusterResult<LeadershipResult> {
    let instance_name = manager.instance_name();
    let cluster_name = manager.cluster_name();
    let accessor = manager.data_accessor();

    let mut leader_record = Record::new(PropertyType::Leader.as_str());
    leader_record.set_simple_field(LEADER_FIELD, instance_name);

    let mut create_failed = false;
    loop {
        match accessor.get_property(PropertyType::Leader).await? {
            Some(current) => {
                let current_leader = current.simple_field(LEADER_FIELD).map(str::to_string);
                info!(
                    cluster = %cluster_name,
                    current_leader = current_leader.as_deref().unwrap_or("<unknown>"),
                    "Leader exists for cluster"
                );
                return Ok(LeadershipResult::Lost { current_leader });
            }
            None if create_failed => {
                warn!(
                    cluster = %cluster_name,
                    instance = %instance_name,
                    "Leader record still vacant after a failed create, waiting for next notification"
                );
                return Ok(LeadershipResult::Lost {
                    current_leader: None,
                });
            }
            None => {
                if accessor
                    .create_property(PropertyType::Leader, leader_record.clone())
                    .await?
                {
                    if let Err(e) =
                        record_leader_history(accessor.as_ref(), cluster_name, instance_name).await
                    {
                        warn!(
                            cluster = %cluster_name,
                            error = %e,
                            "Failed to update leader history"
                        );
                    }
                    info!(cluster = %cluster_name, instance = %instance_name, "Became leader");
                    return Ok(LeadershipResult::Won);
                }

                info!(
                    cluster = %cluster_name,
                    instance = %instance_name,
                    "Unable to become leader, probably another controller became the leader"
                );
                create_failed = true;
            }
        }
    }
}

/// Append `instance_name` to the cluster's leader history.
///
/// Creates the history record and the cluster's list if either is absent,
/// and evicts the oldest entry when the list is full. Lists of other
/// clusters in the same record are left untouched.
pub async fn record_leader_history(
    accessor: &dyn ClusterDataAccessor,
    cluster_name: &str,
    instance_name: &str,
) -> ClusterResult<()> {
    let mut record = accessor
        .get_property(PropertyType::History)
        .await?
        .unwrap_or_else(|| Record::new(PropertyType::History.as_str()));

    let mut history = LeaderHistory::from_record(&record, cluster_name);
    history.push(instance_name);
    history.write_into(&mut record, cluster_name);

    if !accessor.set_property(PropertyType::History, record).await? {
        warn!(cluster = %cluster_name, "Leader history write was not applied");
    }
    Ok(())
}
