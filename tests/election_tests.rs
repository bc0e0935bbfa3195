//! Controller election integration tests.
//!
//! Several contenders share one in-memory coordination store, the way
//! separate processes share one coordination service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test election_tests
//! ```

use std::sync::Arc;

use helmsman::cluster::{
    ClusterDataAccessor, ClusterManager, ControllerElection, InMemoryDataAccessor,
    LeadershipResult, MockClusterManager, MockManagerFactory, NotificationContext,
    try_claim_leadership,
};
use helmsman::constants::LEADER_HISTORY_SIZE;
use helmsman::model::LeaderHistory;
use helmsman::types::{InstanceType, PropertyType};

// ============================================================================
// Test Infrastructure
// ============================================================================

struct Contender {
    manager: Arc<MockClusterManager>,
    factory: Arc<MockManagerFactory>,
    election: ControllerElection,
}

impl Contender {
    fn new(store: &Arc<InMemoryDataAccessor>, instance: &str, ty: InstanceType) -> Self {
        let manager = Arc::new(MockClusterManager::new("C1", instance, ty, store.clone()));
        let factory = Arc::new(MockManagerFactory::new(store.clone()));
        let election = ControllerElection::new(factory.clone());
        Self {
            manager,
            factory,
            election,
        }
    }

    fn handle(&self) -> Arc<dyn ClusterManager> {
        self.manager.clone()
    }

    async fn init(&self) {
        self.election
            .on_controller_change(NotificationContext::init(self.handle()))
            .await;
    }

    async fn callback(&self) {
        self.election
            .on_controller_change(NotificationContext::callback(self.handle()))
            .await;
    }

    async fn finalize(&self) {
        self.election
            .on_controller_change(NotificationContext::finalize(self.handle()))
            .await;
    }
}

async fn history(store: &InMemoryDataAccessor, cluster: &str) -> Vec<String> {
    store
        .get_property(PropertyType::History)
        .await
        .unwrap()
        .map(|record| {
            LeaderHistory::from_record(&record, cluster)
                .iter()
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Mutual Exclusion
// ============================================================================

#[tokio::test]
async fn test_first_contender_wins_second_observes_leader() {
    for (first, second) in [("I1", "I2"), ("I2", "I1")] {
        let store = Arc::new(InMemoryDataAccessor::new());
        let winner = Contender::new(&store, first, InstanceType::Controller);
        let loser = Contender::new(&store, second, InstanceType::Controller);

        winner.init().await;
        assert!(winner.election.is_controller_active().await);
        assert_eq!(store.current_leader().await.as_deref(), Some(first));
        assert_eq!(history(&store, "C1").await, vec![first]);

        loser.init().await;
        assert!(!loser.election.is_controller_active().await);
        assert!(winner.election.is_controller_active().await);
        assert_eq!(store.current_leader().await.as_deref(), Some(first));
        assert_eq!(history(&store, "C1").await, vec![first]);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_contenders_elect_exactly_one() {
    let store = Arc::new(InMemoryDataAccessor::new());
    let contenders: Vec<Arc<Contender>> = (0..8)
        .map(|i| {
            Arc::new(Contender::new(
                &store,
                &format!("I{i}"),
                InstanceType::Controller,
            ))
        })
        .collect();

    let handles: Vec<_> = contenders
        .iter()
        .cloned()
        .map(|c| tokio::spawn(async move { c.init().await }))
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let mut active = Vec::new();
    for c in &contenders {
        if c.election.is_controller_active().await {
            active.push(c.manager.instance_name().to_string());
        }
    }
    assert_eq!(active.len(), 1, "exactly one controller expected: {active:?}");
    assert_eq!(store.current_leader().await, Some(active[0].clone()));
    assert_eq!(history(&store, "C1").await, active);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_claims_single_winner() {
    let store = Arc::new(InMemoryDataAccessor::new());
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let manager =
                MockClusterManager::new("C1", &format!("I{i}"), InstanceType::Controller, store.clone());
            tokio::spawn(async move { try_claim_leadership(&manager).await.unwrap() })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().is_leader() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

// ============================================================================
// Leader History
// ============================================================================

#[tokio::test]
async fn test_history_keeps_most_recent_leaders() {
    let store = Arc::new(InMemoryDataAccessor::new());
    let total = LEADER_HISTORY_SIZE + 3;

    for i in 0..total {
        let manager = MockClusterManager::new(
            "C1",
            &format!("I{i}"),
            InstanceType::Controller,
            store.clone(),
        );
        assert!(try_claim_leadership(&manager).await.unwrap().is_leader());
        // Simulates the leader's session expiring
        store.remove_property(PropertyType::Leader).await;
    }

    let expected: Vec<String> = (total - LEADER_HISTORY_SIZE..total)
        .map(|i| format!("I{i}"))
        .collect();
    assert_eq!(history(&store, "C1").await, expected);
}

// ============================================================================
// Notification Handling
// ============================================================================

#[tokio::test]
async fn test_repeated_callbacks_are_idempotent() {
    let store = Arc::new(InMemoryDataAccessor::new());
    let i1 = Contender::new(&store, "I1", InstanceType::Controller);

    i1.init().await;
    let controller = i1.election.controller().await.unwrap();

    i1.callback().await;
    i1.callback().await;

    let still = i1.election.controller().await.unwrap();
    assert!(Arc::ptr_eq(&controller, &still));
    assert_eq!(store.create_attempts(), 1);
    assert_eq!(history(&store, "C1").await, vec!["I1"]);
}

#[tokio::test]
async fn test_controller_uses_own_connection() {
    let store = Arc::new(InMemoryDataAccessor::new());
    let i1 = Contender::new(&store, "I1", InstanceType::Controller);

    i1.init().await;

    let controller = i1.election.controller().await.unwrap();
    assert!(!controller.connection().is_dedicated());
    assert!(i1.election.leader().await.is_none());
    assert!(i1.factory.created_managers().await.is_empty());
}

#[tokio::test]
async fn test_controller_participant_opens_dedicated_connection() {
    let store = Arc::new(InMemoryDataAccessor::new());
    let p1 = Contender::new(&store, "P1", InstanceType::ControllerParticipant);

    p1.init().await;

    let controller = p1.election.controller().await.unwrap();
    assert!(controller.connection().is_dedicated());

    let created = p1.factory.created_managers().await;
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].instance_name, "P1");
    assert_eq!(created[0].cluster_name, "C1");
    assert_eq!(created[0].instance_type, InstanceType::Controller);
    assert!(created[0].is_connected());

    let leader = p1.election.leader().await.unwrap();
    assert_eq!(leader.instance_name(), "P1");
}

#[tokio::test]
async fn test_finalize_releases_dedicated_connection() {
    let store = Arc::new(InMemoryDataAccessor::new());
    let p1 = Contender::new(&store, "P1", InstanceType::ControllerParticipant);

    p1.init().await;
    p1.finalize().await;

    assert!(!p1.election.is_controller_active().await);
    assert!(p1.election.leader().await.is_none());
    let created = p1.factory.created_managers().await;
    assert_eq!(created[0].disconnect_calls(), 1);
    assert!(!created[0].is_connected());

    // A second finalize has nothing left to release
    p1.finalize().await;
    assert_eq!(created[0].disconnect_calls(), 1);
}

#[tokio::test]
async fn test_finalize_clears_direct_controller() {
    let store = Arc::new(InMemoryDataAccessor::new());
    let i1 = Contender::new(&store, "I1", InstanceType::Controller);

    i1.init().await;
    i1.finalize().await;

    assert!(!i1.election.is_controller_active().await);
    assert_eq!(i1.manager.disconnect_calls(), 0);
}

#[tokio::test]
async fn test_finalize_without_role_is_noop() {
    let store = Arc::new(InMemoryDataAccessor::new());
    let i1 = Contender::new(&store, "I1", InstanceType::Controller);

    i1.finalize().await;

    assert!(!i1.election.is_controller_active().await);
    assert_eq!(store.read_attempts(), 0);
}

#[tokio::test]
async fn test_wrong_instance_type_never_touches_store() {
    let store = Arc::new(InMemoryDataAccessor::new());
    for ty in [
        InstanceType::Participant,
        InstanceType::Spectator,
        InstanceType::Administrator,
    ] {
        let c = Contender::new(&store, "X1", ty);
        c.init().await;
        c.callback().await;
        c.finalize().await;
        assert!(!c.election.is_controller_active().await);
    }
    assert_eq!(store.read_attempts(), 0);
    assert_eq!(store.create_attempts(), 0);
}

// ============================================================================
// Failover
// ============================================================================

#[tokio::test]
async fn test_failover_after_leader_session_expires() {
    let store = Arc::new(InMemoryDataAccessor::new());
    let i1 = Contender::new(&store, "I1", InstanceType::Controller);
    let i2 = Contender::new(&store, "I2", InstanceType::Controller);

    i1.init().await;
    i2.init().await;
    assert!(i1.election.is_controller_active().await);
    assert!(!i2.election.is_controller_active().await);

    i1.finalize().await;
    store.remove_property(PropertyType::Leader).await;
    i2.callback().await;

    assert!(!i1.election.is_controller_active().await);
    assert!(i2.election.is_controller_active().await);
    assert_eq!(store.current_leader().await.as_deref(), Some("I2"));
    assert_eq!(history(&store, "C1").await, vec!["I1", "I2"]);
}

#[tokio::test]
async fn test_dedicated_connect_failure_leaves_role_inactive() {
    let store = Arc::new(InMemoryDataAccessor::new());
    let p1 = Contender::new(&store, "P1", InstanceType::ControllerParticipant);
    p1.factory.set_fail_connect(true);

    p1.init().await;

    assert!(!p1.election.is_controller_active().await);
    assert!(p1.election.leader().await.is_none());
    // The claim itself succeeded and is not retracted
    assert_eq!(store.current_leader().await.as_deref(), Some("P1"));

    // Later notifications observe the record naming this instance
    p1.factory.set_fail_connect(false);
    p1.callback().await;
    assert!(!p1.election.is_controller_active().await);
    assert_eq!(
        try_claim_leadership(p1.manager.as_ref()).await.unwrap(),
        LeadershipResult::Lost {
            current_leader: Some("P1".to_string())
        }
    );
}

#[tokio::test]
async fn test_transient_store_failure_recovers_on_next_callback() {
    let store = Arc::new(InMemoryDataAccessor::new());
    let i1 = Contender::new(&store, "I1", InstanceType::Controller);

    store.fail_next_reads(1);
    i1.init().await;
    assert!(!i1.election.is_controller_active().await);
    assert!(store.current_leader().await.is_none());

    i1.callback().await;
    assert!(i1.election.is_controller_active().await);
}
