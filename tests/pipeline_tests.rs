//! Rebalancing pipeline integration tests.
//!
//! Drives [`GenericClusterController::process_event`] against an in-memory
//! store holding state model definitions, the way an active controller runs
//! a pass after an upstream stage produced candidate messages.

use std::collections::BTreeMap;
use std::sync::Arc;

use helmsman::cluster::{
    ClusterDataAccessor, ControllerConnection, GenericClusterController, InMemoryDataAccessor,
    MockClusterManager,
};
use helmsman::model::{Message, ResourceGroup, ResourceKey, StateModelDefinition};
use helmsman::pipeline::{
    AttributeName, ClusterDataCache, ClusterEvent, EventAttribute, MessageGenerationOutput,
    Pipeline, StageError,
};
use helmsman::types::{InstanceType, PropertyType};

// ============================================================================
// Test Infrastructure
// ============================================================================

fn master_slave() -> StateModelDefinition {
    StateModelDefinition::builder("MasterSlave")
        .initial_state("OFFLINE")
        .state("MASTER")
        .state("SLAVE")
        .state("OFFLINE")
        .transition("SLAVE", "MASTER")
        .transition("OFFLINE", "SLAVE")
        .transition("MASTER", "SLAVE")
        .transition("SLAVE", "OFFLINE")
        .build()
}

async fn store_with_state_models() -> Arc<InMemoryDataAccessor> {
    let store = Arc::new(InMemoryDataAccessor::new());
    let def = master_slave();
    store
        .set_child_property(PropertyType::StateModelDefs, def.id(), def.to_record())
        .await
        .unwrap();
    store
}

fn controller(store: &Arc<InMemoryDataAccessor>) -> GenericClusterController {
    let manager = Arc::new(MockClusterManager::new(
        "C1",
        "I1",
        InstanceType::Controller,
        store.clone(),
    ));
    GenericClusterController::new(ControllerConnection::Direct(manager))
}

fn resource_groups() -> BTreeMap<String, ResourceGroup> {
    let mut groups = BTreeMap::new();
    groups.insert(
        "db".to_string(),
        ResourceGroup::new("db", "MasterSlave")
            .with_resource_key("db_0")
            .with_resource_key("db_1")
            .with_resource_key("db_2"),
    );
    groups
}

fn transition(key: &str, instance: &str, from: &str, to: &str) -> Message {
    Message::state_transition("db", key, instance, from, to)
        .with_state_model_def_ref("MasterSlave")
        .with_source_instance("I1")
}

fn candidates() -> MessageGenerationOutput {
    let mut all = MessageGenerationOutput::new();
    // db_0: promotion and bootstrap compete, promotion ranks first
    all.add_message("db", ResourceKey::new("db_0"), transition("db_0", "n1", "SLAVE", "MASTER"));
    all.add_message("db", ResourceKey::new("db_0"), transition("db_0", "n2", "OFFLINE", "SLAVE"));
    all.add_message("db", ResourceKey::new("db_0"), transition("db_0", "n3", "OFFLINE", "SLAVE"));
    // db_1: only bootstraps
    all.add_message("db", ResourceKey::new("db_1"), transition("db_1", "n1", "OFFLINE", "SLAVE"));
    all.add_message("db", ResourceKey::new("db_1"), transition("db_1", "n2", "OFFLINE", "SLAVE"));
    // db_2: nothing pending
    all
}

fn pass(name: &str) -> ClusterEvent {
    ClusterEvent::new(name)
        .with(EventAttribute::ResourceGroups(resource_groups()))
        .with(EventAttribute::MessagesAll(candidates()))
}

// ============================================================================
// Pipeline Passes
// ============================================================================

#[tokio::test]
async fn test_pass_loads_state_models_and_selects_per_partition() {
    let store = store_with_state_models().await;
    let controller = controller(&store);

    let event = controller.process_event(pass("idealStateChange")).await.unwrap();

    let cache = event.data_cache().unwrap();
    assert_eq!(cache.state_model_def_count(), 1);

    let selected = event.messages_selected().unwrap();
    let db_0 = selected.messages("db", &ResourceKey::new("db_0"));
    assert_eq!(db_0.len(), 1);
    assert_eq!(db_0[0].transition(), "SLAVE-MASTER");

    let db_1 = selected.messages("db", &ResourceKey::new("db_1"));
    assert_eq!(db_1.len(), 2);
    assert!(db_1.iter().all(|m| m.transition() == "OFFLINE-SLAVE"));

    assert!(selected.contains_key("db", &ResourceKey::new("db_2")));
    assert!(selected.messages("db", &ResourceKey::new("db_2")).is_empty());
    assert_eq!(selected.message_count(), 3);
}

#[tokio::test]
async fn test_supplied_cache_is_not_reloaded() {
    let store = Arc::new(InMemoryDataAccessor::new());
    let controller = controller(&store);

    let event = pass("external").with(EventAttribute::DataCache(Arc::new(
        ClusterDataCache::new().with_state_model_def(master_slave()),
    )));
    let event = controller.process_event(event).await.unwrap();

    assert_eq!(store.read_attempts(), 0);
    assert_eq!(event.messages_selected().unwrap().message_count(), 3);
}

#[tokio::test]
async fn test_unknown_state_model_passes_candidates_through() {
    // Store holds no state model definitions at all
    let store = Arc::new(InMemoryDataAccessor::new());
    let controller = controller(&store);

    let event = controller.process_event(pass("noModels")).await.unwrap();

    let selected = event.messages_selected().unwrap();
    assert_eq!(selected.message_count(), candidates().message_count());
}

#[tokio::test]
async fn test_missing_candidates_aborts_pass() {
    let store = store_with_state_models().await;
    let controller = controller(&store);

    let event = ClusterEvent::new("incomplete")
        .with(EventAttribute::ResourceGroups(resource_groups()));
    let err = controller.process_event(event).await.unwrap_err();

    match err {
        StageError::MissingAttributes { missing, .. } => {
            assert_eq!(missing, vec![AttributeName::MessagesAll]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_cache_load_failure_aborts_pass() {
    let store = store_with_state_models().await;
    store.fail_next_reads(1);
    let controller = controller(&store);

    let err = controller.process_event(pass("flaky")).await.unwrap_err();
    assert!(matches!(err, StageError::Cluster(e) if e.is_retriable()));

    // The next pass reads the store again and succeeds
    assert!(controller.process_event(pass("retry")).await.is_ok());
}

#[tokio::test]
async fn test_empty_pipeline_leaves_event_untouched() {
    let store = store_with_state_models().await;
    let manager = Arc::new(MockClusterManager::new(
        "C1",
        "I1",
        InstanceType::Controller,
        store.clone(),
    ));
    let controller = GenericClusterController::with_pipeline(
        ControllerConnection::Direct(manager),
        Pipeline::new(),
    );

    let event = controller.process_event(pass("noop")).await.unwrap();
    assert!(event.messages_selected().is_none());
    assert!(event.data_cache().is_some());
}
