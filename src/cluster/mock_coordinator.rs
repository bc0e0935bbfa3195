//! In-memory mock coordinator for testing.
//!
//! This provides in-memory implementations of the coordination traits so the
//! election and pipeline can be exercised without a coordination service.
//! Several [`MockClusterManager`]s may share one [`InMemoryDataAccessor`] to
//! simulate contenders racing against the same store.
//!
//! # Usage
//!
//! This module is available when the `test-utilities` feature is enabled,
//! or during unit tests:
//!
//! ```toml
//! [dev-dependencies]
//! helmsman = { path = ".", features = ["test-utilities"] }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::{ClusterError, ClusterResult};
use super::traits::{ClusterDataAccessor, ClusterManager, ClusterManagerFactory};
use crate::model::Record;
use crate::types::{InstanceType, PropertyType};

/// Type alias for keyed child records
/// Key: property path
/// Value: child key -> record
pub type ChildRecordsMap = HashMap<PropertyType, BTreeMap<String, Record>>;

/// Shared in-memory coordination store.
#[derive(Debug, Default)]
pub struct InMemoryDataAccessor {
    /// Single-valued records (leader, history)
    records: RwLock<HashMap<PropertyType, Record>>,
    /// Keyed children (state model definitions, ...)
    children: RwLock<ChildRecordsMap>,
    /// Number of upcoming reads that fail with a store error
    fail_next_reads: AtomicUsize,
    /// When set, every write fails with a store error
    fail_writes: AtomicBool,
    /// When set, conditional creates report a lost race without writing
    reject_creates: AtomicBool,
    /// Properties whose reads and writes always fail
    failing_properties: Mutex<HashSet<PropertyType>>,
    /// Number of conditional creates attempted
    create_attempts: AtomicUsize,
    /// Number of reads attempted
    read_attempts: AtomicUsize,
}

impl InMemoryDataAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` reads fail (transient store failure).
    pub fn fail_next_reads(&self, count: usize) {
        self.fail_next_reads.store(count, Ordering::SeqCst);
    }

    /// Make all writes fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make conditional creates return `false` without writing anything.
    ///
    /// Simulates a store that reports a lost race while the path stays vacant.
    pub fn set_reject_creates(&self, reject: bool) {
        self.reject_creates.store(reject, Ordering::SeqCst);
    }

    /// Make every read and write of one property fail until reset.
    pub fn set_property_failing(&self, property: PropertyType, failing: bool) {
        if let Ok(mut set) = self.failing_properties.lock() {
            if failing {
                set.insert(property);
            } else {
                set.remove(&property);
            }
        }
    }

    fn is_failing(&self, property: PropertyType) -> bool {
        self.failing_properties
            .lock()
            .map(|set| set.contains(&property))
            .unwrap_or(false)
    }

    pub fn create_attempts(&self) -> usize {
        self.create_attempts.load(Ordering::SeqCst)
    }

    pub fn read_attempts(&self) -> usize {
        self.read_attempts.load(Ordering::SeqCst)
    }

    /// Delete a single-valued record (for simulating session expiry of the leader).
    pub async fn remove_property(&self, property: PropertyType) -> Option<Record> {
        self.records.write().await.remove(&property)
    }

    /// The instance named by the leader record, if any.
    pub async fn current_leader(&self) -> Option<String> {
        self.records
            .read()
            .await
            .get(&PropertyType::Leader)
            .and_then(|r| r.simple_field(crate::constants::LEADER_FIELD))
            .map(str::to_string)
    }

    fn check_read(&self, property: PropertyType) -> ClusterResult<()> {
        self.read_attempts.fetch_add(1, Ordering::SeqCst);
        let injected = self
            .fail_next_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected || self.is_failing(property) {
            return Err(ClusterError::store(property, "injected read failure"));
        }
        Ok(())
    }

    fn check_write(&self, property: PropertyType) -> ClusterResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) || self.is_failing(property) {
            return Err(ClusterError::store(property, "injected write failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ClusterDataAccessor for InMemoryDataAccessor {
    async fn get_property(&self, property: PropertyType) -> ClusterResult<Option<Record>> {
        self.check_read(property)?;
        Ok(self.records.read().await.get(&property).cloned())
    }

    async fn create_property(
        &self,
        property: PropertyType,
        record: Record,
    ) -> ClusterResult<bool> {
        self.create_attempts.fetch_add(1, Ordering::SeqCst);
        self.check_write(property)?;
        if self.reject_creates.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let mut records = self.records.write().await;
        if records.contains_key(&property) {
            return Ok(false);
        }
        records.insert(property, record);
        Ok(true)
    }

    async fn set_property(&self, property: PropertyType, record: Record) -> ClusterResult<bool> {
        self.check_write(property)?;
        self.records.write().await.insert(property, record);
        Ok(true)
    }

    async fn get_child_properties(&self, property: PropertyType) -> ClusterResult<Vec<Record>> {
        self.check_read(property)?;
        Ok(self
            .children
            .read()
            .await
            .get(&property)
            .map(|children| children.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn set_child_property(
        &self,
        property: PropertyType,
        key: &str,
        record: Record,
    ) -> ClusterResult<bool> {
        self.check_write(property)?;
        self.children
            .write()
            .await
            .entry(property)
            .or_default()
            .insert(key.to_string(), record);
        Ok(true)
    }
}

/// In-memory cluster manager handle.
#[derive(Debug)]
pub struct MockClusterManager {
    pub instance_name: String,
    pub cluster_name: String,
    pub instance_type: InstanceType,
    pub accessor: Arc<InMemoryDataAccessor>,
    connected: AtomicBool,
    fail_connect: AtomicBool,
    connect_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
}

impl MockClusterManager {
    pub fn new(
        cluster_name: &str,
        instance_name: &str,
        instance_type: InstanceType,
        accessor: Arc<InMemoryDataAccessor>,
    ) -> Self {
        Self {
            instance_name: instance_name.to_string(),
            cluster_name: cluster_name.to_string(),
            instance_type,
            accessor,
            connected: AtomicBool::new(false),
            fail_connect: AtomicBool::new(false),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
        }
    }

    /// Make subsequent `connect()` calls fail.
    pub fn set_fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClusterManager for MockClusterManager {
    fn instance_name(&self) -> &str {
        &self.instance_name
    }

    fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    fn instance_type(&self) -> InstanceType {
        self.instance_type
    }

    fn data_accessor(&self) -> Arc<dyn ClusterDataAccessor> {
        self.accessor.clone()
    }

    async fn connect(&self) -> ClusterResult<()> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(ClusterError::NotConnected {
                cluster: self.cluster_name.clone(),
                instance: self.instance_name.clone(),
            });
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> ClusterResult<()> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Factory handing out controller-only [`MockClusterManager`]s bound to a
/// shared store.
#[derive(Debug, Default)]
pub struct MockManagerFactory {
    pub accessor: Arc<InMemoryDataAccessor>,
    /// Every handle created so far, in creation order
    created: RwLock<Vec<Arc<MockClusterManager>>>,
    /// When set, new handles refuse to connect
    fail_connect: AtomicBool,
}

impl MockManagerFactory {
    pub fn new(accessor: Arc<InMemoryDataAccessor>) -> Self {
        Self {
            accessor,
            created: RwLock::new(Vec::new()),
            fail_connect: AtomicBool::new(false),
        }
    }

    /// Make handles created from now on fail to connect.
    pub fn set_fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub async fn created_managers(&self) -> Vec<Arc<MockClusterManager>> {
        self.created.read().await.clone()
    }
}

#[async_trait]
impl ClusterManagerFactory for MockManagerFactory {
    async fn controller_manager(
        &self,
        cluster_name: &str,
        instance_name: &str,
    ) -> ClusterResult<Arc<dyn ClusterManager>> {
        let manager = Arc::new(MockClusterManager::new(
            cluster_name,
            instance_name,
            InstanceType::Controller,
            self.accessor.clone(),
        ));
        manager.set_fail_connect(self.fail_connect.load(Ordering::SeqCst));
        self.created.write().await.push(manager.clone());
        Ok(manager)
    }
}
