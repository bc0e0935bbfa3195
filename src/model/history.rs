//! Bounded leader history.

use std::collections::VecDeque;

use crate::constants::LEADER_HISTORY_SIZE;

use super::Record;

/// The most recent leaders of one cluster, oldest first.
///
/// The history never holds more than [`LEADER_HISTORY_SIZE`] entries.
/// Appending to a full history evicts the oldest entry first; entries are
/// never reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaderHistory {
    entries: VecDeque<String>,
}

impl LeaderHistory {
    /// Read the history list for `cluster_name` out of a history record.
    ///
    /// A list that is already longer than the capacity keeps only its most
    /// recent entries.
    pub fn from_record(record: &Record, cluster_name: &str) -> Self {
        let mut history = Self::default();
        for instance in record.list_field(cluster_name).unwrap_or_default() {
            history.push(instance.clone());
        }
        history
    }

    /// Append a leader, evicting the oldest one at capacity.
    pub fn push(&mut self, instance_name: impl Into<String>) {
        while self.entries.len() >= LEADER_HISTORY_SIZE {
            self.entries.pop_front();
        }
        self.entries.push_back(instance_name.into());
    }

    /// Write this history into `record` under `cluster_name`.
    pub fn write_into(&self, record: &mut Record, cluster_name: &str) {
        record.set_list_field(cluster_name, self.entries.iter().cloned().collect());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
