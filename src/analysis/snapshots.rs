//! Bounded store of the last analysis per file identity.

use std::collections::{HashMap, VecDeque};

use super::AnalysisResult;

/// Default number of identities kept.
pub const DEFAULT_SNAPSHOT_CAPACITY: usize = 64;

/// The code and result of one earlier analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub code: String,
    pub result: AnalysisResult,
    /// Whether the structure step failed to parse the code.
    pub syntax_error: bool,
}

/// Least-recently-used map from file identity to its latest snapshot.
#[derive(Debug)]
pub struct SnapshotStore {
    capacity: usize,
    entries: HashMap<String, Snapshot>,
    order: VecDeque<String>,
}

impl SnapshotStore {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    /// Look up a snapshot and mark it most recently used.
    pub fn get(&mut self, identity: &str) -> Option<&Snapshot> {
        if !self.entries.contains_key(identity) {
            return None;
        }
        self.touch(identity);
        self.entries.get(identity)
    }

    /// Store a snapshot, replacing any earlier one for the identity.
    ///
    /// Returns the identity evicted to stay within capacity, if any.
    pub fn insert(&mut self, identity: &str, snapshot: Snapshot) -> Option<String> {
        self.entries.insert(identity.to_string(), snapshot);
        self.touch(identity);

        let mut evicted = None;
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                evicted = Some(oldest);
            }
        }
        evicted
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn touch(&mut self, identity: &str) {
        self.order.retain(|k| k != identity);
        self.order.push_back(identity.to_string());
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_CAPACITY)
    }
}
