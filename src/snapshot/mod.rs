// Snapshot management for reverse execution

use crate::interpreter::engine::Engine;
use crate::memory::{Address, Word};
use rustc_hash::FxHashSet;
use std::mem::size_of;
use thiserror::Error;

/// Snapshot history errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("snapshot memory limit exceeded: {current} + {requested} > {limit} bytes")]
    LimitExceeded {
        current: usize,
        requested: usize,
        limit: usize,
    },
}

/// Snapshot of execution state
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub engine: Engine,
    /// Every value the engine has emitted up to this point
    pub transcript: Vec<Word>,
}

impl Snapshot {
    pub fn new(engine: Engine, transcript: Vec<Word>) -> Self {
        Snapshot { engine, transcript }
    }

    /// Estimate the memory usage of this snapshot in bytes
    pub fn estimated_size(&self) -> usize {
        let words = self.engine.memory().len()
            + self.engine.input().len()
            + self.engine.output().len()
            + self.transcript.len();

        // Fixed overhead for registers and bookkeeping
        words * size_of::<Word>() + size_of::<Snapshot>()
    }

    /// Addresses whose value differs between `previous` and this snapshot
    ///
    /// Cells that only exist in this snapshot count as changed when non-zero.
    pub fn changed_cells(&self, previous: &Snapshot) -> FxHashSet<Address> {
        let before = previous.engine.memory().cells();
        let after = self.engine.memory().cells();

        after
            .iter()
            .enumerate()
            .filter(|&(address, &value)| before.get(address).copied().unwrap_or(0) != value)
            .map(|(address, _)| address)
            .collect()
    }
}

/// Manages execution history for reverse execution
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: Vec<Snapshot>,
    max_memory: usize,
    current_memory: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: Vec::new(),
            max_memory,
            current_memory: 0,
        }
    }

    /// Add a snapshot to history
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), SnapshotError> {
        let snapshot_size = snapshot.estimated_size();

        if self.current_memory + snapshot_size > self.max_memory {
            return Err(SnapshotError::LimitExceeded {
                current: self.current_memory,
                requested: snapshot_size,
                limit: self.max_memory,
            });
        }

        self.current_memory += snapshot_size;
        self.snapshots.push(snapshot);
        Ok(())
    }

    /// Get a snapshot by index
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    /// Get the number of snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Get current memory usage
    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    /// Get max memory limit
    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}
