// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history over whole-document snapshots.
//!
//! Each refactoring is recorded as one group holding the document before and
//! after, so undo restores exactly what the user saw.

use ordoplay_script_graph::Document;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,

    /// Snapshot could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Unique operation ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationID(u64);

impl OperationID {
    /// Get the raw ID value
    pub fn value(&self) -> u64 {
        self.0
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Encoded document state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// bincode-encoded document
    pub data: Vec<u8>,
    /// Timestamp when snapshot was taken
    pub timestamp: u64,
}

impl StateSnapshot {
    /// Capture `doc`
    pub fn capture(doc: &Document) -> Result<Self> {
        Ok(Self {
            data: bincode::serialize(doc)?,
            timestamp: now_secs(),
        })
    }

    /// Decode the captured document
    pub fn to_document(&self) -> Result<Document> {
        Ok(bincode::deserialize(&self.data)?)
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A single undoable change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Human-readable description
    pub description: String,
    /// State before the change
    pub before: StateSnapshot,
    /// State after the change
    pub after: StateSnapshot,
}

impl Operation {
    /// Memory held by both snapshots
    pub fn memory_size(&self) -> usize {
        self.before.size() + self.after.size()
    }
}

/// Operations undone and redone together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationGroup {
    /// Group ID
    pub id: OperationID,
    /// Human-readable description
    pub description: String,
    /// Operations in application order
    pub operations: Vec<Operation>,
    /// Timestamp
    pub timestamp: u64,
}

impl OperationGroup {
    /// Add an operation to this group
    pub fn add_operation(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Total memory size of this group
    pub fn memory_size(&self) -> usize {
        self.operations.iter().map(Operation::memory_size).sum()
    }

    /// Document state to restore when undoing the group
    pub fn before(&self) -> Option<&StateSnapshot> {
        self.operations.first().map(|op| &op.before)
    }

    /// Document state to restore when redoing the group
    pub fn after(&self) -> Option<&StateSnapshot> {
        self.operations.last().map(|op| &op.after)
    }
}

/// Undo/redo history manager
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<OperationGroup>,
    redo_stack: VecDeque<OperationGroup>,
    next_id: u64,
    max_depth: usize,
    memory_used: usize,
}

impl History {
    /// Create with a maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            next_id: 1,
            max_depth,
            memory_used: 0,
        }
    }

    /// Begin a new, empty group
    pub fn begin_group(&mut self, description: &str) -> OperationGroup {
        let id = OperationID(self.next_id);
        self.next_id += 1;
        OperationGroup {
            id,
            description: description.to_string(),
            operations: Vec::new(),
            timestamp: now_secs(),
        }
    }

    /// Record a single before/after change as its own group
    pub fn record(&mut self, description: &str, before: StateSnapshot, after: &Document) -> Result<()> {
        let mut group = self.begin_group(description);
        group.add_operation(Operation {
            description: description.to_string(),
            before,
            after: StateSnapshot::capture(after)?,
        });
        self.commit(group);
        Ok(())
    }

    /// Commit a group; empty groups are dropped
    pub fn commit(&mut self, group: OperationGroup) {
        if group.operations.is_empty() {
            return;
        }

        self.redo_stack.clear();
        self.memory_used += group.memory_size();
        self.undo_stack.push_back(group);

        while self.undo_stack.len() > self.max_depth {
            if let Some(old_group) = self.undo_stack.pop_front() {
                self.memory_used = self.memory_used.saturating_sub(old_group.memory_size());
            }
        }
    }

    /// Undo the last group, restoring `doc` to its before state
    pub fn undo(&mut self, doc: &mut Document) -> Result<String> {
        let group = self.undo_stack.back().ok_or(HistoryError::NothingToUndo)?;
        let snapshot = group.before().ok_or(HistoryError::NothingToUndo)?.to_document()?;
        doc.restore(snapshot);

        if let Some(group) = self.undo_stack.pop_back() {
            self.memory_used = self.memory_used.saturating_sub(group.memory_size());
            let description = group.description.clone();
            self.redo_stack.push_back(group);
            return Ok(description);
        }
        Err(HistoryError::NothingToUndo)
    }

    /// Redo the last undone group, restoring `doc` to its after state
    pub fn redo(&mut self, doc: &mut Document) -> Result<String> {
        let group = self.redo_stack.back().ok_or(HistoryError::NothingToRedo)?;
        let snapshot = group.after().ok_or(HistoryError::NothingToRedo)?.to_document()?;
        doc.restore(snapshot);

        if let Some(group) = self.redo_stack.pop_back() {
            self.memory_used += group.memory_size();
            let description = group.description.clone();
            self.undo_stack.push_back(group);
            return Ok(description);
        }
        Err(HistoryError::NothingToRedo)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get undo stack depth
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Memory held by the undo stack
    pub fn memory_used(&self) -> usize {
        self.memory_used
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.memory_used = 0;
    }

    /// Get description of next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|g| g.description.as_str())
    }

    /// Get description of next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|g| g.description.as_str())
    }
}
