// SPDX-License-Identifier: MIT OR Apache-2.0
//! Change notifications emitted by the document.
//!
//! Every mutation marks the document edited and reports what changed to the
//! registered listeners, so views can refresh and track unsaved changes.

use crate::node::NodeId;
use std::fmt;
use std::sync::Arc;

/// Something in the document changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// A node was created in a graph
    NodeAdded {
        /// Owning graph
        graph: String,
        /// New node
        node: NodeId,
    },
    /// A node was removed
    NodeRemoved(NodeId),
    /// A node's position, pins or graph membership changed
    NodeChanged(NodeId),
    /// Wires in a graph changed
    ConnectionsChanged(String),
    /// A graph was created
    GraphAdded(String),
    /// A graph was removed
    GraphRemoved(String),
    /// A function's signature or markers changed
    FunctionChanged(String),
    /// The whole document was replaced
    Reloaded,
}

/// Receives document change notifications
pub trait ChangeListener: Send + Sync {
    /// Called after the change has been applied
    fn on_event(&self, event: &DocumentEvent);
}

/// Registered listeners
#[derive(Clone, Default)]
pub(crate) struct Listeners(Vec<Arc<dyn ChangeListener>>);

impl Listeners {
    pub fn push(&mut self, listener: Arc<dyn ChangeListener>) {
        self.0.push(listener);
    }

    pub fn emit(&self, event: &DocumentEvent) {
        for listener in &self.0 {
            listener.on_event(event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listeners({})", self.0.len())
    }
}
