// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph membership and wire storage.
//!
//! A graph does not own node storage. Nodes live in the document arena and a graph
//! only records which ids belong to it, so moving a node between graphs never
//! changes its identity.

use crate::connection::Connection;
use crate::node::NodeId;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name of the event graph every document starts with
pub const EVENT_GRAPH_NAME: &str = "EventGraph";

/// Graph flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphKind {
    /// Holds event handlers
    Event,
    /// Backs a single function
    Function,
    /// User-created plain graph
    Plain,
}

/// A named graph of nodes and the wires among them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Graph flavour
    pub kind: GraphKind,
    nodes: IndexSet<NodeId>,
    connections: IndexSet<Connection>,
}

impl Graph {
    pub(crate) fn new(name: impl Into<String>, kind: GraphKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nodes: IndexSet::new(),
            connections: IndexSet::new(),
        }
    }

    /// Whether this is a function graph
    pub fn is_function(&self) -> bool {
        self.kind == GraphKind::Function
    }

    /// Whether the node belongs to this graph
    pub fn has_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains(&node_id)
    }

    /// Member node ids, in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the wire is stored in this graph
    pub fn has_connection(&self, connection: &Connection) -> bool {
        self.connections.contains(connection)
    }

    /// All wires, in insertion order
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    /// Wires leaving an output port
    pub fn connections_from(&self, node_id: NodeId, port: usize) -> impl Iterator<Item = &Connection> {
        self.connections
            .iter()
            .filter(move |c| c.from_node == node_id && c.from_port == port)
    }

    /// Wires arriving at an input port
    pub fn connections_to(&self, node_id: NodeId, port: usize) -> impl Iterator<Item = &Connection> {
        self.connections
            .iter()
            .filter(move |c| c.to_node == node_id && c.to_port == port)
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub(crate) fn insert_node(&mut self, node_id: NodeId) {
        self.nodes.insert(node_id);
    }

    /// Drop the node and every wire touching it, returning the dropped wires
    pub(crate) fn take_node(&mut self, node_id: NodeId) -> Vec<Connection> {
        self.nodes.shift_remove(&node_id);
        let (dropped, kept): (Vec<Connection>, Vec<Connection>) = self
            .connections
            .iter()
            .copied()
            .partition(|c| c.involves_node(node_id));
        self.connections = kept.into_iter().collect();
        dropped
    }

    pub(crate) fn insert_connection(&mut self, connection: Connection) -> bool {
        self.connections.insert(connection)
    }

    pub(crate) fn remove_connection(&mut self, connection: &Connection) -> bool {
        self.connections.shift_remove(connection)
    }

    pub(crate) fn retain_connections(&mut self, keep: impl FnMut(&Connection) -> bool) {
        self.connections.retain(keep);
    }

    /// Nodes in dependency order over the wires accepted by `follow`.
    pub fn topological_order(
        &self,
        follow: impl Fn(&Connection) -> bool,
    ) -> Result<Vec<NodeId>, CycleError> {
        let mut visited = HashSet::new();
        let mut temp_mark = HashSet::new();
        let mut order = Vec::new();

        for node_id in &self.nodes {
            if !visited.contains(node_id) {
                self.visit(*node_id, &follow, &mut visited, &mut temp_mark, &mut order)?;
            }
        }

        Ok(order)
    }

    fn visit(
        &self,
        node_id: NodeId,
        follow: &impl Fn(&Connection) -> bool,
        visited: &mut HashSet<NodeId>,
        temp_mark: &mut HashSet<NodeId>,
        order: &mut Vec<NodeId>,
    ) -> Result<(), CycleError> {
        if temp_mark.contains(&node_id) {
            return Err(CycleError(node_id));
        }
        if visited.contains(&node_id) {
            return Ok(());
        }

        temp_mark.insert(node_id);

        // Visit everything this node depends on first
        for connection in self.connections.iter().filter(|c| c.to_node == node_id) {
            if follow(connection) {
                self.visit(connection.from_node, follow, visited, temp_mark, order)?;
            }
        }

        temp_mark.remove(&node_id);
        visited.insert(node_id);
        order.push(node_id);

        Ok(())
    }
}

/// Error when graph contains a cycle
#[derive(Debug, thiserror::Error)]
#[error("Graph contains a cycle through node {0}")]
pub struct CycleError(pub NodeId);
