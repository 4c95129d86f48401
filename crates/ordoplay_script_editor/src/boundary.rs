// SPDX-License-Identifier: MIT OR Apache-2.0
//! Boundary resolution for a set of nodes.
//!
//! Partitions every wire touching the set into internal wires, wires crossing
//! in and wires crossing out. Enumeration order is fixed: selection order, then
//! pin index, then the far endpoint's `(node id, port)`. Parameter and argument
//! slots are assigned in this order, so the same selection always produces the
//! same function signature.

use ordoplay_script_graph::{Connection, Document, Graph, NodeId, PinDirection};
use std::collections::HashSet;

/// Wires touching a node set, partitioned by how they cross its boundary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSetConnections {
    /// Both endpoints inside the set
    pub connections: Vec<Connection>,
    /// Target inside, source outside
    pub inputs: Vec<Connection>,
    /// Source inside, target outside
    pub outputs: Vec<Connection>,
    /// Crossing-in wires landing on execution pins
    pub input_executions: usize,
    /// Crossing-in wires landing on data pins
    pub input_data: usize,
    /// Crossing-out wires leaving execution pins
    pub output_executions: usize,
    /// Crossing-out wires leaving data pins
    pub output_data: usize,
}

impl NodeSetConnections {
    /// Partition the wires of `graph` around `nodes`.
    ///
    /// Counters are taken from the inside pin of each crossing wire.
    pub fn resolve(doc: &Document, graph: &Graph, nodes: &[NodeId]) -> Self {
        let members: HashSet<NodeId> = nodes.iter().copied().collect();
        let mut seen = HashSet::with_capacity(nodes.len());
        let mut result = Self::default();

        for &id in nodes {
            if !seen.insert(id) {
                continue;
            }

            let mut incoming: Vec<Connection> = graph
                .connections()
                .filter(|c| c.to_node == id && !members.contains(&c.from_node))
                .copied()
                .collect();
            incoming.sort_by_key(|c| (c.to_port, c.from_node, c.from_port));

            let mut outgoing: Vec<Connection> = graph
                .connections()
                .filter(|c| c.from_node == id)
                .copied()
                .collect();
            outgoing.sort_by_key(|c| (c.from_port, c.to_node, c.to_port));

            result.inputs.extend(incoming);
            for wire in outgoing {
                if members.contains(&wire.to_node) {
                    result.connections.push(wire);
                } else {
                    result.outputs.push(wire);
                }
            }
        }

        for wire in &result.inputs {
            if is_execution(doc, wire.to_node, PinDirection::Input, wire.to_port) {
                result.input_executions += 1;
            } else {
                result.input_data += 1;
            }
        }
        for wire in &result.outputs {
            if is_execution(doc, wire.from_node, PinDirection::Output, wire.from_port) {
                result.output_executions += 1;
            } else {
                result.output_data += 1;
            }
        }

        result
    }

    /// Whether no wire crosses the boundary
    pub fn is_sealed(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }
}

/// Whether the pin is an execution pin; unresolvable pins count as data
pub(crate) fn is_execution(doc: &Document, node: NodeId, direction: PinDirection, port: usize) -> bool {
    doc.pin(node, direction, port).is_ok_and(|p| p.is_execution())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{chain, Fixture};
    use ordoplay_script_graph::EVENT_GRAPH_NAME;

    #[test]
    fn test_single_node_in_chain() {
        let chain = chain();
        let doc = &chain.fixture.doc;
        let graph = doc.graph(EVENT_GRAPH_NAME).unwrap();

        let set = NodeSetConnections::resolve(doc, graph, &[chain.b]);
        assert!(set.connections.is_empty());
        assert_eq!(set.inputs.len(), 2);
        assert_eq!(set.input_executions, 1);
        assert_eq!(set.input_data, 1);
        assert_eq!(set.output_executions, 1);
        assert_eq!(set.output_data, 0);
        // Execution pin 0 enumerates before the data pin
        assert_eq!(set.inputs[0], Connection::new(chain.a, 0, chain.b, 0));
        assert_eq!(set.inputs[1], Connection::new(chain.a, 1, chain.b, 1));
        assert_eq!(set.outputs, vec![Connection::new(chain.b, 0, chain.c, 0)]);
    }

    #[test]
    fn test_internal_wires() {
        let chain = chain();
        let doc = &chain.fixture.doc;
        let graph = doc.graph(EVENT_GRAPH_NAME).unwrap();

        let set = NodeSetConnections::resolve(doc, graph, &[chain.a, chain.b]);
        assert_eq!(set.connections.len(), 2);
        assert!(set.inputs.is_empty());
        assert_eq!(set.outputs.len(), 1);

        let all = NodeSetConnections::resolve(doc, graph, &[chain.a, chain.b, chain.c]);
        assert!(all.is_sealed());
        assert_eq!(all.connections.len(), 3);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let chain = chain();
        let doc = &chain.fixture.doc;
        let graph = doc.graph(EVENT_GRAPH_NAME).unwrap();

        let first = NodeSetConnections::resolve(doc, graph, &[chain.b, chain.c]);
        let second = NodeSetConnections::resolve(doc, graph, &[chain.b, chain.c]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_selection_order_drives_enumeration() {
        let mut fixture = Fixture::new();
        let left = fixture.spawn("int_literal", [0.0, 0.0]);
        let right = fixture.spawn("int_literal", [0.0, 100.0]);
        let x = fixture.spawn("add_int", [200.0, 0.0]);
        let y = fixture.spawn("add_int", [200.0, 100.0]);
        fixture.link(left, 0, x, 0);
        fixture.link(right, 0, y, 0);

        let doc = &fixture.doc;
        let graph = doc.graph(EVENT_GRAPH_NAME).unwrap();
        let forward = NodeSetConnections::resolve(doc, graph, &[x, y]);
        let reverse = NodeSetConnections::resolve(doc, graph, &[y, x]);
        assert_eq!(forward.inputs[0].to_node, x);
        assert_eq!(reverse.inputs[0].to_node, y);
    }

    #[test]
    fn test_duplicate_ids_in_selection_ignored() {
        let chain = chain();
        let doc = &chain.fixture.doc;
        let graph = doc.graph(EVENT_GRAPH_NAME).unwrap();
        let set = NodeSetConnections::resolve(doc, graph, &[chain.b, chain.b]);
        assert_eq!(set.inputs.len(), 2);
    }
}
