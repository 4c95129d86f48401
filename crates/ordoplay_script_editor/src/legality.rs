// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structural rules deciding whether a selection can become one call site.
//!
//! All checks run before anything is mutated.

use crate::boundary::NodeSetConnections;
use crate::error::CollapseError;
use ordoplay_script_graph::{Document, DocumentError, NodeId};

/// Most wires a call node can expose on its output side: one execution, one data
pub const MAX_OUTPUT_WIRES: usize = 2;

/// Check the selection itself: it must be non-empty, resolvable, confined to one
/// graph and duplicable. Returns the owning graph's name.
pub fn check_selection(doc: &Document, selection: &[NodeId]) -> Result<String, CollapseError> {
    let first = *selection.first().ok_or(CollapseError::EmptySelection)?;
    let graph = doc
        .graph_of(first)
        .ok_or(CollapseError::UnknownNode(first))?;

    for &id in selection {
        let node = doc.node(id).ok_or(CollapseError::UnknownNode(id))?;
        if !graph.has_node(id) {
            return Err(CollapseError::MixedGraphs);
        }
        if !node.can_duplicate {
            return Err(CollapseError::NotDuplicable(id));
        }
    }
    Ok(graph.name.clone())
}

/// Check the boundary shape against what a single call node can represent
pub fn check_boundary(connections: &NodeSetConnections) -> Result<(), CollapseError> {
    if connections.input_executions > 1 {
        return Err(CollapseError::MultipleInputExecutions);
    }
    if connections.output_executions > 1 {
        return Err(CollapseError::MultipleOutputExecutions);
    }
    if connections.outputs.len() > MAX_OUTPUT_WIRES {
        return Err(CollapseError::TooManyOutputs(connections.outputs.len()));
    }
    Ok(())
}

/// Run every collapse check and return the source graph with its resolved boundary
pub fn check_collapse(
    doc: &Document,
    selection: &[NodeId],
) -> Result<(String, NodeSetConnections), CollapseError> {
    let graph_name = check_selection(doc, selection)?;
    let graph = doc
        .graph(&graph_name)
        .ok_or_else(|| DocumentError::GraphNotFound(graph_name.clone()))?;
    let connections = NodeSetConnections::resolve(doc, graph, selection);
    check_boundary(&connections)?;
    Ok((graph_name, connections))
}
