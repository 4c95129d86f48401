// SPDX-License-Identifier: MIT OR Apache-2.0
//! Boundary rewiring for the collapse path.
//!
//! Once the selected nodes live in the new function graph, every wire that
//! crossed the selection boundary is re-established twice: on the caller side
//! against the call node, and on the callee side against the entry and result
//! markers. "First wins" applies to execution wires on both sides and to the
//! return value, in the resolver's enumeration order.

use crate::boundary::{is_execution, NodeSetConnections};
use crate::names::create_unique_name;
use crate::settings::EditorSettings;
use egui::vec2;
use ordoplay_script_graph::layout::offset_position;
use ordoplay_script_graph::{
    Argument, Connection, Document, DocumentError, NodeId, PinDirection,
};

/// Where the collapsed selection is being rewired
#[derive(Debug, Clone, Copy)]
pub struct CollapseSite<'a> {
    /// Graph the selection was taken from and the call node lives in
    pub source_graph: &'a str,
    /// The new function
    pub function: &'a str,
    /// The call node replacing the selection
    pub call_node: NodeId,
}

/// Output port of a node inside the function that feeds the return value
pub type ReturnSource = (NodeId, usize);

struct Markers {
    graph: String,
    entry: NodeId,
    result: Option<NodeId>,
}

fn markers(doc: &Document, function: &str) -> Result<Markers, DocumentError> {
    let function = doc
        .function(function)
        .ok_or_else(|| DocumentError::FunctionNotFound(function.to_string()))?;
    Ok(Markers {
        graph: function.graph_name.clone(),
        entry: function.owning_node_id,
        result: function.result_node_id,
    })
}

/// Unlink every crossing wire in the source graph
pub fn sever_boundary(doc: &mut Document, source_graph: &str, connections: &NodeSetConnections) {
    for wire in connections.inputs.iter().chain(&connections.outputs) {
        doc.unlink(
            source_graph,
            wire.from_node,
            wire.from_port,
            wire.to_node,
            wire.to_port,
        );
    }
}

/// Re-establish every crossing wire around the call node and the markers
pub fn rewire_collapse(
    doc: &mut Document,
    site: &CollapseSite<'_>,
    connections: &NodeSetConnections,
    settings: &EditorSettings,
) -> Result<(), DocumentError> {
    wire_inputs(doc, site, &connections.inputs, settings)?;
    let return_source = wire_result(doc, site, &connections.outputs, settings)?;
    wire_call_outputs(doc, site, &connections.outputs, return_source)?;
    doc.emit_changed(site.call_node);
    Ok(())
}

/// Crossing-in wires become call arguments on the outside and entry outputs on
/// the inside. Each data wire appends one parameter named after its target pin.
pub fn wire_inputs(
    doc: &mut Document,
    site: &CollapseSite<'_>,
    inputs: &[Connection],
    settings: &EditorSettings,
) -> Result<(), DocumentError> {
    let markers = markers(doc, site.function)?;

    let mut call_input_index = 1;
    let mut entry_output_index = 1;
    let mut call_execution_wired = false;
    let mut entry_execution_wired = false;
    let mut entry_positioned = false;

    for wire in inputs {
        let target_pin = doc
            .pin(wire.to_node, PinDirection::Input, wire.to_port)?
            .clone();

        if !entry_positioned {
            let target = doc
                .node(wire.to_node)
                .ok_or(DocumentError::NodeNotFound(wire.to_node))?
                .pos();
            let position = offset_position(target, vec2(-settings.marker_offset, 0.0));
            doc.set_node_position(markers.entry, position)?;
            entry_positioned = true;
        }

        if !target_pin.is_execution() {
            let name = {
                let existing = doc
                    .function(site.function)
                    .map(|f| f.arguments.iter().map(|a| a.name.clone()).collect::<Vec<_>>())
                    .unwrap_or_default();
                create_unique_name(&target_pin.name, existing.iter().map(String::as_str))
            };
            doc.add_function_argument(site.function, Argument::new(name, target_pin.pin_type))?;
            doc.link(
                &markers.graph,
                markers.entry,
                entry_output_index,
                wire.to_node,
                wire.to_port,
            )?;
            entry_output_index += 1;
        } else if !entry_execution_wired {
            doc.link(&markers.graph, markers.entry, 0, wire.to_node, wire.to_port)?;
            entry_execution_wired = true;
        }

        // The argument pin exists now that the parameter has been appended
        let source_is_execution = is_execution(doc, wire.from_node, PinDirection::Output, wire.from_port);
        if source_is_execution && !call_execution_wired {
            doc.link(site.source_graph, wire.from_node, wire.from_port, site.call_node, 0)?;
            call_execution_wired = true;
        } else if !source_is_execution {
            doc.link(
                site.source_graph,
                wire.from_node,
                wire.from_port,
                site.call_node,
                call_input_index,
            )?;
            call_input_index += 1;
        }
    }

    Ok(())
}

/// Crossing-out wires feed the result marker: the first execution source drives
/// its execution input, the first data source becomes the return value.
///
/// Falls back to wiring entry straight into result when the body leaves the
/// result's execution input dangling. Returns the pin feeding the return value.
pub fn wire_result(
    doc: &mut Document,
    site: &CollapseSite<'_>,
    outputs: &[Connection],
    settings: &EditorSettings,
) -> Result<Option<ReturnSource>, DocumentError> {
    let markers = markers(doc, site.function)?;
    let Some(result) = markers.result else {
        return Ok(None);
    };

    let mut execution_wired = false;
    let mut return_source = None;
    let mut positioned = false;

    for wire in outputs {
        let source_pin = doc
            .pin(wire.from_node, PinDirection::Output, wire.from_port)?
            .clone();

        if !positioned {
            let source = doc
                .node(wire.from_node)
                .ok_or(DocumentError::NodeNotFound(wire.from_node))?
                .pos();
            doc.set_node_position(result, offset_position(source, vec2(settings.marker_offset, 0.0)))?;
            positioned = true;
        }

        if source_pin.is_execution() && !execution_wired {
            doc.link(&markers.graph, wire.from_node, wire.from_port, result, 0)?;
            execution_wired = true;
        } else if !source_pin.is_execution() && return_source.is_none() {
            doc.set_function_return_type(site.function, Some(source_pin.pin_type))?;
            doc.link(&markers.graph, wire.from_node, wire.from_port, result, 1)?;
            return_source = Some((wire.from_node, wire.from_port));
        }
    }

    let result_open = !doc.has_any_connections(result, PinDirection::Input, 0);
    let entry_open = !doc.has_any_connections(markers.entry, PinDirection::Output, 0);
    if result_open && entry_open {
        doc.link(&markers.graph, markers.entry, 0, result, 0)?;
        let entry_outputs = doc.node(markers.entry).map_or(0, |n| n.outputs.len());
        if entry_outputs == 1 {
            let result_pos = doc
                .node(result)
                .ok_or(DocumentError::NodeNotFound(result))?
                .pos();
            doc.set_node_position(
                markers.entry,
                offset_position(result_pos, vec2(-settings.marker_offset, 0.0)),
            )?;
        }
    }

    Ok(return_source)
}

/// Crossing-out wires leave the call node: the first execution target takes its
/// execution output, data targets fed by the return source take the return value.
///
/// A data wire from any other source has no call output to attach to and is
/// left unwired.
pub fn wire_call_outputs(
    doc: &mut Document,
    site: &CollapseSite<'_>,
    outputs: &[Connection],
    return_source: Option<ReturnSource>,
) -> Result<(), DocumentError> {
    let mut call_execution_wired = false;

    for wire in outputs {
        let target_is_execution = is_execution(doc, wire.to_node, PinDirection::Input, wire.to_port);
        if target_is_execution && !call_execution_wired {
            doc.link(site.source_graph, site.call_node, 0, wire.to_node, wire.to_port)?;
            call_execution_wired = true;
        } else if !target_is_execution {
            if return_source == Some((wire.from_node, wire.from_port)) {
                doc.link(site.source_graph, site.call_node, 1, wire.to_node, wire.to_port)?;
            } else {
                tracing::warn!(
                    "Data wire from node {} port {} into node {} has no call output; left unwired",
                    wire.from_node,
                    wire.from_port,
                    wire.to_node
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::chain;
    use ordoplay_script_graph::EVENT_GRAPH_NAME;

    #[test]
    fn test_sever_boundary_leaves_internal_wires() {
        let mut chain = chain();
        let doc = &mut chain.fixture.doc;
        let set = {
            let graph = doc.graph(EVENT_GRAPH_NAME).unwrap();
            NodeSetConnections::resolve(doc, graph, &[chain.a, chain.b])
        };

        sever_boundary(doc, EVENT_GRAPH_NAME, &set);

        let graph = doc.graph(EVENT_GRAPH_NAME).unwrap();
        assert_eq!(graph.connection_count(), 2);
        assert!(!doc.has_any_connections(chain.c, PinDirection::Input, 0));
    }
}
