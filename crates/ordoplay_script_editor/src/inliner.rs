// SPDX-License-Identifier: MIT OR Apache-2.0
//! Inline a call node: replace it with a copy of its function's body.
//!
//! Call ports mirror the marker ports one to one. Call input `p` carries what
//! entry output `p` hands out, and call output `q` carries what result input
//! `q` receives. Replaying the call node's external wires walks that mapping.

use crate::boundary::NodeSetConnections;
use crate::error::ExpandError;
use crate::settings::EditorSettings;
use indexmap::IndexMap;
use ordoplay_script_graph::layout::node_set_rect;
use ordoplay_script_graph::{Connection, Document, NodeId, NodeKind};

/// What a successful expand produced
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandOutcome {
    /// The inlined function
    pub function: String,
    /// Body node in the function graph to its copy in the caller graph
    pub node_map: IndexMap<NodeId, NodeId>,
    /// The call node that was removed
    pub removed_call: NodeId,
}

struct CallSite {
    graph: String,
    incoming: Vec<Connection>,
    outgoing: Vec<Connection>,
}

struct BodyWiring {
    entry: NodeId,
    result: Option<NodeId>,
    from_entry: Vec<Connection>,
    into_result: Vec<Connection>,
}

/// Replace `call_node` with a duplicate of its function body centered on it
pub fn expand_call(
    doc: &mut Document,
    call_node: NodeId,
    settings: &EditorSettings,
) -> Result<ExpandOutcome, ExpandError> {
    let node = doc.node(call_node).ok_or(ExpandError::UnknownNode(call_node))?;
    let NodeKind::CallFunction { function } = &node.kind else {
        return Err(ExpandError::NotACallNode(call_node));
    };
    let call_pos = node.pos();
    let function = doc
        .function(function)
        .cloned()
        .ok_or_else(|| ExpandError::FunctionNotFound(function.clone()))?;

    let caller = doc.graph_of(call_node).ok_or(ExpandError::UnknownNode(call_node))?;
    let site = CallSite {
        graph: caller.name.clone(),
        incoming: caller.connections().filter(|c| c.to_node == call_node).copied().collect(),
        outgoing: caller.connections().filter(|c| c.from_node == call_node).copied().collect(),
    };

    let body_graph = doc
        .graph(&function.graph_name)
        .ok_or_else(|| ExpandError::FunctionNotFound(function.name.clone()))?;
    let body: Vec<NodeId> = doc
        .nodes_in(body_graph)
        .filter(|n| !n.kind.is_marker() && n.can_duplicate)
        .map(|n| n.id)
        .collect();
    let area = node_set_rect(doc, &body).ok_or_else(|| ExpandError::NothingToInline(function.name.clone()))?;
    let internal = NodeSetConnections::resolve(doc, body_graph, &body).connections;
    let wiring = BodyWiring {
        entry: function.owning_node_id,
        result: function.result_node_id,
        from_entry: body_graph
            .connections()
            .filter(|c| c.from_node == function.owning_node_id)
            .copied()
            .collect(),
        into_result: body_graph
            .connections()
            .filter(|c| Some(c.to_node) == function.result_node_id)
            .copied()
            .collect(),
    };

    let delta = call_pos - area.center();
    let mut node_map = IndexMap::with_capacity(body.len());
    for &id in &body {
        let copy = doc.duplicate_node(&site.graph, id, [delta.x, delta.y], true)?;
        node_map.insert(id, copy);
    }

    for wire in &internal {
        if let (Some(&from), Some(&to)) = (node_map.get(&wire.from_node), node_map.get(&wire.to_node)) {
            doc.link(&site.graph, from, wire.from_port, to, wire.to_port)?;
        }
    }

    doc.remove_node(call_node);

    if settings.replay_external_wiring {
        replay_external_wiring(doc, &site, &wiring, &node_map)?;
    } else if !site.incoming.is_empty() || !site.outgoing.is_empty() {
        tracing::warn!(
            "Dropped {} external wires of call node {call_node}",
            site.incoming.len() + site.outgoing.len()
        );
    }

    tracing::info!(
        "Inlined function '{}' ({} nodes) in place of node {call_node}",
        function.name,
        node_map.len()
    );
    Ok(ExpandOutcome {
        function: function.name,
        node_map,
        removed_call: call_node,
    })
}

/// Reconnect what was wired to the call node onto the duplicated body
fn replay_external_wiring(
    doc: &mut Document,
    site: &CallSite,
    wiring: &BodyWiring,
    node_map: &IndexMap<NodeId, NodeId>,
) -> Result<(), ExpandError> {
    for input in &site.incoming {
        for inner in wiring.from_entry.iter().filter(|c| c.from_port == input.to_port) {
            if Some(inner.to_node) == wiring.result {
                // Entry wired straight to result: the outside source reaches the outside targets
                for output in site.outgoing.iter().filter(|c| c.from_port == inner.to_port) {
                    doc.link(&site.graph, input.from_node, input.from_port, output.to_node, output.to_port)?;
                }
            } else if let Some(&copy) = node_map.get(&inner.to_node) {
                doc.link(&site.graph, input.from_node, input.from_port, copy, inner.to_port)?;
            }
        }
    }

    for output in &site.outgoing {
        for inner in wiring.into_result.iter().filter(|c| c.to_port == output.from_port) {
            if inner.from_node == wiring.entry {
                continue;
            }
            if let Some(&copy) = node_map.get(&inner.from_node) {
                doc.link(&site.graph, copy, inner.from_port, output.to_node, output.to_port)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collapse::collapse_to_function;
    use crate::test_support::{chain, Fixture};
    use ordoplay_script_graph::{
        GraphKind, MethodInfo, NodeInitContext, NodeTemplate, PinDirection, EVENT_GRAPH_NAME,
    };

    fn wired(doc: &Document, from: NodeId, fp: usize, to: NodeId, tp: usize) -> bool {
        doc.graph(EVENT_GRAPH_NAME)
            .unwrap()
            .has_connection(&Connection::new(from, fp, to, tp))
    }

    #[test]
    fn test_round_trip_restores_structure() {
        let mut chain = chain();
        let settings = EditorSettings::default();
        let doc = &mut chain.fixture.doc;
        let outcome = collapse_to_function(doc, &[chain.a, chain.b], &settings).unwrap();

        let expanded = expand_call(doc, outcome.call_node, &settings).unwrap();

        assert!(doc.node(outcome.call_node).is_none());
        assert_eq!(expanded.node_map.len(), 2);
        let a = expanded.node_map[&chain.a];
        let b = expanded.node_map[&chain.b];
        let graph = doc.graph(EVENT_GRAPH_NAME).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert!(wired(doc, a, 0, b, 0));
        assert!(wired(doc, a, 1, b, 1));
        assert!(wired(doc, b, 0, chain.c, 0));
        assert_eq!(graph.connection_count(), 3);
        // The body is centered on where the call node stood
        assert_eq!(doc.node(a).unwrap().position, [0.0, 0.0]);
        assert_eq!(doc.node(b).unwrap().position, [300.0, 0.0]);
        // The function itself stays available
        assert!(doc.has_function(&outcome.function));
    }

    #[test]
    fn test_replay_through_parameters() {
        let mut chain = chain();
        let settings = EditorSettings::default();
        let doc = &mut chain.fixture.doc;
        let outcome = collapse_to_function(doc, &[chain.b], &settings).unwrap();

        let expanded = expand_call(doc, outcome.call_node, &settings).unwrap();

        let b = expanded.node_map[&chain.b];
        assert!(wired(doc, chain.a, 0, b, 0));
        assert!(wired(doc, chain.a, 1, b, 1));
        assert!(wired(doc, b, 0, chain.c, 0));
    }

    #[test]
    fn test_replay_passthrough_and_return_value() {
        let mut fixture = Fixture::new();
        let source = fixture.spawn("int_literal", [0.0, 0.0]);
        let first = fixture.spawn("to_string", [300.0, 0.0]);
        let second = fixture.spawn("to_string", [300.0, 100.0]);
        fixture.link(source, 0, first, 0);
        fixture.link(source, 0, second, 0);
        let settings = EditorSettings::default();
        let outcome = collapse_to_function(&mut fixture.doc, &[source], &settings).unwrap();

        let expanded = expand_call(&mut fixture.doc, outcome.call_node, &settings).unwrap();

        let copy = expanded.node_map[&source];
        assert!(wired(&fixture.doc, copy, 0, first, 0));
        assert!(wired(&fixture.doc, copy, 0, second, 0));
    }

    #[test]
    fn test_without_replay_external_wires_are_lost() {
        let mut chain = chain();
        let settings = EditorSettings {
            replay_external_wiring: false,
            ..EditorSettings::default()
        };
        let doc = &mut chain.fixture.doc;
        let outcome = collapse_to_function(doc, &[chain.b], &settings).unwrap();

        let expanded = expand_call(doc, outcome.call_node, &settings).unwrap();

        let b = expanded.node_map[&chain.b];
        assert_eq!(doc.graph(EVENT_GRAPH_NAME).unwrap().connection_count(), 0);
        assert!(!doc.has_any_connections(b, PinDirection::Input, 0));
    }

    #[test]
    fn test_preconditions() {
        let mut fixture = Fixture::new();
        let settings = EditorSettings::default();
        let plain = fixture.spawn("add_int", [0.0, 0.0]);

        let missing = expand_call(&mut fixture.doc, NodeId(404), &settings).unwrap_err();
        assert!(missing.is_precondition());
        assert!(matches!(
            expand_call(&mut fixture.doc, plain, &settings),
            Err(ExpandError::NotACallNode(_))
        ));

        // A function with only its markers has nothing to inline
        let doc = &mut fixture.doc;
        crate::synthesizer::create_new_function(doc, "Empty", true, &settings).unwrap();
        let call = doc
            .create_node(
                EVENT_GRAPH_NAME,
                NodeTemplate::CallFunction,
                &NodeInitContext::for_method(MethodInfo::new("Empty")),
                None,
            )
            .unwrap();
        let before = doc.to_ron_string().unwrap();
        assert!(matches!(
            expand_call(doc, call, &settings),
            Err(ExpandError::NothingToInline(_))
        ));
        assert_eq!(doc.to_ron_string().unwrap(), before);
        assert_eq!(doc.graph("Empty").map(|g| g.kind), Some(GraphKind::Function));
    }
}
