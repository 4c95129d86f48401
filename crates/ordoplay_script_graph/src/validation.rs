// SPDX-License-Identifier: MIT OR Apache-2.0
//! Whole-document validation producing build diagnostics.

use crate::document::Document;
use crate::connection::Connection;
use crate::graph::{Graph, GraphKind};
use crate::node::{NodeId, NodeKind};
use crate::pin::PinDirection;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Suspicious but buildable
    Warning,
    /// Prevents a build
    Error,
}

/// One diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMessage {
    /// Severity
    pub severity: Severity,
    /// Node the message is about, if any
    pub node: Option<NodeId>,
    /// Human-readable text
    pub text: String,
}

/// Collected diagnostics of one validation run
#[derive(Debug, Clone, Default)]
pub struct BuildLog {
    messages: Vec<BuildMessage>,
}

impl BuildLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error
    pub fn error(&mut self, node: Option<NodeId>, text: impl Into<String>) {
        self.push(Severity::Error, node, text.into());
    }

    /// Record a warning
    pub fn warn(&mut self, node: Option<NodeId>, text: impl Into<String>) {
        self.push(Severity::Warning, node, text.into());
    }

    fn push(&mut self, severity: Severity, node: Option<NodeId>, text: String) {
        self.messages.push(BuildMessage {
            severity,
            node,
            text,
        });
    }

    /// All messages in the order they were recorded
    pub fn messages(&self) -> &[BuildMessage] {
        &self.messages
    }

    /// Whether any error was recorded
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.severity == Severity::Error)
    }

    /// Whether any warning was recorded
    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|m| m.severity == Severity::Warning)
    }
}

impl Document {
    /// Validate every graph and function, appending diagnostics to `log`
    pub fn validate_and_build(&self, log: &mut BuildLog) {
        self.validate_functions(log);
        for graph in self.graphs() {
            self.validate_graph(graph, log);
        }
    }

    fn validate_functions(&self, log: &mut BuildLog) {
        for function in self.functions() {
            match self.graph(&function.graph_name) {
                Some(graph) if graph.kind == GraphKind::Function => {}
                Some(_) => log.error(
                    None,
                    format!("Function '{}' is backed by a non-function graph", function.name),
                ),
                None => log.error(
                    None,
                    format!("Function '{}' has no graph '{}'", function.name, function.graph_name),
                ),
            }

            let entry_ok = self.node(function.owning_node_id).is_some_and(|n| {
                matches!(&n.kind, NodeKind::FunctionEntry { function: f } if *f == function.name)
            });
            if !entry_ok {
                log.error(None, format!("Function '{}' has lost its entry node", function.name));
            }

            if let Some(result) = function.result_node_id {
                if self.node(result).is_none() {
                    log.error(None, format!("Function '{}' references a missing result node", function.name));
                } else if !self.has_any_connections(result, PinDirection::Input, 0) {
                    log.warn(
                        Some(result),
                        format!("Result node of '{}' is never reached by execution", function.name),
                    );
                }
            }
        }
    }

    fn validate_graph(&self, graph: &Graph, log: &mut BuildLog) {
        if graph.kind == GraphKind::Function {
            let entries = self
                .nodes_in(graph)
                .filter(|n| matches!(n.kind, NodeKind::FunctionEntry { .. }))
                .count();
            if entries != 1 {
                log.error(
                    None,
                    format!("Function graph '{}' has {entries} entry nodes, expected one", graph.name),
                );
            }
        }

        for wire in graph.connections() {
            let source = self.pin(wire.from_node, PinDirection::Output, wire.from_port);
            let target = self.pin(wire.to_node, PinDirection::Input, wire.to_port);
            match (source, target) {
                (Ok(s), Ok(t)) if s.can_connect(t) => {}
                (Ok(_), Ok(_)) => log.error(
                    Some(wire.to_node),
                    format!("Wire from node {} into node {} joins incompatible pins", wire.from_node, wire.to_node),
                ),
                (Err(e), _) | (_, Err(e)) => log.error(Some(wire.to_node), e.to_string()),
            }
            if !graph.has_node(wire.from_node) || !graph.has_node(wire.to_node) {
                log.error(
                    Some(wire.to_node),
                    format!("Wire in '{}' reaches outside the graph", graph.name),
                );
            }
        }

        for node in self.nodes_in(graph) {
            if let NodeKind::CallFunction { function } = &node.kind {
                match self.function(function) {
                    None => log.error(
                        Some(node.id),
                        format!("Call node {} references unknown function '{function}'", node.id),
                    ),
                    Some(f) => {
                        let inputs = 1 + f.argument_count();
                        let outputs = 1 + usize::from(f.has_return_value());
                        if node.inputs.len() != inputs || node.outputs.len() != outputs {
                            log.error(
                                Some(node.id),
                                format!("Call node {} does not match the signature of '{function}'", node.id),
                            );
                        }
                    }
                }
            }

            for (port, pin) in node.inputs.iter().enumerate() {
                if pin.required
                    && pin.default_value.is_none()
                    && graph.connections_to(node.id, port).next().is_none()
                {
                    log.error(
                        Some(node.id),
                        format!("Node {} is missing a value for required input '{}'", node.id, pin.name),
                    );
                }
            }

            if graph.node_count() > 1 && graph.connections_for_node(node.id).next().is_none() {
                log.warn(Some(node.id), format!("Node {} ({}) is not connected", node.id, node.name));
            }
        }

        let data_only = |wire: &Connection| {
            self.pin(wire.from_node, PinDirection::Output, wire.from_port)
                .is_ok_and(|p| !p.is_execution())
        };
        if let Err(cycle) = graph.topological_order(data_only) {
            log.error(
                Some(cycle.0),
                format!("Data dependency cycle in '{}' through node {}", graph.name, cycle.0),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeTemplate;
    use crate::graph::EVENT_GRAPH_NAME;
    use crate::library::create_script_registry;
    use crate::method::{MethodInfo, NodeInitContext};

    fn spawn(doc: &mut Document, type_id: &str) -> NodeId {
        let registry = create_script_registry();
        doc.create_node(
            EVENT_GRAPH_NAME,
            NodeTemplate::Generic(registry.get(type_id).unwrap()),
            &NodeInitContext::default(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_clean_document_builds() {
        let mut doc = Document::new();
        let dice = spawn(&mut doc, "roll_dice");
        let score = spawn(&mut doc, "set_score");
        doc.link(EVENT_GRAPH_NAME, dice, 0, score, 0).unwrap();
        doc.link(EVENT_GRAPH_NAME, dice, 1, score, 1).unwrap();

        let mut log = BuildLog::new();
        doc.validate_and_build(&mut log);
        assert!(!log.has_errors(), "{:?}", log.messages());
    }

    #[test]
    fn test_required_input_reported() {
        let mut doc = Document::new();
        let score = spawn(&mut doc, "set_score");

        let mut log = BuildLog::new();
        doc.validate_and_build(&mut log);
        assert!(log.has_errors());
        assert_eq!(log.messages()[0].node, Some(score));
    }

    #[test]
    fn test_data_cycle_reported() {
        let mut doc = Document::new();
        let a = spawn(&mut doc, "add_int");
        let b = spawn(&mut doc, "add_int");
        doc.link(EVENT_GRAPH_NAME, a, 0, b, 0).unwrap();
        doc.link(EVENT_GRAPH_NAME, b, 0, a, 0).unwrap();

        let mut log = BuildLog::new();
        doc.validate_and_build(&mut log);
        assert!(log.messages().iter().any(|m| m.text.contains("cycle")));
    }

    #[test]
    fn test_dangling_call_reported() {
        let mut doc = Document::new();
        doc.create_graph("Helper", GraphKind::Function).unwrap();
        let ctx = NodeInitContext::for_method(MethodInfo::new("Helper"));
        doc.create_node("Helper", NodeTemplate::FunctionEntry, &ctx, None).unwrap();
        let call = doc
            .create_node(EVENT_GRAPH_NAME, NodeTemplate::CallFunction, &ctx, None)
            .unwrap();
        doc.remove_graph("Helper");

        let mut log = BuildLog::new();
        doc.validate_and_build(&mut log);
        assert!(log
            .messages()
            .iter()
            .any(|m| m.node == Some(call) && m.severity == Severity::Error));
    }
}
