// SPDX-License-Identifier: MIT OR Apache-2.0
//! Collapse a selection into a new function plus a call node.

use crate::error::CollapseError;
use crate::legality::check_collapse;
use crate::names::create_unique_name;
use crate::relocator::relocate;
use crate::rewirer::{rewire_collapse, sever_boundary, CollapseSite};
use crate::settings::EditorSettings;
use crate::synthesizer::create_new_function;
use indexmap::IndexSet;
use ordoplay_script_graph::{
    Document, DocumentError, Function, NodeId, NodeInitContext, NodeTemplate,
};

/// What a successful collapse produced
#[derive(Debug, Clone, PartialEq)]
pub struct CollapseOutcome {
    /// Name of the new function
    pub function: String,
    /// Call node left in the source graph
    pub call_node: NodeId,
    /// Graph the selection was taken from
    pub source_graph: String,
    /// Number of parameters the function received
    pub parameters: usize,
    /// Whether the function returns a value
    pub returns_value: bool,
}

/// Pick a function name that collides with neither a function nor a graph
pub fn unique_function_name(doc: &Document, settings: &EditorSettings) -> String {
    let mut taken = doc.function_names();
    taken.extend(doc.graphs().map(|g| g.name.clone()));
    create_unique_name(&settings.function_name_prefix, taken.iter().map(String::as_str))
}

/// Extract `selection` into a new function and replace it with a call node.
///
/// Legality failures are returned before the document is touched. A
/// [`CollapseError::Document`] means mutation had begun when a primitive failed.
pub fn collapse_to_function(
    doc: &mut Document,
    selection: &[NodeId],
    settings: &EditorSettings,
) -> Result<CollapseOutcome, CollapseError> {
    let selection: Vec<NodeId> = selection
        .iter()
        .copied()
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();
    let (source_graph, connections) = check_collapse(doc, &selection)?;

    let name = unique_function_name(doc, settings);
    let function = create_new_function(doc, &name, true, settings)?;

    sever_boundary(doc, &source_graph, &connections);
    let area = relocate(doc, &selection, &function)?;

    let method = doc
        .function(&function)
        .map(Function::method_info)
        .ok_or_else(|| DocumentError::FunctionNotFound(function.clone()))?;
    let center = area.center();
    let call_node = doc.create_node(
        &source_graph,
        NodeTemplate::CallFunction,
        &NodeInitContext::for_method(method),
        Some([center.x, center.y]),
    )?;

    let site = CollapseSite {
        source_graph: &source_graph,
        function: &function,
        call_node,
    };
    rewire_collapse(doc, &site, &connections, settings)?;

    let (parameters, returns_value) = doc
        .function(&function)
        .map(|f| (f.argument_count(), f.has_return_value()))
        .unwrap_or_default();
    tracing::info!(
        "Collapsed {} nodes into function '{function}' ({parameters} parameters)",
        selection.len()
    );

    Ok(CollapseOutcome {
        function,
        call_node,
        source_graph,
        parameters,
        returns_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{chain, Fixture};
    use ordoplay_script_graph::{NodeKind, PinDirection, PinType, EVENT_GRAPH_NAME};

    fn wired(doc: &Document, graph: &str, from: NodeId, fp: usize, to: NodeId, tp: usize) -> bool {
        doc.graph(graph)
            .unwrap()
            .has_connection(&ordoplay_script_graph::Connection::new(from, fp, to, tp))
    }

    #[test]
    fn test_collapse_middle_of_chain() {
        let mut chain = chain();
        let settings = EditorSettings::default();
        let doc = &mut chain.fixture.doc;

        let outcome = collapse_to_function(doc, &[chain.b], &settings).unwrap();

        assert_eq!(outcome.function, "NewFunction");
        assert_eq!(outcome.parameters, 1);
        assert!(!outcome.returns_value);

        let function = doc.function("NewFunction").unwrap();
        assert_eq!(function.arguments[0].name, "Score");
        assert_eq!(function.arguments[0].pin_type, PinType::Int);

        let call = outcome.call_node;
        assert!(matches!(
            &doc.node(call).unwrap().kind,
            NodeKind::CallFunction { function } if function == "NewFunction"
        ));
        assert_eq!(doc.node(call).unwrap().position, [300.0, 0.0]);
        assert!(wired(doc, EVENT_GRAPH_NAME, chain.a, 0, call, 0));
        assert!(wired(doc, EVENT_GRAPH_NAME, chain.a, 1, call, 1));
        assert!(wired(doc, EVENT_GRAPH_NAME, call, 0, chain.c, 0));
        assert_eq!(doc.graph(EVENT_GRAPH_NAME).unwrap().connection_count(), 3);

        let entry = function.owning_node_id;
        let result = function.result_node_id.unwrap();
        assert!(wired(doc, "NewFunction", entry, 0, chain.b, 0));
        assert!(wired(doc, "NewFunction", entry, 1, chain.b, 1));
        assert!(wired(doc, "NewFunction", chain.b, 0, result, 0));
        assert!(doc.graph("NewFunction").unwrap().has_node(chain.b));
        assert_eq!(doc.node(entry).unwrap().position, [50.0, 0.0]);
        assert_eq!(doc.node(result).unwrap().position, [550.0, 0.0]);

        let mut log = ordoplay_script_graph::BuildLog::new();
        doc.validate_and_build(&mut log);
        assert!(!log.has_errors(), "{:?}", log.messages());
    }

    #[test]
    fn test_rejected_collapse_leaves_document_untouched() {
        let mut fixture = Fixture::new();
        let first = fixture.spawn("roll_dice", [0.0, 0.0]);
        let second = fixture.spawn("roll_dice", [0.0, 100.0]);
        let target = fixture.spawn("print_string", [300.0, 0.0]);
        let tail = fixture.spawn("print_string", [300.0, 100.0]);
        fixture.link(first, 0, target, 0);
        fixture.link(second, 0, tail, 0);
        let before = fixture.doc.to_ron_string().unwrap();

        let err = collapse_to_function(&mut fixture.doc, &[target, tail], &EditorSettings::default())
            .unwrap_err();

        assert!(matches!(err, CollapseError::MultipleInputExecutions));
        assert!(!err.after_mutation());
        assert_eq!(fixture.doc.to_ron_string().unwrap(), before);
        assert!(!fixture.doc.has_graph("NewFunction"));
    }

    #[test]
    fn test_singleton_blocks_collapse() {
        let mut fixture = Fixture::new();
        let root = fixture.spawn("scene_root", [0.0, 0.0]);
        let before = fixture.doc.to_ron_string().unwrap();
        assert!(matches!(
            collapse_to_function(&mut fixture.doc, &[root], &EditorSettings::default()),
            Err(CollapseError::NotDuplicable(_))
        ));
        assert_eq!(fixture.doc.to_ron_string().unwrap(), before);
    }

    /// A pure data node feeding two or three consumers
    fn fan_out(consumers: usize) -> (Fixture, NodeId, Vec<NodeId>) {
        let mut fixture = Fixture::new();
        let source = fixture.spawn("int_literal", [0.0, 0.0]);
        let targets: Vec<NodeId> = (0..consumers)
            .map(|i| {
                let target = fixture.spawn("to_string", [300.0, 100.0 * i as f32]);
                fixture.link(source, 0, target, 0);
                target
            })
            .collect();
        (fixture, source, targets)
    }

    #[test]
    fn test_two_data_outputs_allowed() {
        let (mut fixture, source, targets) = fan_out(2);
        let doc = &mut fixture.doc;

        let outcome = collapse_to_function(doc, &[source], &EditorSettings::default()).unwrap();

        assert!(outcome.returns_value);
        assert_eq!(outcome.parameters, 0);
        let function = doc.function(&outcome.function).unwrap();
        assert_eq!(function.return_type, Some(PinType::Int));
        let result = function.result_node_id.unwrap();
        let entry = function.owning_node_id;
        assert!(wired(doc, &outcome.function, source, 0, result, 1));
        // No execution path through the body: entry flows straight to result
        assert!(wired(doc, &outcome.function, entry, 0, result, 0));
        for target in targets {
            assert!(wired(doc, EVENT_GRAPH_NAME, outcome.call_node, 1, target, 0));
        }
    }

    #[test]
    fn test_three_outputs_rejected() {
        let (mut fixture, source, _) = fan_out(3);
        let before = fixture.doc.to_ron_string().unwrap();
        assert!(matches!(
            collapse_to_function(&mut fixture.doc, &[source], &EditorSettings::default()),
            Err(CollapseError::TooManyOutputs(3))
        ));
        assert_eq!(fixture.doc.to_ron_string().unwrap(), before);
    }

    #[test]
    fn test_second_data_source_left_unwired() {
        let mut fixture = Fixture::new();
        let left = fixture.spawn("int_literal", [0.0, 0.0]);
        let right = fixture.spawn("int_literal", [0.0, 100.0]);
        let first = fixture.spawn("to_string", [300.0, 0.0]);
        let second = fixture.spawn("to_string", [300.0, 100.0]);
        fixture.link(left, 0, first, 0);
        fixture.link(right, 0, second, 0);
        let doc = &mut fixture.doc;

        let outcome = collapse_to_function(doc, &[left, right], &EditorSettings::default()).unwrap();

        assert!(wired(doc, EVENT_GRAPH_NAME, outcome.call_node, 1, first, 0));
        assert!(!doc.has_any_connections(second, PinDirection::Input, 0));
    }

    #[test]
    fn test_data_parameters_follow_enumeration_order() {
        let mut fixture = Fixture::new();
        let left = fixture.spawn("int_literal", [0.0, 0.0]);
        let right = fixture.spawn("int_literal", [0.0, 100.0]);
        let add = fixture.spawn("add_int", [300.0, 0.0]);
        fixture.link(left, 0, add, 0);
        fixture.link(right, 0, add, 1);
        let doc = &mut fixture.doc;

        let outcome = collapse_to_function(doc, &[add], &EditorSettings::default()).unwrap();

        let function = doc.function(&outcome.function).unwrap();
        let names: Vec<&str> = function.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert!(wired(doc, EVENT_GRAPH_NAME, left, 0, outcome.call_node, 1));
        assert!(wired(doc, EVENT_GRAPH_NAME, right, 0, outcome.call_node, 2));
    }

    #[test]
    fn test_sealed_selection_is_void() {
        let mut fixture = Fixture::new();
        let add = fixture.spawn("add_int", [0.0, 0.0]);
        let doc = &mut fixture.doc;

        let outcome = collapse_to_function(doc, &[add], &EditorSettings::default()).unwrap();

        let function = doc.function(&outcome.function).unwrap();
        assert_eq!(function.argument_count(), 0);
        assert!(!function.has_return_value());
        let entry = function.owning_node_id;
        let result = function.result_node_id.unwrap();
        assert!(wired(doc, &outcome.function, entry, 0, result, 0));
        // Entry has only its execution output, so it sits left of the result
        let result_x = doc.node(result).unwrap().position[0];
        assert_eq!(doc.node(entry).unwrap().position[0], result_x - 250.0);
    }

    #[test]
    fn test_names_are_unique() {
        let mut fixture = Fixture::new();
        let first = fixture.spawn("add_int", [0.0, 0.0]);
        let second = fixture.spawn("add_int", [0.0, 100.0]);
        let settings = EditorSettings::default();

        let a = collapse_to_function(&mut fixture.doc, &[first], &settings).unwrap();
        let b = collapse_to_function(&mut fixture.doc, &[second], &settings).unwrap();

        assert_eq!(a.function, "NewFunction");
        assert_eq!(b.function, "NewFunction1");
    }

    #[test]
    fn test_duplicate_selection_ids_ignored() {
        let mut chain = chain();
        let outcome =
            collapse_to_function(&mut chain.fixture.doc, &[chain.b, chain.b], &EditorSettings::default())
                .unwrap();
        assert_eq!(outcome.parameters, 1);
    }
}
