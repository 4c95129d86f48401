// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared fixtures for the editor tests.

use ordoplay_script_graph::library::create_script_registry;
use ordoplay_script_graph::{
    Document, NodeId, NodeInitContext, NodeRegistry, NodeTemplate, EVENT_GRAPH_NAME,
};

pub struct Fixture {
    pub doc: Document,
    registry: NodeRegistry,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            doc: Document::new(),
            registry: create_script_registry(),
        }
    }

    pub fn spawn(&mut self, type_id: &str, position: [f32; 2]) -> NodeId {
        let node_type = self.registry.get(type_id).unwrap();
        self.doc
            .create_node(
                EVENT_GRAPH_NAME,
                NodeTemplate::Generic(node_type),
                &NodeInitContext::default(),
                Some(position),
            )
            .unwrap()
    }

    pub fn link(&mut self, from: NodeId, from_port: usize, to: NodeId, to_port: usize) {
        self.doc
            .link(EVENT_GRAPH_NAME, from, from_port, to, to_port)
            .unwrap();
    }
}

/// `A(roll_dice) -> B(set_score) -> C(print_string)`, with A's value feeding B's score.
pub struct Chain {
    pub fixture: Fixture,
    pub a: NodeId,
    pub b: NodeId,
    pub c: NodeId,
}

pub fn chain() -> Chain {
    let mut fixture = Fixture::new();
    let a = fixture.spawn("roll_dice", [0.0, 0.0]);
    let b = fixture.spawn("set_score", [300.0, 0.0]);
    let c = fixture.spawn("print_string", [600.0, 0.0]);
    fixture.link(a, 0, b, 0);
    fixture.link(a, 1, b, 1);
    fixture.link(b, 0, c, 0);
    Chain { fixture, a, b, c }
}
