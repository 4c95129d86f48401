// SPDX-License-Identifier: MIT OR Apache-2.0
//! Moves a node set into another graph.

use egui::Rect;
use ordoplay_script_graph::layout::node_set_rect;
use ordoplay_script_graph::{Document, DocumentError, NodeId};

/// Move `nodes` into `target`, keeping ids, pins and the wires among them.
///
/// Boundary wires must already be severed. Returns the bounding box of the
/// nodes, taken before the move.
pub fn relocate(doc: &mut Document, nodes: &[NodeId], target: &str) -> Result<Rect, DocumentError> {
    let area = node_set_rect(doc, nodes).unwrap_or(Rect::ZERO);
    doc.move_nodes_to_graph(nodes, target)?;
    tracing::debug!("Moved {} nodes into '{target}'", nodes.len());
    Ok(area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::chain;
    use ordoplay_script_graph::{GraphKind, EVENT_GRAPH_NAME};

    #[test]
    fn test_relocate_preserves_identity_and_layout() {
        let mut chain = chain();
        let doc = &mut chain.fixture.doc;
        doc.create_graph("Target", GraphKind::Function).unwrap();
        let before_a = doc.node(chain.a).unwrap().clone();

        let area = relocate(doc, &[chain.a, chain.b], "Target").unwrap();

        assert_eq!(area.center(), egui::pos2(150.0, 0.0));
        assert_eq!(doc.node(chain.a).unwrap(), &before_a);
        assert!(doc.graph("Target").unwrap().has_node(chain.b));
        assert_eq!(doc.graph("Target").unwrap().connection_count(), 2);
        assert!(!doc.graph(EVENT_GRAPH_NAME).unwrap().has_node(chain.a));
    }
}
