// SPDX-License-Identifier: MIT OR Apache-2.0
//! Layout helpers over node positions.

use crate::document::Document;
use crate::node::NodeId;
use egui::{Pos2, Rect, Vec2};

/// Bounding box of the positions of `node_ids`; unknown ids are skipped.
///
/// `None` when no node could be resolved.
pub fn node_set_rect(doc: &Document, node_ids: &[NodeId]) -> Option<Rect> {
    let mut positions = node_ids.iter().filter_map(|id| doc.node(*id)).map(|n| n.pos());
    let first = positions.next()?;
    let mut area = Rect::from_min_max(first, first);
    for pos in positions {
        area.extend_with(pos);
    }
    Some(area)
}

/// `pos` shifted by `offset`, as stored on nodes
pub fn offset_position(pos: Pos2, offset: Vec2) -> [f32; 2] {
    let moved = pos + offset;
    [moved.x, moved.y]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeTemplate;
    use crate::graph::EVENT_GRAPH_NAME;
    use crate::library::create_script_registry;
    use crate::method::NodeInitContext;

    #[test]
    fn test_rect_center() {
        let registry = create_script_registry();
        let node_type = registry.get("int_literal").unwrap();
        let mut doc = Document::new();
        let ctx = NodeInitContext::default();
        let a = doc
            .create_node(EVENT_GRAPH_NAME, NodeTemplate::Generic(node_type), &ctx, Some([0.0, 0.0]))
            .unwrap();
        let b = doc
            .create_node(EVENT_GRAPH_NAME, NodeTemplate::Generic(node_type), &ctx, Some([200.0, 100.0]))
            .unwrap();

        let area = node_set_rect(&doc, &[a, b]).unwrap();
        assert_eq!(area.center(), egui::pos2(100.0, 50.0));
        assert!(node_set_rect(&doc, &[]).is_none());
    }

    #[test]
    fn test_offset_position() {
        assert_eq!(
            offset_position(egui::pos2(10.0, 5.0), egui::vec2(-250.0, 0.0)),
            [-240.0, 5.0]
        );
    }
}
