// SPDX-License-Identifier: MIT OR Apache-2.0
//! Function synthesis: a new function graph with its entry (and result) marker.

use crate::settings::EditorSettings;
use ordoplay_script_graph::{
    DocumentError, Document, GraphKind, MethodInfo, NodeInitContext, NodeTemplate,
};

/// Create the function `name` together with its backing graph.
///
/// Fails if a graph named `name` already exists. If the entry marker cannot be
/// created the new graph is removed again, so no orphan graph is left behind.
/// A result marker that fails to spawn is only logged: a void function is valid
/// without one.
pub fn create_new_function(
    doc: &mut Document,
    name: &str,
    add_return_node: bool,
    settings: &EditorSettings,
) -> Result<String, DocumentError> {
    doc.create_graph(name, GraphKind::Function)?;

    let context = NodeInitContext::for_method(MethodInfo::new(name));
    let entry = match doc.create_node(name, NodeTemplate::FunctionEntry, &context, None) {
        Ok(entry) => entry,
        Err(e) => {
            doc.remove_graph(name);
            tracing::error!("Failed to create function entry node for function {name}: {e}");
            return Err(e);
        }
    };

    if add_return_node {
        let position = doc
            .node(entry)
            .map(|n| [n.position[0] + settings.result_spawn_offset, n.position[1]]);
        if let Err(e) = doc.create_node(name, NodeTemplate::FunctionResult, &context, position) {
            tracing::warn!("Failed to spawn result node for function '{name}': {e}");
        }
    }

    tracing::debug!("Created function '{name}'");
    Ok(name.to_string())
}
