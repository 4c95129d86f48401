// SPDX-License-Identifier: MIT OR Apache-2.0
//! The script document: one node arena shared by every graph.
//!
//! Node ids are unique across the whole document, so a node can be looked up
//! without knowing which graph currently owns it. Graphs hold id sets and the
//! wires among their members; functions reference their backing graph by name.

use crate::connection::Connection;
use crate::events::{ChangeListener, DocumentEvent, Listeners};
use crate::function::{shapes, Function};
use crate::graph::{Graph, GraphKind, EVENT_GRAPH_NAME};
use crate::method::{is_valid_identifier, Argument, NodeInitContext};
use crate::node::{Node, NodeId, NodeKind, NodeType};
use crate::pin::{Pin, PinDirection, PinType};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Result type for document operations
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Which kind of node to create
#[derive(Debug, Clone, Copy)]
pub enum NodeTemplate<'a> {
    /// Function entry marker; registers the function named by the context
    FunctionEntry,
    /// Function result marker for the function named by the context
    FunctionResult,
    /// Call of the function named by the context
    CallFunction,
    /// Event handler for the context's signature
    Event,
    /// Library node
    Generic(&'a NodeType),
}

/// The script document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    nodes: IndexMap<NodeId, Node>,
    graphs: IndexMap<String, Graph>,
    functions: IndexMap<String, Function>,
    next_node_id: u64,
    #[serde(skip)]
    edited: bool,
    #[serde(skip)]
    listeners: Listeners,
}

impl Document {
    /// Create a document containing only the event graph
    pub fn new() -> Self {
        let mut graphs = IndexMap::new();
        graphs.insert(
            EVENT_GRAPH_NAME.to_string(),
            Graph::new(EVENT_GRAPH_NAME, GraphKind::Event),
        );
        Self {
            nodes: IndexMap::new(),
            graphs,
            functions: IndexMap::new(),
            next_node_id: 1,
            edited: false,
            listeners: Listeners::default(),
        }
    }

    // --- Change tracking -------------------------------------------------

    /// Register a change listener
    pub fn subscribe(&mut self, listener: Arc<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    /// Whether anything changed since the flag was last cleared
    pub fn is_edited(&self) -> bool {
        self.edited
    }

    /// Set or clear the edited flag
    pub fn set_edited(&mut self, edited: bool) {
        self.edited = edited;
    }

    /// Report a change on a node
    pub fn emit_changed(&mut self, node_id: NodeId) {
        self.notify(DocumentEvent::NodeChanged(node_id));
    }

    fn notify(&mut self, event: DocumentEvent) {
        self.edited = true;
        self.listeners.emit(&event);
    }

    // --- Graphs ----------------------------------------------------------

    /// Whether a graph with this name exists
    pub fn has_graph(&self, name: &str) -> bool {
        self.graphs.contains_key(name)
    }

    /// Get a graph by name
    pub fn graph(&self, name: &str) -> Option<&Graph> {
        self.graphs.get(name)
    }

    /// All graphs, in creation order
    pub fn graphs(&self) -> impl Iterator<Item = &Graph> {
        self.graphs.values()
    }

    /// Create a new empty graph
    pub fn create_graph(&mut self, name: &str, kind: GraphKind) -> Result<&Graph> {
        if self.graphs.contains_key(name) {
            return Err(DocumentError::DuplicateGraph(name.to_string()));
        }
        self.graphs.insert(name.to_string(), Graph::new(name, kind));
        self.notify(DocumentEvent::GraphAdded(name.to_string()));
        self.graph(name)
            .ok_or_else(|| DocumentError::GraphNotFound(name.to_string()))
    }

    /// Remove a graph together with its nodes and any function it backs
    pub fn remove_graph(&mut self, name: &str) -> Option<Graph> {
        let graph = self.graphs.shift_remove(name)?;
        for node_id in graph.node_ids() {
            self.nodes.shift_remove(&node_id);
            self.notify(DocumentEvent::NodeRemoved(node_id));
        }
        let backed: Vec<String> = self
            .functions
            .values()
            .filter(|f| f.graph_name == name)
            .map(|f| f.name.clone())
            .collect();
        for function in backed {
            self.functions.shift_remove(&function);
            self.notify(DocumentEvent::FunctionChanged(function));
        }
        self.notify(DocumentEvent::GraphRemoved(name.to_string()));
        Some(graph)
    }

    fn graph_mut(&mut self, name: &str) -> Result<&mut Graph> {
        self.graphs
            .get_mut(name)
            .ok_or_else(|| DocumentError::GraphNotFound(name.to_string()))
    }

    // --- Nodes -----------------------------------------------------------

    /// Get a node by ID, whichever graph owns it
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// All nodes, in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Nodes of one graph, in membership order
    pub fn nodes_in<'a>(&'a self, graph: &'a Graph) -> impl Iterator<Item = &'a Node> + 'a {
        graph.node_ids().filter_map(move |id| self.nodes.get(&id))
    }

    /// The graph that owns a node
    pub fn graph_of(&self, node_id: NodeId) -> Option<&Graph> {
        self.graphs.values().find(|g| g.has_node(node_id))
    }

    fn graph_name_of(&self, node_id: NodeId) -> Result<String> {
        self.graph_of(node_id)
            .map(|g| g.name.clone())
            .ok_or(DocumentError::NodeNotFound(node_id))
    }

    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Create a node in `graph`.
    ///
    /// Entry, result, call and event templates read their signature from
    /// `context.method`. Creating an entry node also registers the function.
    pub fn create_node(
        &mut self,
        graph: &str,
        template: NodeTemplate<'_>,
        context: &NodeInitContext,
        position: Option<[f32; 2]>,
    ) -> Result<NodeId> {
        let graph_kind = self
            .graph(graph)
            .map(|g| g.kind)
            .ok_or_else(|| DocumentError::GraphNotFound(graph.to_string()))?;

        let (kind, name, inputs, outputs, can_duplicate) = match template {
            NodeTemplate::FunctionEntry => {
                let method = context.method.as_ref().ok_or(DocumentError::MissingMethod)?;
                if graph_kind != GraphKind::Function {
                    return Err(DocumentError::NotAFunctionGraph(graph.to_string()));
                }
                if !is_valid_identifier(&method.name) {
                    return Err(DocumentError::InvalidFunctionName(method.name.clone()));
                }
                if self.functions.contains_key(&method.name) {
                    return Err(DocumentError::DuplicateFunction(method.name.clone()));
                }
                if self.functions.values().any(|f| f.graph_name == graph) {
                    return Err(DocumentError::FunctionGraphTaken(graph.to_string()));
                }
                (
                    NodeKind::FunctionEntry {
                        function: method.name.clone(),
                    },
                    method.name.clone(),
                    Vec::new(),
                    shapes::entry_outputs(method),
                    false,
                )
            }
            NodeTemplate::FunctionResult => {
                let method = context.method.as_ref().ok_or(DocumentError::MissingMethod)?;
                let function = self
                    .function(&method.name)
                    .ok_or_else(|| DocumentError::FunctionNotFound(method.name.clone()))?;
                if function.graph_name != graph {
                    return Err(DocumentError::NotAFunctionGraph(graph.to_string()));
                }
                if function.result_node_id.is_some() {
                    return Err(DocumentError::ResultExists(method.name.clone()));
                }
                (
                    NodeKind::FunctionResult {
                        function: method.name.clone(),
                    },
                    "Return Node".to_string(),
                    shapes::result_inputs(&function.method_info()),
                    Vec::new(),
                    false,
                )
            }
            NodeTemplate::CallFunction => {
                let method = context.method.as_ref().ok_or(DocumentError::MissingMethod)?;
                let signature = self
                    .function(&method.name)
                    .map(Function::method_info)
                    .ok_or_else(|| DocumentError::FunctionNotFound(method.name.clone()))?;
                (
                    NodeKind::CallFunction {
                        function: method.name.clone(),
                    },
                    format!("Call {}", method.name),
                    shapes::call_inputs(&signature),
                    shapes::call_outputs(&signature),
                    true,
                )
            }
            NodeTemplate::Event => {
                let method = context.method.as_ref().ok_or(DocumentError::MissingMethod)?;
                (
                    NodeKind::Event {
                        method: method.clone(),
                    },
                    method.name.clone(),
                    Vec::new(),
                    shapes::entry_outputs(method),
                    false,
                )
            }
            NodeTemplate::Generic(node_type) => (
                NodeKind::Generic {
                    type_id: node_type.id.clone(),
                },
                node_type.name.clone(),
                node_type.inputs.clone(),
                node_type.outputs.clone(),
                node_type.can_duplicate,
            ),
        };

        let id = self.allocate_id();
        match &kind {
            NodeKind::FunctionEntry { function } => {
                let method = context.method.as_ref().ok_or(DocumentError::MissingMethod)?;
                self.functions.insert(
                    function.clone(),
                    Function {
                        name: function.clone(),
                        arguments: method.arguments.clone(),
                        return_type: method.return_type.clone(),
                        owning_node_id: id,
                        graph_name: graph.to_string(),
                        result_node_id: None,
                    },
                );
            }
            NodeKind::FunctionResult { function } => {
                if let Some(f) = self.functions.get_mut(function) {
                    f.result_node_id = Some(id);
                }
            }
            _ => {}
        }

        self.nodes.insert(
            id,
            Node {
                id,
                kind,
                name,
                position: position.unwrap_or([0.0, 0.0]),
                inputs,
                outputs,
                can_duplicate,
            },
        );
        self.graph_mut(graph)?.insert_node(id);
        self.notify(DocumentEvent::NodeAdded {
            graph: graph.to_string(),
            node: id,
        });
        Ok(id)
    }

    /// Remove a node and its wires
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        let graph_name = self.graph_name_of(node_id).ok()?;
        let node = self.nodes.shift_remove(&node_id)?;
        if let Some(graph) = self.graphs.get_mut(&graph_name) {
            let dropped = graph.take_node(node_id);
            if !dropped.is_empty() {
                self.notify(DocumentEvent::ConnectionsChanged(graph_name));
            }
        }
        match &node.kind {
            NodeKind::FunctionResult { function } => {
                if let Some(f) = self.functions.get_mut(function) {
                    f.result_node_id = None;
                }
                let function = function.clone();
                self.notify(DocumentEvent::FunctionChanged(function));
            }
            NodeKind::FunctionEntry { function } => {
                tracing::warn!("Removed entry node of function '{function}'");
            }
            _ => {}
        }
        self.notify(DocumentEvent::NodeRemoved(node_id));
        Some(node)
    }

    /// Move a node in the graph UI
    pub fn set_node_position(&mut self, node_id: NodeId, position: [f32; 2]) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(DocumentError::NodeNotFound(node_id))?;
        node.position = position;
        self.emit_changed(node_id);
        Ok(())
    }

    /// Copy a node into `graph` at its position plus `offset`.
    ///
    /// A deep copy keeps pin default values; a shallow copy resets them to the
    /// type defaults.
    pub fn duplicate_node(
        &mut self,
        graph: &str,
        node_id: NodeId,
        offset: [f32; 2],
        deep: bool,
    ) -> Result<NodeId> {
        let mut node = self
            .node(node_id)
            .cloned()
            .ok_or(DocumentError::NodeNotFound(node_id))?;
        if !node.can_duplicate {
            return Err(DocumentError::NotDuplicable(node_id));
        }
        if !self.has_graph(graph) {
            return Err(DocumentError::GraphNotFound(graph.to_string()));
        }

        let id = self.allocate_id();
        node.id = id;
        node.position = [node.position[0] + offset[0], node.position[1] + offset[1]];
        if !deep {
            for pin in node.inputs.iter_mut().filter(|p| p.default_value.is_some()) {
                pin.default_value = pin.pin_type.default_value();
            }
        }

        self.nodes.insert(id, node);
        self.graph_mut(graph)?.insert_node(id);
        self.notify(DocumentEvent::NodeAdded {
            graph: graph.to_string(),
            node: id,
        });
        Ok(id)
    }

    /// Move one node to another graph
    pub fn move_node_to_graph(&mut self, node_id: NodeId, target: &str) -> Result<()> {
        self.move_nodes_to_graph(&[node_id], target)
    }

    /// Move a set of nodes to another graph.
    ///
    /// Wires among the moved nodes travel with them. Wires crossing the set
    /// boundary are dropped, since a graph only ever stores wires between its
    /// own members.
    pub fn move_nodes_to_graph(&mut self, node_ids: &[NodeId], target: &str) -> Result<()> {
        if !self.has_graph(target) {
            return Err(DocumentError::GraphNotFound(target.to_string()));
        }
        let mut sources = Vec::with_capacity(node_ids.len());
        for &id in node_ids {
            sources.push(self.graph_name_of(id)?);
        }

        let members: HashSet<NodeId> = node_ids.iter().copied().collect();
        let mut internal = IndexSet::new();
        let mut touched = IndexSet::new();
        for (&id, source) in node_ids.iter().zip(&sources) {
            if source == target {
                continue;
            }
            for wire in self.graph_mut(source)?.take_node(id) {
                if members.contains(&wire.from_node) && members.contains(&wire.to_node) {
                    internal.insert(wire);
                } else {
                    tracing::debug!(
                        "Dropping boundary wire {}:{} -> {}:{} while moving node {id}",
                        wire.from_node,
                        wire.from_port,
                        wire.to_node,
                        wire.to_port
                    );
                }
            }
            touched.insert(source.clone());
        }

        let graph = self.graph_mut(target)?;
        for (&id, source) in node_ids.iter().zip(&sources) {
            if source != target {
                graph.insert_node(id);
            }
        }
        for wire in internal {
            graph.insert_connection(wire);
        }

        for &id in node_ids {
            self.emit_changed(id);
        }
        for source in touched {
            self.notify(DocumentEvent::ConnectionsChanged(source));
        }
        self.notify(DocumentEvent::ConnectionsChanged(target.to_string()));
        Ok(())
    }

    // --- Wires -----------------------------------------------------------

    /// Wire an output port to an input port within `graph`
    pub fn link(
        &mut self,
        graph: &str,
        from_node: NodeId,
        from_port: usize,
        to_node: NodeId,
        to_port: usize,
    ) -> Result<()> {
        let owner = self
            .graph(graph)
            .ok_or_else(|| DocumentError::GraphNotFound(graph.to_string()))?;
        for node in [from_node, to_node] {
            if !self.nodes.contains_key(&node) {
                return Err(DocumentError::NodeNotFound(node));
            }
            if !owner.has_node(node) {
                return Err(DocumentError::NodeNotInGraph {
                    node,
                    graph: graph.to_string(),
                });
            }
        }
        if from_node == to_node {
            return Err(DocumentError::SelfLoop);
        }

        let source = self.pin(from_node, PinDirection::Output, from_port)?;
        let target = self.pin(to_node, PinDirection::Input, to_port)?;
        if !source.can_connect(target) {
            return Err(DocumentError::IncompatiblePins {
                from: source.pin_type.clone(),
                to: target.pin_type.clone(),
            });
        }

        let connection = Connection::new(from_node, from_port, to_node, to_port);
        if owner.has_connection(&connection) {
            return Err(DocumentError::AlreadyConnected);
        }
        if !source.multi_connect && owner.connections_from(from_node, from_port).next().is_some() {
            return Err(DocumentError::PinAlreadyConnected {
                node: from_node,
                port: from_port,
            });
        }
        if !target.multi_connect && owner.connections_to(to_node, to_port).next().is_some() {
            return Err(DocumentError::PinAlreadyConnected {
                node: to_node,
                port: to_port,
            });
        }

        self.graph_mut(graph)?.insert_connection(connection);
        self.notify(DocumentEvent::ConnectionsChanged(graph.to_string()));
        Ok(())
    }

    /// Remove a wire; returns whether it existed
    pub fn unlink(
        &mut self,
        graph: &str,
        from_node: NodeId,
        from_port: usize,
        to_node: NodeId,
        to_port: usize,
    ) -> bool {
        let connection = Connection::new(from_node, from_port, to_node, to_port);
        let removed = self
            .graphs
            .get_mut(graph)
            .is_some_and(|g| g.remove_connection(&connection));
        if removed {
            self.notify(DocumentEvent::ConnectionsChanged(graph.to_string()));
        }
        removed
    }

    /// Look up a pin, failing with a descriptive error
    pub fn pin(&self, node_id: NodeId, direction: PinDirection, port: usize) -> Result<&Pin> {
        self.node(node_id)
            .ok_or(DocumentError::NodeNotFound(node_id))?
            .find_pin(port, direction)
            .ok_or(DocumentError::PinNotFound {
                node: node_id,
                port,
                direction,
            })
    }

    /// Wires attached to one pin
    pub fn pin_connections(
        &self,
        node_id: NodeId,
        direction: PinDirection,
        port: usize,
    ) -> Vec<Connection> {
        let Some(graph) = self.graph_of(node_id) else {
            return Vec::new();
        };
        match direction {
            PinDirection::Input => graph.connections_to(node_id, port).copied().collect(),
            PinDirection::Output => graph.connections_from(node_id, port).copied().collect(),
        }
    }

    /// Whether any wire is attached to the pin
    pub fn has_any_connections(&self, node_id: NodeId, direction: PinDirection, port: usize) -> bool {
        !self.pin_connections(node_id, direction, port).is_empty()
    }

    // --- Functions -------------------------------------------------------

    /// Get a function by name
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// All functions, in creation order
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    /// Names of all functions
    pub fn function_names(&self) -> IndexSet<String> {
        self.functions.keys().cloned().collect()
    }

    /// Whether a function with this name exists
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Append a parameter; returns its index.
    ///
    /// The entry node grows a data output and every call node grows an argument input.
    pub fn add_function_argument(&mut self, name: &str, argument: Argument) -> Result<usize> {
        let function = self
            .functions
            .get_mut(name)
            .ok_or_else(|| DocumentError::FunctionNotFound(name.to_string()))?;
        function.arguments.push(argument);
        let index = function.arguments.len() - 1;
        self.refresh_function_nodes(name);
        Ok(index)
    }

    /// Change the return type.
    ///
    /// The result node and every call node gain or lose their return value pin.
    pub fn set_function_return_type(&mut self, name: &str, return_type: Option<PinType>) -> Result<()> {
        let function = self
            .functions
            .get_mut(name)
            .ok_or_else(|| DocumentError::FunctionNotFound(name.to_string()))?;
        function.return_type = return_type;
        self.refresh_function_nodes(name);
        Ok(())
    }

    /// Rebuild the pins of every node mirroring the function's signature
    fn refresh_function_nodes(&mut self, name: &str) {
        let Some(method) = self.function(name).map(Function::method_info) else {
            return;
        };

        let mirrors: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|n| n.kind.function_name() == Some(name))
            .map(|n| n.id)
            .collect();

        for id in mirrors {
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            match node.kind {
                NodeKind::FunctionEntry { .. } => {
                    node.outputs = shapes::entry_outputs(&method);
                }
                NodeKind::FunctionResult { .. } => {
                    node.inputs = shapes::result_inputs(&method);
                }
                NodeKind::CallFunction { .. } => {
                    let mut inputs = shapes::call_inputs(&method);
                    for (new, old) in inputs.iter_mut().zip(&node.inputs) {
                        if new.pin_type == old.pin_type {
                            new.default_value = old.default_value.clone();
                        }
                    }
                    node.inputs = inputs;
                    node.outputs = shapes::call_outputs(&method);
                }
                NodeKind::Event { .. } | NodeKind::Generic { .. } => continue,
            }
            let (input_count, output_count) = (node.inputs.len(), node.outputs.len());

            if let Some(graph) = self.graphs.values_mut().find(|g| g.has_node(id)) {
                graph.retain_connections(|c| {
                    !(c.to_node == id && c.to_port >= input_count
                        || c.from_node == id && c.from_port >= output_count)
                });
            }
            self.emit_changed(id);
        }
        self.notify(DocumentEvent::FunctionChanged(name.to_string()));
    }

    // --- Persistence -----------------------------------------------------

    /// Serialize to pretty RON
    pub fn to_ron_string(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Parse a document from RON
    pub fn from_ron_str(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }

    /// Replace the content with `snapshot`, keeping the registered listeners
    pub fn restore(&mut self, snapshot: Document) {
        let listeners = std::mem::take(&mut self.listeners);
        *self = snapshot;
        self.listeners = listeners;
        self.notify(DocumentEvent::Reloaded);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Error from a document operation
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Graph not found
    #[error("Graph not found: {0}")]
    GraphNotFound(String),

    /// Graph name already in use
    #[error("Script already has graph named {0}")]
    DuplicateGraph(String),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Node is owned by another graph
    #[error("Node {node} is not in graph {graph}")]
    NodeNotInGraph {
        /// Node
        node: NodeId,
        /// Graph that was expected to own it
        graph: String,
    },

    /// Function not found
    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    /// Function name already in use
    #[error("Function already exists: {0}")]
    DuplicateFunction(String),

    /// Function name is not an identifier
    #[error("Invalid function name: {0:?}")]
    InvalidFunctionName(String),

    /// Marker nodes need a function graph
    #[error("Graph {0} is not the function graph")]
    NotAFunctionGraph(String),

    /// Function graph already backs a function
    #[error("Graph {0} already backs a function")]
    FunctionGraphTaken(String),

    /// Function already has a result marker
    #[error("Function {0} already has a result node")]
    ResultExists(String),

    /// Template needs a method signature
    #[error("Node initialization requires a method signature")]
    MissingMethod,

    /// Port index out of range
    #[error("Node {node} has no {direction:?} pin {port}")]
    PinNotFound {
        /// Node
        node: NodeId,
        /// Port index
        port: usize,
        /// Direction searched
        direction: PinDirection,
    },

    /// Pin types cannot be wired
    #[error("Incompatible pin types: {from:?} -> {to:?}")]
    IncompatiblePins {
        /// Source type
        from: PinType,
        /// Target type
        to: PinType,
    },

    /// Single-connect pin already has a wire
    #[error("Pin {port} on node {node} is already connected")]
    PinAlreadyConnected {
        /// Node
        node: NodeId,
        /// Port index
        port: usize,
    },

    /// Identical wire exists
    #[error("Connection already exists")]
    AlreadyConnected,

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,

    /// Node kind forbids duplication
    #[error("Node {0} cannot be duplicated")]
    NotDuplicable(NodeId),

    /// RON serialization failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// RON parsing failed
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}
