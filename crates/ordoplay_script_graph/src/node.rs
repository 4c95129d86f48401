// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the script document.

use crate::method::MethodInfo;
use crate::pin::{Pin, PinDirection};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node.
///
/// Allocated by the owning [`Document`](crate::Document), unique across all of its
/// graphs, and increasing with creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a node is, and therefore which pin shape it carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Start of a function graph: execution out plus one data out per parameter
    FunctionEntry {
        /// Function name
        function: String,
    },
    /// End of a function graph: execution in plus the return value, if any
    FunctionResult {
        /// Function name
        function: String,
    },
    /// Invocation of a function from another graph
    CallFunction {
        /// Callee name
        function: String,
    },
    /// Event handler in the event graph
    Event {
        /// Handled signature
        method: MethodInfo,
    },
    /// Library node created from a [`NodeType`]
    Generic {
        /// Node type ID
        type_id: String,
    },
}

impl NodeKind {
    /// Function referenced by an entry, result or call node
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Self::FunctionEntry { function }
            | Self::FunctionResult { function }
            | Self::CallFunction { function } => Some(function),
            Self::Event { .. } | Self::Generic { .. } => None,
        }
    }

    /// Whether the node is an entry or result marker
    pub fn is_marker(&self) -> bool {
        matches!(self, Self::FunctionEntry { .. } | Self::FunctionResult { .. })
    }
}

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Flow control
    Flow,
    /// Math operations
    Math,
    /// Constants and conversions
    Value,
    /// Scene access
    Scene,
    /// Utility nodes
    Utility,
}

/// Node type definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Default input pins
    pub inputs: Vec<Pin>,
    /// Default output pins
    pub outputs: Vec<Pin>,
    /// Whether instances may be duplicated (and therefore collapsed)
    pub can_duplicate: bool,
}

/// A node instance in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node kind
    pub kind: NodeKind,
    /// Display name
    pub name: String,
    /// Position in the graph UI
    pub position: [f32; 2],
    /// Input pins
    pub inputs: Vec<Pin>,
    /// Output pins
    pub outputs: Vec<Pin>,
    /// Whether the node may be duplicated
    pub can_duplicate: bool,
}

impl Node {
    /// Pins in one direction, in port order
    pub fn find_pins(&self, direction: PinDirection) -> &[Pin] {
        match direction {
            PinDirection::Input => &self.inputs,
            PinDirection::Output => &self.outputs,
        }
    }

    /// Pin at `port` in one direction
    pub fn find_pin(&self, port: usize, direction: PinDirection) -> Option<&Pin> {
        self.find_pins(direction).get(port)
    }

    /// Get an input pin by index
    pub fn input(&self, port: usize) -> Option<&Pin> {
        self.inputs.get(port)
    }

    /// Get an output pin by index
    pub fn output(&self, port: usize) -> Option<&Pin> {
        self.outputs.get(port)
    }

    /// Position as a point
    pub fn pos(&self) -> egui::Pos2 {
        egui::pos2(self.position[0], self.position[1])
    }
}

/// Registry of available node types
pub struct NodeRegistry {
    types: indexmap::IndexMap<String, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: indexmap::IndexMap::new(),
        }
    }

    /// Register a node type
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Get types by category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.category == category)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
