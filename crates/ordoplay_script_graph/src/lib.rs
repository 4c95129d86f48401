// SPDX-License-Identifier: MIT OR Apache-2.0
//! Script document model for `OrdoPlay` Editor.
//!
//! A script document ("orchestration") owns:
//! - One node arena, keyed by document-wide ids
//! - Named graphs (event, function, plain) holding member ids and wires
//! - Functions backed by function graphs, with entry/result marker nodes
//!
//! ## Architecture
//!
//! Nodes are a closed set of kinds (entry, result, call, event, library node),
//! each with a fixed pin shape. Pins are addressed by `(node, port index)` and
//! wires always run from an output port to an input port of the same graph.
//! Every mutation goes through [`Document`] which reports it to registered
//! [`ChangeListener`]s.

pub mod connection;
pub mod document;
pub mod events;
pub mod function;
pub mod graph;
pub mod layout;
pub mod library;
pub mod method;
pub mod node;
pub mod pin;
pub mod validation;

pub use connection::Connection;
pub use document::{Document, DocumentError, NodeTemplate};
pub use events::{ChangeListener, DocumentEvent};
pub use function::Function;
pub use graph::{Graph, GraphKind, EVENT_GRAPH_NAME};
pub use method::{Argument, MethodInfo, NodeInitContext};
pub use node::{Node, NodeId, NodeKind, NodeRegistry, NodeType};
pub use pin::{Pin, PinDirection, PinType, PinValue};
pub use validation::{BuildLog, BuildMessage, Severity};
