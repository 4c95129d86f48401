// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the collapse and expand refactorings.

use ordoplay_script_graph::{DocumentError, NodeId};
use thiserror::Error;

/// Why a selection could not be collapsed into a function
#[derive(Debug, Error)]
pub enum CollapseError {
    /// Nothing selected
    #[error("Nothing selected to collapse")]
    EmptySelection,

    /// A selected id does not resolve
    #[error("Selected node {0} does not exist")]
    UnknownNode(NodeId),

    /// The selection is not confined to one graph
    #[error("Selected nodes belong to more than one graph")]
    MixedGraphs,

    /// A selected node may not be duplicated
    #[error("Cannot collapse because node {0} cannot be duplicated.")]
    NotDuplicable(NodeId),

    /// More than one execution wire enters the selection
    #[error("Cannot collapse to function with more than one external input execution wire.")]
    MultipleInputExecutions,

    /// More than one execution wire leaves the selection
    #[error("Cannot collapse to function with more than one external output execution wire.")]
    MultipleOutputExecutions,

    /// More wires leave the selection than a call node can expose
    #[error("Cannot output more than one execution and one data pin ({0} wires leave the selection).")]
    TooManyOutputs(usize),

    /// A document primitive failed
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl CollapseError {
    /// Precondition failures are silent no-ops rather than user-visible errors
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::EmptySelection | Self::UnknownNode(_))
    }

    /// Whether the document may have been mutated before the failure
    pub fn after_mutation(&self) -> bool {
        matches!(self, Self::Document(_))
    }
}

/// Why a call node could not be inlined
#[derive(Debug, Error)]
pub enum ExpandError {
    /// The id does not resolve
    #[error("Node {0} does not exist")]
    UnknownNode(NodeId),

    /// The node is not a function call
    #[error("Node {0} is not a function call")]
    NotACallNode(NodeId),

    /// The callee is gone
    #[error("Function '{0}' not found")]
    FunctionNotFound(String),

    /// The callee's body has nothing that can be copied out
    #[error("Function '{0}' has no nodes to inline")]
    NothingToInline(String),

    /// A document primitive failed
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl ExpandError {
    /// Precondition failures are silent no-ops rather than user-visible errors
    pub fn is_precondition(&self) -> bool {
        !matches!(self, Self::Document(_))
    }
}
