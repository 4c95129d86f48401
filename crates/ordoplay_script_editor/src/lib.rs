// SPDX-License-Identifier: MIT OR Apache-2.0
//! Script view for `OrdoPlay` Editor.
//!
//! Editor-side refactorings over a script document:
//! - Collapse a selection into a new function plus a call node
//! - Expand (inline) a call node back into its function body
//! - Build diagnostics routed to a console, with links back to nodes
//! - Snapshot undo/redo, one step per refactoring
//!
//! ## Collapse pipeline
//!
//! [`boundary`] partitions the wires around the selection, [`legality`]
//! rejects shapes a call node cannot represent, [`synthesizer`] creates the
//! function, [`relocator`] moves the nodes and [`rewirer`] reconnects the
//! boundary around the entry, result and call nodes. [`collapse`] strings
//! these together; [`inliner`] runs the inverse.

pub mod boundary;
pub mod collapse;
pub mod console;
pub mod error;
pub mod history;
pub mod inliner;
pub mod legality;
pub mod names;
pub mod relocator;
pub mod rewirer;
pub mod script_view;
pub mod settings;
pub mod synthesizer;

#[cfg(test)]
mod test_support;

pub use boundary::NodeSetConnections;
pub use collapse::{collapse_to_function, CollapseOutcome};
pub use console::{Console, LogEntry, LogLevel, TracingBridge};
pub use error::{CollapseError, ExpandError};
pub use history::{History, HistoryError};
pub use inliner::{expand_call, ExpandOutcome};
pub use script_view::{ChangeSet, Focus, ScriptView};
pub use settings::{EditorSettings, SettingsError};
