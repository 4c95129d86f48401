// SPDX-License-Identifier: MIT OR Apache-2.0
//! The script view: the editor-side facade over one script document.
//!
//! Refactorings run through here so that each one becomes a single undo step,
//! and a refactoring that fails halfway is rolled back to the document the
//! user had before invoking it.

use crate::collapse::{collapse_to_function, CollapseOutcome};
use crate::console::{Console, LogLevel};
use crate::error::{CollapseError, ExpandError};
use crate::history::{History, HistoryError, StateSnapshot};
use crate::inliner::{expand_call, ExpandOutcome};
use crate::settings::EditorSettings;
use indexmap::IndexSet;
use ordoplay_script_graph::{
    Argument, BuildLog, ChangeListener, Document, DocumentError, DocumentEvent, MethodInfo,
    NodeId, NodeInitContext, NodeTemplate, PinType, EVENT_GRAPH_NAME,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Changes reported by the document since the last drain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Nodes added, removed or changed, in first-seen order
    pub nodes: Vec<NodeId>,
    /// Whether the whole document was replaced
    pub reloaded: bool,
}

#[derive(Default)]
struct TrackerState {
    nodes: IndexSet<NodeId>,
    reloaded: bool,
}

/// Collects node change notifications for UI refresh
#[derive(Default)]
struct ChangeTracker {
    state: Mutex<TrackerState>,
}

impl ChangeListener for ChangeTracker {
    fn on_event(&self, event: &DocumentEvent) {
        let mut state = self.state.lock();
        match event {
            DocumentEvent::NodeAdded { node, .. }
            | DocumentEvent::NodeRemoved(node)
            | DocumentEvent::NodeChanged(node) => {
                state.nodes.insert(*node);
            }
            DocumentEvent::Reloaded => state.reloaded = true,
            _ => {}
        }
    }
}

impl ChangeTracker {
    fn drain(&self) -> ChangeSet {
        let mut state = self.state.lock();
        ChangeSet {
            nodes: std::mem::take(&mut state.nodes).into_iter().collect(),
            reloaded: std::mem::take(&mut state.reloaded),
        }
    }
}

/// Node the view is focused on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Focus {
    /// Graph tab showing the node
    pub graph: String,
    /// Focused node
    pub node: NodeId,
}

/// Editor state for one script document
pub struct ScriptView {
    document: Document,
    settings: EditorSettings,
    history: History,
    console: Console,
    tracker: Arc<ChangeTracker>,
    functions: Vec<String>,
    focus: Option<Focus>,
}

impl ScriptView {
    /// Open a view over `document`
    pub fn new(mut document: Document, settings: EditorSettings, console: Console) -> Self {
        let tracker = Arc::new(ChangeTracker::default());
        document.subscribe(tracker.clone());
        let history = History::with_max_depth(settings.history_depth);
        let mut view = Self {
            document,
            settings,
            history,
            console,
            tracker,
            functions: Vec::new(),
            focus: None,
        };
        view.refresh_functions();
        view
    }

    /// The edited document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Editor settings
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// The console
    pub fn console(&self) -> &Console {
        &self.console
    }

    /// The console, for polling and clearing
    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Function listing, in document order
    pub fn functions(&self) -> &[String] {
        &self.functions
    }

    /// Currently focused node
    pub fn focus(&self) -> Option<&Focus> {
        self.focus.as_ref()
    }

    /// Whether the document has unsaved changes
    pub fn is_modified(&self) -> bool {
        self.document.is_edited()
    }

    /// Mark the current state as saved
    pub fn mark_saved(&mut self) {
        self.document.set_edited(false);
    }

    /// Drain node changes reported since the last call
    pub fn take_changes(&self) -> ChangeSet {
        self.tracker.drain()
    }

    /// Rebuild the function listing from the document
    pub fn refresh_functions(&mut self) {
        self.functions = self.document.function_names().into_iter().collect();
    }

    fn snapshot(&self) -> Option<StateSnapshot> {
        match StateSnapshot::capture(&self.document) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Could not snapshot document, change will not be undoable: {e}");
                None
            }
        }
    }

    fn commit(&mut self, description: &str, before: Option<StateSnapshot>) {
        if let Some(before) = before {
            if let Err(e) = self.history.record(description, before, &self.document) {
                tracing::warn!("Failed to record '{description}' in history: {e}");
            }
        }
    }

    fn roll_back(&mut self, before: Option<StateSnapshot>) {
        let Some(before) = before else {
            tracing::error!("Document left partially modified; no snapshot to restore");
            return;
        };
        match before.to_document() {
            Ok(snapshot) => self.document.restore(snapshot),
            Err(e) => tracing::error!("Failed to restore document: {e}"),
        }
    }

    /// Collapse the selected nodes into a new function and a call node
    pub fn collapse_selected_to_function(
        &mut self,
        selection: &[NodeId],
    ) -> Result<CollapseOutcome, CollapseError> {
        let before = self.snapshot();
        match collapse_to_function(&mut self.document, selection, &self.settings) {
            Ok(outcome) => {
                self.commit(&format!("Collapse to function {}", outcome.function), before);
                self.refresh_functions();
                self.goto_node(outcome.call_node);
                Ok(outcome)
            }
            Err(e) if e.is_precondition() => {
                tracing::debug!("Collapse skipped: {e}");
                Err(e)
            }
            Err(e) => {
                if e.after_mutation() {
                    self.roll_back(before);
                }
                tracing::error!("{e}");
                self.console.log(LogLevel::Error, e.to_string());
                Err(e)
            }
        }
    }

    /// Replace a call node with its function body
    pub fn expand_node(&mut self, node: NodeId) -> Result<ExpandOutcome, ExpandError> {
        let before = self.snapshot();
        match expand_call(&mut self.document, node, &self.settings) {
            Ok(outcome) => {
                self.commit(&format!("Expand {}", outcome.function), before);
                if let Some(&first) = outcome.node_map.values().next() {
                    self.goto_node(first);
                }
                Ok(outcome)
            }
            Err(e) if e.is_precondition() => {
                tracing::debug!("Expand skipped: {e}");
                Err(e)
            }
            Err(e) => {
                self.roll_back(before);
                tracing::error!("{e}");
                self.console.log_for_node(LogLevel::Error, e.to_string(), node);
                Err(e)
            }
        }
    }

    /// Undo the last refactoring
    pub fn undo(&mut self) -> Result<String, HistoryError> {
        let description = self.history.undo(&mut self.document)?;
        self.refresh_functions();
        tracing::info!("Undo: {description}");
        Ok(description)
    }

    /// Redo the last undone refactoring
    pub fn redo(&mut self) -> Result<String, HistoryError> {
        let description = self.history.redo(&mut self.document)?;
        self.refresh_functions();
        tracing::info!("Redo: {description}");
        Ok(description)
    }

    /// Validate the document and route the diagnostics to the console
    pub fn build(&mut self) -> BuildLog {
        let mut log = BuildLog::new();
        self.document.validate_and_build(&mut log);
        self.console.log_build(&log);
        if log.has_errors() {
            tracing::warn!("Build failed with {} messages", log.messages().len());
        } else {
            tracing::info!("Build succeeded");
        }
        log
    }

    /// Focus a node in the tab of whichever graph holds it
    pub fn goto_node(&mut self, node: NodeId) -> Option<&Focus> {
        let graph = self.document.graph_of(node)?.name.clone();
        self.focus = Some(Focus { graph, node });
        self.focus.as_ref()
    }

    /// Handle a clicked console link such as `{"goto_node":"7"}`
    pub fn meta_clicked(&mut self, meta: &str) -> bool {
        let value: serde_json::Value = match serde_json::from_str(meta) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Ignoring malformed link '{meta}': {e}");
                return false;
            }
        };
        let id = match &value["goto_node"] {
            serde_json::Value::String(s) => s.parse::<u64>().ok(),
            serde_json::Value::Number(n) => n.as_u64(),
            _ => None,
        };
        id.is_some_and(|id| self.goto_node(NodeId(id)).is_some())
    }

    /// Add an event node named `name` to the event graph.
    ///
    /// Arguments are given as `"name:Type"`. Does nothing if a function of
    /// that name already exists.
    pub fn add_callback(&mut self, name: &str, args: &[&str]) -> Result<Option<NodeId>, DocumentError> {
        if self.document.has_function(name) {
            return Ok(None);
        }

        let mut method = MethodInfo::new(name);
        for arg in args {
            let argument = match arg.split_once(':') {
                Some((arg_name, type_name)) => Argument::new(arg_name.trim(), PinType::from_name(type_name)),
                None => {
                    tracing::warn!("Callback argument '{arg}' has no type, using Any");
                    Argument::new(arg.trim(), PinType::Any)
                }
            };
            method = method.with_argument(argument);
        }

        let before = self.snapshot();
        let node = self.document.create_node(
            EVENT_GRAPH_NAME,
            NodeTemplate::Event,
            &NodeInitContext::for_method(method),
            None,
        )?;
        self.commit(&format!("Add callback {name}"), before);
        self.goto_node(node);
        Ok(Some(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::chain;
    use ordoplay_script_graph::NodeKind;

    fn view_over(document: Document) -> ScriptView {
        ScriptView::new(document, EditorSettings::default(), Console::new(None, 100))
    }

    #[test]
    fn test_collapse_is_one_undo_step() {
        let chain = chain();
        let before = chain.fixture.doc.to_ron_string().unwrap();
        let mut view = view_over(chain.fixture.doc);

        let outcome = view.collapse_selected_to_function(&[chain.b]).unwrap();
        assert_eq!(view.functions(), ["NewFunction"]);
        assert_eq!(view.focus().map(|f| f.node), Some(outcome.call_node));
        assert!(view.is_modified());

        view.undo().unwrap();
        assert_eq!(view.document().to_ron_string().unwrap(), before);
        assert!(view.functions().is_empty());

        view.redo().unwrap();
        assert!(view.document().has_function("NewFunction"));
    }

    #[test]
    fn test_legality_failure_reaches_console() {
        let chain = chain();
        let mut view = view_over(chain.fixture.doc);
        let root = {
            let registry = ordoplay_script_graph::library::create_script_registry();
            let node_type = registry.get("scene_root").unwrap();
            view.document
                .create_node(EVENT_GRAPH_NAME, NodeTemplate::Generic(node_type), &NodeInitContext::default(), None)
                .unwrap()
        };

        let err = view.collapse_selected_to_function(&[root]).unwrap_err();
        assert!(matches!(err, CollapseError::NotDuplicable(_)));
        assert_eq!(view.console().error_count(), 1);
        assert!(!view.history.can_undo());
    }

    #[test]
    fn test_empty_selection_is_silent() {
        let mut view = view_over(Document::new());
        assert!(view.collapse_selected_to_function(&[]).is_err());
        assert_eq!(view.console().error_count(), 0);
        assert!(!view.is_modified());
    }

    #[test]
    fn test_expand_round_trip_and_focus() {
        let chain = chain();
        let mut view = view_over(chain.fixture.doc);
        let outcome = view.collapse_selected_to_function(&[chain.b]).unwrap();

        let expanded = view.expand_node(outcome.call_node).unwrap();
        let copy = expanded.node_map[&chain.b];
        assert_eq!(view.focus().map(|f| f.node), Some(copy));
        assert_eq!(view.focus().map(|f| f.graph.as_str()), Some(EVENT_GRAPH_NAME));

        view.undo().unwrap();
        assert!(view.document().node(outcome.call_node).is_some());
    }

    #[test]
    fn test_meta_clicked_focuses_node() {
        let chain = chain();
        let mut view = view_over(chain.fixture.doc);
        assert!(view.meta_clicked(&format!(r#"{{"goto_node":"{}"}}"#, chain.c.0)));
        assert_eq!(view.focus().map(|f| f.node), Some(chain.c));
        assert!(!view.meta_clicked("not json"));
        assert!(!view.meta_clicked(r#"{"goto_node":"9999"}"#));
    }

    #[test]
    fn test_add_callback() {
        let mut view = view_over(Document::new());
        let node = view
            .add_callback("_on_body_entered", &["body:Object", "delta:float"])
            .unwrap()
            .unwrap();

        let node = view.document().node(node).unwrap();
        let NodeKind::Event { method } = &node.kind else {
            panic!("expected an event node");
        };
        assert_eq!(method.arguments[0], Argument::new("body", PinType::Object));
        assert_eq!(method.arguments[1].pin_type, PinType::Float);
        assert_eq!(node.outputs.len(), 3);
    }

    #[test]
    fn test_add_callback_skips_existing_function() {
        let mut view = view_over(Document::new());
        crate::synthesizer::create_new_function(&mut view.document, "Existing", true, &EditorSettings::default())
            .unwrap();
        assert_eq!(view.add_callback("Existing", &[]).unwrap(), None);
    }

    #[test]
    fn test_changes_are_tracked() {
        let chain = chain();
        let mut view = view_over(chain.fixture.doc);
        view.take_changes();

        let outcome = view.collapse_selected_to_function(&[chain.b]).unwrap();
        let changes = view.take_changes();
        assert!(changes.nodes.contains(&outcome.call_node));
        assert!(!changes.reloaded);

        view.undo().unwrap();
        assert!(view.take_changes().reloaded);
    }

    #[test]
    fn test_build_routes_messages() {
        let chain = chain();
        let mut view = view_over(chain.fixture.doc);
        let log = view.build();
        assert!(!log.has_errors());
        assert_eq!(view.console().entries.len(), log.messages().len());
    }
}
