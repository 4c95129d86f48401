// SPDX-License-Identifier: MIT OR Apache-2.0
//! Console log surface for script editing and build output.

use ordoplay_script_graph::{BuildLog, NodeId, Severity};
use std::collections::VecDeque;
use std::sync::mpsc;

/// A tracing event captured by the [`TracingBridge`] layer.
#[derive(Debug, Clone)]
pub struct TracingEvent {
    /// The log level.
    pub level: LogLevel,
    /// The formatted message.
    pub message: String,
    /// Optional target (module path).
    pub target: Option<String>,
}

/// A `tracing_subscriber::Layer` that forwards events over an `mpsc` channel
/// so the [`Console`] can display them.
pub struct TracingBridge {
    sender: mpsc::Sender<TracingEvent>,
}

impl TracingBridge {
    /// Create a new bridge and return `(layer, receiver)`.
    pub fn new() -> (Self, mpsc::Receiver<TracingEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl<S> tracing_subscriber::Layer<S> for TracingBridge
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let level = LogLevel::from(*event.metadata().level());

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let message = if visitor.message.is_empty() {
            "(empty)".to_string()
        } else {
            visitor.message
        };

        let _ = self.sender.send(TracingEvent {
            level,
            message,
            target: Some(event.metadata().target().to_string()),
        });
    }
}

/// Visitor that extracts the `message` field from a tracing event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl MessageVisitor {
    fn push(&mut self, name: &str, value: String) {
        if name == "message" {
            self.message = value;
        } else if self.message.is_empty() {
            self.message = format!("{name} = {value}");
        } else {
            self.message.push_str(&format!(", {name} = {value}"));
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.push(field.name(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.push(field.name(), value.to_string());
    }
}

/// Format a SystemTime as HH:MM:SS
fn format_system_time(time: &std::time::SystemTime) -> String {
    let secs = time
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{:02}:{:02}:{:02}", (secs / 3600) % 24, (secs / 60) % 60, secs % 60)
}

/// Log level for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Trace
    Trace,
    /// Debug
    Debug,
    /// Info
    Info,
    /// Warning
    Warn,
    /// Error
    Error,
}

impl LogLevel {
    /// Upper-case label
    pub fn name(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Self::Trace,
            tracing::Level::DEBUG => Self::Debug,
            tracing::Level::INFO => Self::Info,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::ERROR => Self::Error,
        }
    }
}

impl From<Severity> for LogLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Warning => Self::Warn,
            Severity::Error => Self::Error,
        }
    }
}

/// A log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Level
    pub level: LogLevel,
    /// Text
    pub message: String,
    /// HH:MM:SS of the latest occurrence
    pub timestamp: String,
    /// JSON link payload, e.g. `{"goto_node":"7"}`
    pub meta: Option<String>,
    /// Collapsed duplicate count
    pub count: u32,
}

/// Link payload that jumps to a node when clicked
pub fn goto_node_meta(node: NodeId) -> String {
    serde_json::json!({ "goto_node": node.0.to_string() }).to_string()
}

/// Buffered log output
pub struct Console {
    tracing_rx: Option<mpsc::Receiver<TracingEvent>>,
    /// Log entries
    pub entries: VecDeque<LogEntry>,
    /// Maximum entries to keep
    pub max_entries: usize,
    /// Collapse duplicate messages
    pub collapse_duplicates: bool,
    warn_count: usize,
    error_count: usize,
}

impl Console {
    /// Create a console wired to an optional tracing receiver.
    pub fn new(tracing_rx: Option<mpsc::Receiver<TracingEvent>>, max_entries: usize) -> Self {
        Self {
            tracing_rx,
            entries: VecDeque::new(),
            max_entries,
            collapse_duplicates: true,
            warn_count: 0,
            error_count: 0,
        }
    }

    /// Add a log entry
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.push(level, message.into(), None);
    }

    /// Add a log entry pointing at a node
    pub fn log_for_node(&mut self, level: LogLevel, message: impl Into<String>, node: NodeId) {
        self.push(level, message.into(), Some(goto_node_meta(node)));
    }

    /// Append build diagnostics, linking each to its node
    pub fn log_build(&mut self, log: &BuildLog) {
        for message in log.messages() {
            let meta = message.node.map(goto_node_meta);
            self.push(message.severity.into(), message.text.clone(), meta);
        }
    }

    fn push(&mut self, level: LogLevel, message: String, meta: Option<String>) {
        let now = std::time::SystemTime::now();

        match level {
            LogLevel::Warn => self.warn_count += 1,
            LogLevel::Error => self.error_count += 1,
            _ => {}
        }

        if self.collapse_duplicates {
            if let Some(last) = self.entries.back_mut() {
                if last.level == level && last.message == message && last.meta == meta {
                    last.count += 1;
                    last.timestamp = format_system_time(&now);
                    return;
                }
            }
        }

        self.entries.push_back(LogEntry {
            level,
            message,
            timestamp: format_system_time(&now),
            meta,
            count: 1,
        });

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Drain any pending tracing events into the log.
    pub fn poll_tracing_events(&mut self) {
        let Some(rx) = &self.tracing_rx else {
            return;
        };

        let events: Vec<TracingEvent> = rx.try_iter().collect();
        for event in events {
            let message = match &event.target {
                Some(target) => format!("[{target}] {}", event.message),
                None => event.message,
            };
            self.push(event.level, message, None);
        }
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.warn_count = 0;
        self.error_count = 0;
    }

    /// Warnings logged since the last clear
    pub fn warn_count(&self) -> usize {
        self.warn_count
    }

    /// Errors logged since the last clear
    pub fn error_count(&self) -> usize {
        self.error_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse() {
        let mut console = Console::new(None, 10);
        console.log(LogLevel::Warn, "same");
        console.log(LogLevel::Warn, "same");
        console.log(LogLevel::Info, "other");
        assert_eq!(console.entries.len(), 2);
        assert_eq!(console.entries[0].count, 2);
        assert_eq!(console.warn_count(), 2);
    }

    #[test]
    fn test_max_entries() {
        let mut console = Console::new(None, 3);
        for i in 0..5 {
            console.log(LogLevel::Info, format!("line {i}"));
        }
        assert_eq!(console.entries.len(), 3);
        assert_eq!(console.entries[0].message, "line 2");
    }

    #[test]
    fn test_build_messages_link_nodes() {
        let mut log = BuildLog::new();
        log.error(Some(NodeId(7)), "broken");
        log.warn(None, "dangling");
        let mut console = Console::new(None, 10);
        console.log_build(&log);

        assert_eq!(console.error_count(), 1);
        assert_eq!(console.entries[0].meta.as_deref(), Some(r#"{"goto_node":"7"}"#));
        assert!(console.entries[1].meta.is_none());
    }

    #[test]
    fn test_poll_tracing_events() {
        let (bridge, rx) = TracingBridge::new();
        let mut console = Console::new(Some(rx), 10);
        bridge
            .sender
            .send(TracingEvent {
                level: LogLevel::Error,
                message: "boom".to_string(),
                target: Some("collapse".to_string()),
            })
            .unwrap();

        console.poll_tracing_events();
        assert_eq!(console.entries[0].message, "[collapse] boom");
        assert_eq!(console.error_count(), 1);
    }
}
