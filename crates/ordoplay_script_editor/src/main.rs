// SPDX-License-Identifier: MIT OR Apache-2.0
//! `ordoplay_script` - command-line front end for the script view.
//!
//! Loads a RON script document, applies one refactoring or a build, and
//! writes the result back.

use clap::{Parser, Subcommand};
use ordoplay_script_editor::console::TracingEvent;
use ordoplay_script_editor::settings::SETTINGS_FILE_NAME;
use ordoplay_script_editor::{
    CollapseError, Console, EditorSettings, ExpandError, ScriptView, TracingBridge,
};
use ordoplay_script_graph::{Document, DocumentError, NodeId};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "ordoplay_script", version, about = "Refactor and build OrdoPlay script documents")]
struct Cli {
    /// Script document (RON)
    document: PathBuf,

    /// Settings file, defaults to `script_editor.ron` next to the document
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Write the result here instead of over the document
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty script document
    New,
    /// Collapse nodes into a new function
    Collapse {
        /// Comma-separated node ids
        #[arg(long, value_delimiter = ',', required = true)]
        nodes: Vec<u64>,
    },
    /// Replace a call node with its function body
    Expand {
        /// Call node id
        #[arg(long)]
        node: u64,
    },
    /// Validate the document
    Build,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Collapse(#[from] CollapseError),
    #[error(transparent)]
    Expand(#[from] ExpandError),
}

fn read_document(path: &Path) -> Result<Document, CliError> {
    let source = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Document::from_ron_str(&source)?)
}

fn write_document(doc: &Document, path: &Path) -> Result<(), CliError> {
    std::fs::write(path, doc.to_ron_string()?).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

fn run(cli: Cli, tracing_rx: mpsc::Receiver<TracingEvent>) -> Result<ExitCode, CliError> {
    let target = cli.out.clone().unwrap_or_else(|| cli.document.clone());
    if let Command::New = cli.command {
        write_document(&Document::new(), &target)?;
        return Ok(ExitCode::SUCCESS);
    }

    let settings_path = cli.settings.clone().unwrap_or_else(|| {
        cli.document
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(SETTINGS_FILE_NAME)
    });
    let settings = EditorSettings::load_or_default(&settings_path);
    let console = Console::new(Some(tracing_rx), settings.console_max_entries);
    let mut view = ScriptView::new(read_document(&cli.document)?, settings, console);

    let code = match cli.command {
        Command::New => ExitCode::SUCCESS,
        Command::Collapse { nodes } => {
            let selection: Vec<NodeId> = nodes.into_iter().map(NodeId).collect();
            let outcome = view.collapse_selected_to_function(&selection)?;
            println!(
                "Created function '{}' ({} parameters), call node {}",
                outcome.function, outcome.parameters, outcome.call_node
            );
            ExitCode::SUCCESS
        }
        Command::Expand { node } => {
            let outcome = view.expand_node(NodeId(node))?;
            println!(
                "Inlined '{}' as {} nodes, removed call node {}",
                outcome.function,
                outcome.node_map.len(),
                outcome.removed_call
            );
            ExitCode::SUCCESS
        }
        Command::Build => {
            let log = view.build();
            for entry in &view.console().entries {
                println!("[{}] {}", entry.level.name(), entry.message);
            }
            if log.has_errors() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    };

    view.console_mut().poll_tracing_events();
    let console = view.console();
    tracing::debug!(
        "{} warnings, {} errors logged",
        console.warn_count(),
        console.error_count()
    );

    if view.is_modified() {
        write_document(view.document(), &target)?;
        view.mark_saved();
    }
    Ok(code)
}

fn main() -> ExitCode {
    let (bridge_layer, tracing_rx) = TracingBridge::new();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("ordoplay_script_editor=info,ordoplay_script_graph=info")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(bridge_layer)
        .init();

    match run(Cli::parse(), tracing_rx) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
