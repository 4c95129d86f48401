// SPDX-License-Identifier: MIT OR Apache-2.0
//! Script editor settings.
//!
//! Stored as RON next to the project. Missing fields fall back to their
//! defaults so older settings files keep loading.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "script_editor.ron";

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// File could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Layout and behaviour knobs for the script view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Base name for functions created by collapsing
    pub function_name_prefix: String,
    /// Horizontal distance of a freshly spawned result marker from the entry
    pub result_spawn_offset: f32,
    /// Horizontal distance between a boundary marker and the node it wires to
    pub marker_offset: f32,
    /// Whether inlining a call replays the call node's external wires onto the body
    pub replay_external_wiring: bool,
    /// Maximum undo history depth
    pub history_depth: usize,
    /// Maximum console entries kept
    pub console_max_entries: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            function_name_prefix: "NewFunction".to_string(),
            result_spawn_offset: 300.0,
            marker_offset: 250.0,
            replay_external_wiring: true,
            history_depth: 100,
            console_max_entries: 1000,
        }
    }
}

impl EditorSettings {
    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&content)?)
    }

    /// Load settings, falling back to defaults when the file is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!("Ignoring settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
