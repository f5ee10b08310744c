//! Option structs for saving, loading and undo history.

use serde::{Deserialize, Serialize};

/// How a document is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOptions {
    /// Write bulk lists inline instead of into auxiliary binary files.
    pub force_xml: bool,
    /// Binary layout version. Version 0 stores float lists as `f32`.
    pub file_version: u32,
    /// Spaces per indentation level.
    pub indent_width: usize,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self::archive()
    }
}

impl SaveOptions {
    /// Project files: bulk data goes to side files.
    pub fn archive() -> Self {
        Self {
            force_xml: false,
            file_version: 1,
            indent_width: 4,
        }
    }

    /// Copy/paste fragments: everything inline, no side files.
    pub fn clipboard() -> Self {
        Self {
            force_xml: true,
            ..Self::archive()
        }
    }
}

/// How a document is read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Emit recoverable diagnostics as warnings rather than debug messages.
    pub verbose: bool,
}

impl LoadOptions {
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

/// Undo history settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoConfig {
    pub enabled: bool,
    /// Oldest commands are dropped beyond this depth.
    pub max_depth: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: 100,
        }
    }
}

impl UndoConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}
