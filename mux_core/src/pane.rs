//! Pane metadata.
//!
//! The terminal state and child process of a pane live with the process
//! management layer. This crate tracks ids, ownership and launch metadata
//! only; a pane's size is always derived from its tab's split tree.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::layout::PaneId;
use crate::tab::TabId;

/// Metadata for a single pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pane {
    /// Unique pane identifier.
    pub id: PaneId,
    /// Tab whose split tree holds this pane.
    pub tab_id: TabId,
    /// Starting directory for the pane's process, passed through untouched.
    pub cwd: Option<PathBuf>,
    /// Argument vector for the pane's process, passed through untouched.
    pub args: Option<Vec<String>>,
    /// Cleared once the pane's process has ended.
    pub alive: bool,
}

impl Pane {
    /// Create a live pane owned by `tab_id`.
    pub fn new(id: PaneId, tab_id: TabId) -> Self {
        Self { id, tab_id, cwd: None, args: None, alive: true }
    }

    /// Set the starting directory.
    pub fn with_cwd(mut self, cwd: Option<PathBuf>) -> Self {
        self.cwd = cwd;
        self
    }

    /// Set the argument vector.
    pub fn with_args(mut self, args: Option<Vec<String>>) -> Self {
        self.args = args;
        self
    }

    /// Whether the pane's process has ended.
    pub fn is_dead(&self) -> bool {
        !self.alive
    }
}
