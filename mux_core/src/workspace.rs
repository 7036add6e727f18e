//! Workspaces: named groups of windows.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::window::WindowId;

/// Workspace used when nothing else has been chosen.
pub const DEFAULT_WORKSPACE: &str = "main";

/// A named set of windows. The name doubles as the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Workspace name.
    pub name: String,
    /// Windows belonging to this workspace.
    pub windows: BTreeSet<WindowId>,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), windows: BTreeSet::new() }
    }

    /// Whether no window belongs to this workspace.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
