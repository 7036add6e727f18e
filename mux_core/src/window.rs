//! Windows: an ordered list of tabs within a workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MuxError, MuxResult};
use crate::tab::{TabId, cycle_next, cycle_prev};

/// Unique identifier for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A multiplexer window holding tabs by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Unique window identifier.
    pub id: WindowId,
    /// Name of the workspace this window belongs to.
    pub workspace: String,
    /// Tabs in display order.
    tabs: Vec<TabId>,
    /// Currently selected tab.
    active_tab: TabId,
}

impl Window {
    /// Create a window around its first tab.
    pub fn new(id: WindowId, workspace: impl Into<String>, first_tab: TabId) -> Self {
        Self { id, workspace: workspace.into(), tabs: vec![first_tab], active_tab: first_tab }
    }

    /// Tabs in display order.
    pub fn tabs(&self) -> &[TabId] {
        &self.tabs
    }

    /// Currently selected tab.
    pub fn active_tab(&self) -> TabId {
        self.active_tab
    }

    /// Index of the selected tab in display order.
    pub fn active_tab_index(&self) -> usize {
        self.tabs.iter().position(|&t| t == self.active_tab).unwrap_or(0)
    }

    /// Append a tab and select it.
    pub fn push_tab(&mut self, tab: TabId) {
        self.tabs.push(tab);
        self.active_tab = tab;
    }

    /// Select a tab of this window.
    pub fn set_active_tab(&mut self, tab: TabId) -> MuxResult<()> {
        if !self.tabs.contains(&tab) {
            return Err(MuxError::tab(tab));
        }
        self.active_tab = tab;
        Ok(())
    }

    /// Select the tab at `idx` in display order.
    pub fn set_active_tab_index(&mut self, idx: usize) -> MuxResult<()> {
        let tab = *self
            .tabs
            .get(idx)
            .ok_or_else(|| MuxError::NotFound(format!("tab index {idx} in window {}", self.id)))?;
        self.active_tab = tab;
        Ok(())
    }

    /// Remove a tab. Returns `true` if the window has no tabs left.
    ///
    /// Selection moves to the tab that took the removed one's place, or the
    /// new last tab.
    pub fn remove_tab(&mut self, tab: TabId) -> MuxResult<bool> {
        let idx = self.tabs.iter().position(|&t| t == tab).ok_or(MuxError::tab(tab))?;
        self.tabs.remove(idx);
        if self.tabs.is_empty() {
            return Ok(true);
        }
        if self.active_tab == tab {
            self.active_tab = self.tabs[idx.min(self.tabs.len() - 1)];
        }
        Ok(false)
    }

    /// Select the next tab (wraps around).
    pub fn next_tab(&mut self) {
        self.active_tab = cycle_next(&self.tabs, self.active_tab);
    }

    /// Select the previous tab (wraps around).
    pub fn prev_tab(&mut self) {
        self.active_tab = cycle_prev(&self.tabs, self.active_tab);
    }
}
