//! Tabs: one split tree each, plus the focused pane.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MuxError, MuxResult};
use crate::layout::{PaneId, PaneNode, SplitDirection};
use crate::rect::{Rect, TermSize};
use crate::resize;
use crate::split;
use crate::window::WindowId;

/// Unique identifier for a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tab owning a pane tree.
///
/// A tab is never empty: it is created around its first pane and is
/// destroyed together with its last one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    /// Unique tab identifier.
    pub id: TabId,
    /// Window this tab is shown in.
    pub window_id: WindowId,
    /// Binary layout tree.
    root: PaneNode,
    /// Currently focused pane.
    active_pane: PaneId,
    /// Canvas size the tree is laid out on.
    pub size: TermSize,
}

impl Tab {
    /// Create a tab holding a single pane.
    pub fn new(id: TabId, window_id: WindowId, pane_id: PaneId, size: TermSize) -> Self {
        Self { id, window_id, root: PaneNode::leaf(pane_id), active_pane: pane_id, size }
    }

    /// Root of the split tree.
    pub fn root(&self) -> &PaneNode {
        &self.root
    }

    /// Currently focused pane, always a leaf of this tab's tree.
    pub fn active_pane(&self) -> PaneId {
        self.active_pane
    }

    /// Focus a pane of this tab.
    pub fn set_active_pane(&mut self, pane_id: PaneId) -> MuxResult<()> {
        if !self.root.contains(pane_id) {
            return Err(MuxError::pane(pane_id));
        }
        self.active_pane = pane_id;
        Ok(())
    }

    /// Whether the pane is a leaf of this tab.
    pub fn contains(&self, pane_id: PaneId) -> bool {
        self.root.contains(pane_id)
    }

    /// Split `target`, giving `fraction` of its space to `new_id`, and focus the new pane.
    pub fn split(
        &mut self,
        target: PaneId,
        new_id: PaneId,
        direction: SplitDirection,
        fraction: f64,
    ) -> MuxResult<()> {
        split::split_pane(&mut self.root, target, direction, fraction, new_id)?;
        self.active_pane = new_id;
        Ok(())
    }

    /// Remove a pane. Returns `true` if the tab is now empty.
    ///
    /// An empty tab keeps its old tree and must be discarded by the caller.
    pub fn remove_pane(&mut self, pane_id: PaneId) -> MuxResult<bool> {
        if !self.root.contains(pane_id) {
            return Err(MuxError::pane(pane_id));
        }

        let root = std::mem::replace(&mut self.root, PaneNode::leaf(pane_id));
        match split::remove_pane(root, pane_id)? {
            Some(remaining) => {
                self.root = remaining;
                if self.active_pane == pane_id {
                    self.active_pane = self.pane_order()[0];
                }
                Ok(false)
            },
            None => Ok(true),
        }
    }

    /// Move the boundary around `pane_id` by `delta` of the enclosing split.
    pub fn adjust_pane_size(&mut self, pane_id: PaneId, delta: f64) -> MuxResult<()> {
        resize::adjust_ratio(&mut self.root, pane_id, delta)
    }

    /// Ordered list of pane ids (depth-first).
    pub fn pane_order(&self) -> Vec<PaneId> {
        self.root.pane_ids()
    }

    /// Focus the next pane in order (wraps around).
    pub fn next_pane(&mut self) {
        let order = self.pane_order();
        self.active_pane = cycle_next(&order, self.active_pane);
    }

    /// Focus the previous pane in order (wraps around).
    pub fn prev_pane(&mut self) {
        let order = self.pane_order();
        self.active_pane = cycle_prev(&order, self.active_pane);
    }

    /// Cell rectangles of all panes on the current canvas.
    pub fn pane_rects(&self) -> HashMap<PaneId, Rect> {
        self.root.rects(Rect::from_size(self.size))
    }

    /// Pane covering the cell at `col`, `row`.
    pub fn pane_at(&self, col: u16, row: u16) -> Option<PaneId> {
        self.pane_rects().into_iter().find(|(_, rect)| rect.contains(col, row)).map(|(id, _)| id)
    }

    /// Size in cells of one pane on the current canvas.
    pub fn pane_size(&self, pane_id: PaneId) -> MuxResult<TermSize> {
        self.pane_rects().get(&pane_id).map(Rect::size).ok_or(MuxError::pane(pane_id))
    }
}

pub(crate) fn cycle_next<T: Copy + PartialEq>(order: &[T], current: T) -> T {
    let pos = order.iter().position(|&id| id == current).unwrap_or(0);
    order[(pos + 1) % order.len()]
}

pub(crate) fn cycle_prev<T: Copy + PartialEq>(order: &[T], current: T) -> T {
    let pos = order.iter().position(|&id| id == current).unwrap_or(0);
    let prev = if pos == 0 { order.len() - 1 } else { pos - 1 };
    order[prev]
}
