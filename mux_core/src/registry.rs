//! The registry owning every workspace, window, tab and pane.
//!
//! Entities refer to each other only by id; the registry is the single owner
//! and the only place ids are allocated. Ids come from per-kind monotonic
//! counters and are never reused, so a stale id held after a pane is
//! destroyed resolves to [`MuxError::NotFound`] instead of a different pane.
//!
//! Every mutation validates its inputs before touching any map, so a failed
//! call leaves the registry exactly as it was.

use std::collections::{BTreeMap, HashMap};

use log::{debug, info, warn};

use crate::config::{SpawnOptions, SplitOptions, StartupConfig};
use crate::error::{MuxError, MuxResult};
use crate::layout::PaneId;
use crate::pane::Pane;
use crate::rect::{Rect, Region, TermSize};
use crate::split;
use crate::tab::{Tab, TabId};
use crate::window::{Window, WindowId};
use crate::workspace::{DEFAULT_WORKSPACE, Workspace};

/// Process-wide catalog of multiplexer entities.
#[derive(Debug, Clone)]
pub struct MuxRegistry {
    panes: HashMap<PaneId, Pane>,
    tabs: HashMap<TabId, Tab>,
    windows: HashMap<WindowId, Window>,
    workspaces: BTreeMap<String, Workspace>,
    active_workspace: String,
    default_workspace: String,
    default_size: TermSize,
    next_pane_id: u64,
    next_tab_id: u64,
    next_window_id: u64,
    panes_created: u64,
}

impl Default for MuxRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MuxRegistry {
    /// Create an empty registry whose active workspace is `main`.
    pub fn new() -> Self {
        Self::with_defaults(DEFAULT_WORKSPACE, TermSize::default())
    }

    /// Create an empty registry using the startup configuration's defaults.
    pub fn from_config(config: &StartupConfig) -> Self {
        let name = if config.default_workspace.is_empty() {
            DEFAULT_WORKSPACE
        } else {
            config.default_workspace.as_str()
        };
        Self::with_defaults(name, config.initial_size)
    }

    fn with_defaults(workspace: &str, size: TermSize) -> Self {
        let mut workspaces = BTreeMap::new();
        workspaces.insert(workspace.to_string(), Workspace::new(workspace));
        Self {
            panes: HashMap::new(),
            tabs: HashMap::new(),
            windows: HashMap::new(),
            workspaces,
            active_workspace: workspace.to_string(),
            default_workspace: workspace.to_string(),
            default_size: size,
            next_pane_id: 0,
            next_tab_id: 0,
            next_window_id: 0,
            panes_created: 0,
        }
    }

    // --- creation ---

    /// Create a window holding one tab with one pane.
    ///
    /// The window joins `options.workspace` (the active workspace when
    /// absent), which is created on demand. The active workspace is not
    /// changed.
    pub fn spawn_window(&mut self, options: SpawnOptions) -> MuxResult<(TabId, PaneId, WindowId)> {
        let workspace = options.workspace.unwrap_or_else(|| self.active_workspace.clone());
        validate_workspace_name(&workspace)?;

        let window_id = self.alloc_window_id();
        let tab_id = self.alloc_tab_id();
        let pane_id = self.alloc_pane_id();

        self.insert_pane(Pane::new(pane_id, tab_id).with_cwd(options.cwd).with_args(options.args));
        self.tabs.insert(tab_id, Tab::new(tab_id, window_id, pane_id, self.default_size));
        self.windows.insert(window_id, Window::new(window_id, workspace.clone(), tab_id));
        self.workspaces
            .entry(workspace.clone())
            .or_insert_with(|| Workspace::new(workspace.clone()))
            .windows
            .insert(window_id);

        info!("Spawned window {window_id} (tab {tab_id}, pane {pane_id}) in workspace {workspace}");
        Ok((tab_id, pane_id, window_id))
    }

    /// Add a tab with one pane to an existing window and select it.
    ///
    /// The new tab shares the canvas size of the window's current tab.
    pub fn spawn_tab(
        &mut self,
        window_id: WindowId,
        options: SpawnOptions,
    ) -> MuxResult<(TabId, PaneId)> {
        let window = self.windows.get(&window_id).ok_or(MuxError::window(window_id))?;
        let size =
            self.tabs.get(&window.active_tab()).map(|t| t.size).unwrap_or(self.default_size);

        let tab_id = self.alloc_tab_id();
        let pane_id = self.alloc_pane_id();

        self.insert_pane(Pane::new(pane_id, tab_id).with_cwd(options.cwd).with_args(options.args));
        self.tabs.insert(tab_id, Tab::new(tab_id, window_id, pane_id, size));
        if let Some(window) = self.windows.get_mut(&window_id) {
            window.push_tab(tab_id);
        }

        debug!("Spawned tab {tab_id} (pane {pane_id}) in window {window_id}");
        Ok((tab_id, pane_id))
    }

    /// Split a live pane, returning the new pane, which becomes the tab's active pane.
    ///
    /// `options.size` is the share of the original pane's space given to the
    /// new pane.
    pub fn split_pane(&mut self, pane_id: PaneId, options: SplitOptions) -> MuxResult<PaneId> {
        let source = self.live_pane(pane_id)?;
        let tab_id = source.tab_id;
        let cwd = options.cwd.or_else(|| source.cwd.clone());
        split::validate_fraction(options.size)?;
        if !self.tabs.contains_key(&tab_id) {
            return Err(MuxError::tab(tab_id));
        }

        let new_id = self.alloc_pane_id();
        let tab = self.tabs.get_mut(&tab_id).ok_or(MuxError::tab(tab_id))?;
        tab.split(pane_id, new_id, options.direction, options.size)?;
        self.insert_pane(Pane::new(new_id, tab_id).with_cwd(cwd));

        Ok(new_id)
    }

    fn insert_pane(&mut self, pane: Pane) {
        self.panes.insert(pane.id, pane);
        self.panes_created += 1;
    }

    fn alloc_pane_id(&mut self) -> PaneId {
        let id = PaneId(self.next_pane_id);
        self.next_pane_id += 1;
        id
    }

    fn alloc_tab_id(&mut self) -> TabId {
        let id = TabId(self.next_tab_id);
        self.next_tab_id += 1;
        id
    }

    fn alloc_window_id(&mut self) -> WindowId {
        let id = WindowId(self.next_window_id);
        self.next_window_id += 1;
        id
    }

    // --- focus and workspaces ---

    /// Make `name` the active workspace. It must contain at least one window.
    pub fn set_active_workspace(&mut self, name: &str) -> MuxResult<()> {
        match self.workspaces.get(name) {
            Some(ws) if !ws.is_empty() => {
                info!("Active workspace is now {name}");
                self.active_workspace = name.to_string();
                Ok(())
            },
            _ => Err(MuxError::workspace(name)),
        }
    }

    /// Name of the active workspace.
    pub fn active_workspace(&self) -> &str {
        &self.active_workspace
    }

    /// Active pane of a tab.
    pub fn active_pane_of(&self, tab_id: TabId) -> MuxResult<PaneId> {
        self.tab(tab_id).map(Tab::active_pane).ok_or(MuxError::tab(tab_id))
    }

    /// Active tab of a window.
    pub fn active_tab_of(&self, window_id: WindowId) -> MuxResult<TabId> {
        self.window(window_id).map(Window::active_tab).ok_or(MuxError::window(window_id))
    }

    /// Select a tab within its window.
    pub fn set_active_tab(&mut self, window_id: WindowId, tab_id: TabId) -> MuxResult<()> {
        self.windows.get_mut(&window_id).ok_or(MuxError::window(window_id))?.set_active_tab(tab_id)
    }

    /// Focus a live pane, also selecting its tab within its window.
    pub fn set_active_pane(&mut self, pane_id: PaneId) -> MuxResult<()> {
        let (tab_id, window_id) = self.pane_owner(pane_id)?;
        self.live_pane(pane_id)?;
        self.tabs.get_mut(&tab_id).ok_or(MuxError::tab(tab_id))?.set_active_pane(pane_id)?;
        self.set_active_tab(window_id, tab_id)
    }

    /// Move a window to another workspace, creating it if needed.
    pub fn set_window_workspace(&mut self, window_id: WindowId, name: &str) -> MuxResult<()> {
        validate_workspace_name(name)?;
        let window = self.windows.get_mut(&window_id).ok_or(MuxError::window(window_id))?;
        let old = std::mem::replace(&mut window.workspace, name.to_string());
        if old == name {
            return Ok(());
        }

        self.workspaces
            .entry(name.to_string())
            .or_insert_with(|| Workspace::new(name))
            .windows
            .insert(window_id);
        self.detach_from_workspace(&old, window_id);

        debug!("Moved window {window_id} from workspace {old} to {name}");
        Ok(())
    }

    /// Rename a workspace, keeping its windows and its active status.
    pub fn rename_workspace(&mut self, old: &str, new: &str) -> MuxResult<()> {
        validate_workspace_name(new)?;
        if !self.workspaces.contains_key(old) {
            return Err(MuxError::workspace(old));
        }
        if old == new {
            return Ok(());
        }
        if self.workspaces.contains_key(new) {
            return Err(MuxError::InvalidArgument(format!("workspace \"{new}\" already exists")));
        }

        let Some(mut ws) = self.workspaces.remove(old) else {
            return Err(MuxError::workspace(old));
        };
        ws.name = new.to_string();
        for window_id in &ws.windows {
            if let Some(window) = self.windows.get_mut(window_id) {
                window.workspace = new.to_string();
            }
        }
        self.workspaces.insert(new.to_string(), ws);
        if self.active_workspace == old {
            self.active_workspace = new.to_string();
        }

        debug!("Renamed workspace {old} to {new}");
        Ok(())
    }

    fn detach_from_workspace(&mut self, name: &str, window_id: WindowId) {
        let now_empty = match self.workspaces.get_mut(name) {
            Some(ws) => {
                ws.windows.remove(&window_id);
                ws.is_empty()
            },
            None => false,
        };
        if now_empty {
            self.workspaces.remove(name);
            debug!("Dropped empty workspace {name}");
        }
        self.ensure_active_workspace();
    }

    /// Re-establish the active workspace if it no longer resolves.
    ///
    /// Falls back to the first workspace that still has windows, otherwise
    /// to an empty default workspace.
    fn ensure_active_workspace(&mut self) {
        if self.workspaces.contains_key(&self.active_workspace) {
            return;
        }
        let fallback = self
            .workspaces
            .values()
            .find(|ws| !ws.is_empty())
            .map(|ws| ws.name.clone())
            .unwrap_or_else(|| self.default_workspace.clone());
        self.workspaces
            .entry(fallback.clone())
            .or_insert_with(|| Workspace::new(fallback.clone()));
        info!("Active workspace {} is gone, falling back to {fallback}", self.active_workspace);
        self.active_workspace = fallback;
    }

    // --- geometry ---

    /// Set the canvas size of every tab in a window.
    ///
    /// Nothing is recomputed here; geometry queries derive sizes from the
    /// new canvas and the split ratios.
    pub fn resize_window(&mut self, window_id: WindowId, size: TermSize) -> MuxResult<()> {
        let window = self.windows.get(&window_id).ok_or(MuxError::window(window_id))?;
        for tab_id in window.tabs() {
            if let Some(tab) = self.tabs.get_mut(tab_id) {
                tab.size = size;
            }
        }
        Ok(())
    }

    /// Current size of a pane in cells.
    pub fn pane_size(&self, pane_id: PaneId) -> MuxResult<TermSize> {
        self.owning_tab(pane_id)?.pane_size(pane_id)
    }

    /// Fractional region of a pane within its tab's canvas.
    pub fn pane_region(&self, pane_id: PaneId) -> MuxResult<Region> {
        self.owning_tab(pane_id)?.root().region_of(pane_id).ok_or(MuxError::pane(pane_id))
    }

    /// Cell rectangles of every pane in a tab.
    pub fn pane_rects(&self, tab_id: TabId) -> MuxResult<HashMap<PaneId, Rect>> {
        self.tab(tab_id).map(Tab::pane_rects).ok_or(MuxError::tab(tab_id))
    }

    /// Pane under a cell of a tab's canvas, for routing mouse focus.
    pub fn pane_at(&self, tab_id: TabId, col: u16, row: u16) -> MuxResult<Option<PaneId>> {
        self.tab(tab_id).map(|tab| tab.pane_at(col, row)).ok_or(MuxError::tab(tab_id))
    }

    /// Grow (or, with a negative delta, shrink) a pane within its enclosing split.
    pub fn adjust_pane_size(&mut self, pane_id: PaneId, delta: f64) -> MuxResult<()> {
        let tab_id = self.live_pane(pane_id)?.tab_id;
        self.tabs.get_mut(&tab_id).ok_or(MuxError::tab(tab_id))?.adjust_pane_size(pane_id, delta)
    }

    // --- destruction ---

    /// Record that a pane's process has ended.
    ///
    /// Focus moves off the pane to another live pane of its tab, and the pane
    /// stays in the tree until [`MuxRegistry::prune_dead_panes`]. A tab left
    /// without any live pane is closed right away, so an active pane is
    /// always live.
    pub fn mark_pane_dead(&mut self, pane_id: PaneId) -> MuxResult<()> {
        let pane = self.panes.get_mut(&pane_id).ok_or(MuxError::pane(pane_id))?;
        pane.alive = false;
        let tab_id = pane.tab_id;
        debug!("Pane {pane_id} is dead");

        let tab = self.tabs.get(&tab_id).ok_or(MuxError::tab(tab_id))?;
        let is_active = tab.active_pane() == pane_id;
        let live =
            tab.pane_order().into_iter().find(|id| self.panes.get(id).is_some_and(|p| p.alive));
        match live {
            None => {
                info!("Closing tab {tab_id}, its last live pane {pane_id} died");
                self.remove_tab(tab_id)
            },
            Some(next) if is_active => {
                self.tabs.get_mut(&tab_id).ok_or(MuxError::tab(tab_id))?.set_active_pane(next)
            },
            Some(_) => Ok(()),
        }
    }

    /// Destroy every dead pane, along with any tab, window or workspace left empty.
    ///
    /// Returns the panes that are gone afterwards.
    pub fn prune_dead_panes(&mut self) -> Vec<PaneId> {
        let mut dead: Vec<PaneId> =
            self.panes.values().filter(|p| p.is_dead()).map(|p| p.id).collect();
        dead.sort();

        let mut pruned = Vec::with_capacity(dead.len());
        for pane_id in dead {
            // Already gone if its whole tab was dropped earlier in this pass.
            if !self.panes.contains_key(&pane_id) {
                pruned.push(pane_id);
                continue;
            }
            match self.remove_pane(pane_id) {
                Ok(()) => pruned.push(pane_id),
                Err(err) => warn!("Could not prune dead pane {pane_id}: {err}"),
            }
        }
        pruned
    }

    /// Destroy a pane. Removing a tab's last pane destroys the tab too.
    pub fn remove_pane(&mut self, pane_id: PaneId) -> MuxResult<()> {
        let tab_id = self.panes.get(&pane_id).ok_or(MuxError::pane(pane_id))?.tab_id;
        let tab = self.tabs.get_mut(&tab_id).ok_or(MuxError::tab(tab_id))?;
        if tab.remove_pane(pane_id)? {
            return self.remove_tab(tab_id);
        }
        self.panes.remove(&pane_id);
        debug!("Removed pane {pane_id} from tab {tab_id}");
        Ok(())
    }

    /// Destroy a tab and its panes. Removing a window's last tab destroys the window too.
    pub fn remove_tab(&mut self, tab_id: TabId) -> MuxResult<()> {
        let window_id = self.tabs.get(&tab_id).ok_or(MuxError::tab(tab_id))?.window_id;
        let window_empty = match self.windows.get_mut(&window_id) {
            Some(window) => window.remove_tab(tab_id)?,
            None => false,
        };
        self.drop_tab(tab_id);
        debug!("Removed tab {tab_id} from window {window_id}");

        if window_empty {
            self.remove_window(window_id)?;
        }
        Ok(())
    }

    /// Destroy a window with all its tabs and panes.
    pub fn remove_window(&mut self, window_id: WindowId) -> MuxResult<()> {
        let window = self.windows.remove(&window_id).ok_or(MuxError::window(window_id))?;
        for &tab_id in window.tabs() {
            self.drop_tab(tab_id);
        }
        self.detach_from_workspace(&window.workspace, window_id);
        info!("Removed window {window_id}");
        Ok(())
    }

    fn drop_tab(&mut self, tab_id: TabId) {
        if let Some(tab) = self.tabs.remove(&tab_id) {
            for pane_id in tab.pane_order() {
                self.panes.remove(&pane_id);
            }
        }
    }

    // --- lookups ---

    /// Look up a pane.
    pub fn pane(&self, pane_id: PaneId) -> Option<&Pane> {
        self.panes.get(&pane_id)
    }

    /// Look up a tab.
    pub fn tab(&self, tab_id: TabId) -> Option<&Tab> {
        self.tabs.get(&tab_id)
    }

    /// Look up a window.
    pub fn window(&self, window_id: WindowId) -> Option<&Window> {
        self.windows.get(&window_id)
    }

    /// Look up a workspace.
    pub fn workspace(&self, name: &str) -> Option<&Workspace> {
        self.workspaces.get(name)
    }

    /// All workspace names, sorted.
    pub fn workspace_names(&self) -> Vec<String> {
        self.workspaces.keys().cloned().collect()
    }

    /// Windows of a workspace; empty for an unknown name.
    pub fn windows_in_workspace(&self, name: &str) -> Vec<WindowId> {
        self.workspaces.get(name).map(|ws| ws.windows.iter().copied().collect()).unwrap_or_default()
    }

    /// Tabs of a window in display order.
    pub fn tabs_of(&self, window_id: WindowId) -> MuxResult<Vec<TabId>> {
        self.window(window_id).map(|w| w.tabs().to_vec()).ok_or(MuxError::window(window_id))
    }

    /// Panes of a tab in depth-first order.
    pub fn panes_of(&self, tab_id: TabId) -> MuxResult<Vec<PaneId>> {
        self.tab(tab_id).map(Tab::pane_order).ok_or(MuxError::tab(tab_id))
    }

    /// Tab and window holding a pane.
    pub fn pane_owner(&self, pane_id: PaneId) -> MuxResult<(TabId, WindowId)> {
        let tab = self.owning_tab(pane_id)?;
        Ok((tab.id, tab.window_id))
    }

    /// Number of registered panes.
    pub fn pane_count(&self) -> usize {
        self.panes.len()
    }

    /// Number of registered tabs.
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// Number of registered windows.
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Total number of registered panes, tabs, windows and workspaces.
    pub fn entity_count(&self) -> usize {
        self.panes.len() + self.tabs.len() + self.windows.len() + self.workspaces.len()
    }

    /// Number of panes ever created by this registry.
    ///
    /// Unlike [`MuxRegistry::pane_count`] this never goes down, so comparing
    /// two readings tells whether anything was created in between.
    pub fn panes_created(&self) -> u64 {
        self.panes_created
    }

    fn live_pane(&self, pane_id: PaneId) -> MuxResult<&Pane> {
        self.panes.get(&pane_id).filter(|p| p.alive).ok_or(MuxError::pane(pane_id))
    }

    fn owning_tab(&self, pane_id: PaneId) -> MuxResult<&Tab> {
        let tab_id = self.panes.get(&pane_id).ok_or(MuxError::pane(pane_id))?.tab_id;
        self.tabs.get(&tab_id).ok_or(MuxError::tab(tab_id))
    }

    /// Verify the cross references between entities.
    ///
    /// Returns a description of the first broken invariant.
    pub fn check_invariants(&self) -> Result<(), String> {
        if !self.workspaces.contains_key(&self.active_workspace) {
            return Err(format!("active workspace {} does not exist", self.active_workspace));
        }

        for tab in self.tabs.values() {
            let active = tab.active_pane();
            if !tab.contains(active) {
                return Err(format!("tab {}: active pane {active} is not in its tree", tab.id));
            }
            if !self.panes.get(&active).is_some_and(|p| p.alive) {
                return Err(format!("tab {}: active pane {active} is not live", tab.id));
            }
            for pane_id in tab.pane_order() {
                match self.panes.get(&pane_id) {
                    Some(pane) if pane.tab_id == tab.id => {},
                    _ => return Err(format!("tab {}: leaf {pane_id} is not registered", tab.id)),
                }
            }
            if let Some(ratio) = tab.root().ratios().into_iter().find(|r| !(*r > 0.0 && *r < 1.0))
            {
                return Err(format!("tab {}: degenerate split ratio {ratio}", tab.id));
            }
            match self.windows.get(&tab.window_id) {
                Some(window) if window.tabs().contains(&tab.id) => {},
                _ => return Err(format!("tab {}: not listed by window {}", tab.id, tab.window_id)),
            }
        }

        for pane in self.panes.values() {
            if !self.tabs.get(&pane.tab_id).is_some_and(|t| t.contains(pane.id)) {
                return Err(format!("pane {} is not a leaf of tab {}", pane.id, pane.tab_id));
            }
        }

        for window in self.windows.values() {
            if window.tabs().is_empty() || !window.tabs().contains(&window.active_tab()) {
                return Err(format!("window {}: bad active tab", window.id));
            }
            let listed = self
                .workspaces
                .get(&window.workspace)
                .is_some_and(|ws| ws.windows.contains(&window.id));
            if !listed {
                return Err(format!(
                    "window {}: not listed by workspace {}",
                    window.id, window.workspace
                ));
            }
        }

        Ok(())
    }
}

fn validate_workspace_name(name: &str) -> MuxResult<()> {
    if name.is_empty() {
        return Err(MuxError::InvalidArgument("workspace name must not be empty".into()));
    }
    Ok(())
}
