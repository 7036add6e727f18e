//! Shared handle to the registry.
//!
//! The registry is process-wide state reachable from the startup hook and
//! from any later event handler. [`Mux`] puts it behind one registry-wide
//! read/write lock: every structural mutation runs under the write lock for
//! its whole duration, because a single spawn or split touches several
//! entities' cross references at once. Lookups share the read lock.
//!
//! The lock is taken and released inside each call, so a handle can be
//! moved into async code freely; it is never held across an `.await`.
//!
//! Each handle family also counts the panes created through it. A
//! [`Mux::tracked`] handle starts a new family sharing the same registry,
//! which is how the startup sequence tells the hook's own panes apart from
//! panes spawned concurrently by other handlers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::config::{SpawnOptions, SplitOptions, StartupConfig};
use crate::error::MuxResult;
use crate::layout::PaneId;
use crate::rect::{Rect, Region, TermSize};
use crate::registry::MuxRegistry;
use crate::tab::TabId;
use crate::window::WindowId;

/// Cloneable, thread-safe handle to a [`MuxRegistry`].
///
/// Clones share both the registry and the count of panes created through them.
#[derive(Debug, Clone, Default)]
pub struct Mux {
    inner: Arc<RwLock<MuxRegistry>>,
    created: Arc<AtomicU64>,
}

impl Mux {
    /// Wrap a registry.
    pub fn new(registry: MuxRegistry) -> Self {
        Self { inner: Arc::new(RwLock::new(registry)), created: Arc::default() }
    }

    /// Create a handle to an empty registry built from the startup configuration.
    pub fn from_config(config: &StartupConfig) -> Self {
        Self::new(MuxRegistry::from_config(config))
    }

    /// A handle to the same registry whose pane count starts from zero.
    pub fn tracked(&self) -> Self {
        Self { inner: Arc::clone(&self.inner), created: Arc::default() }
    }

    /// Panes created through this handle and its clones.
    pub fn panes_created_by_handle(&self) -> u64 {
        self.created.load(Ordering::Acquire)
    }

    /// Run `f` under the shared read lock.
    pub fn read<R>(&self, f: impl FnOnce(&MuxRegistry) -> R) -> R {
        f(&*self.inner.read())
    }

    /// Run `f` under the exclusive write lock.
    ///
    /// Use this to make several mutations appear as one to other handles.
    pub fn write<R>(&self, f: impl FnOnce(&mut MuxRegistry) -> R) -> R {
        let mut registry = self.inner.write();
        let before = registry.panes_created();
        let result = f(&mut *registry);
        let created = registry.panes_created().saturating_sub(before);
        if created > 0 {
            self.created.fetch_add(created, Ordering::Release);
        }
        result
    }

    /// See [`MuxRegistry::spawn_window`].
    pub fn spawn_window(&self, options: SpawnOptions) -> MuxResult<(TabId, PaneId, WindowId)> {
        self.write(|mux| mux.spawn_window(options))
    }

    /// See [`MuxRegistry::spawn_tab`].
    pub fn spawn_tab(
        &self,
        window_id: WindowId,
        options: SpawnOptions,
    ) -> MuxResult<(TabId, PaneId)> {
        self.write(|mux| mux.spawn_tab(window_id, options))
    }

    /// See [`MuxRegistry::split_pane`].
    pub fn split_pane(&self, pane_id: PaneId, options: SplitOptions) -> MuxResult<PaneId> {
        self.write(|mux| mux.split_pane(pane_id, options))
    }

    /// See [`MuxRegistry::set_active_workspace`].
    pub fn set_active_workspace(&self, name: &str) -> MuxResult<()> {
        self.write(|mux| mux.set_active_workspace(name))
    }

    /// Name of the active workspace.
    pub fn active_workspace(&self) -> String {
        self.read(|mux| mux.active_workspace().to_string())
    }

    /// See [`MuxRegistry::active_pane_of`].
    pub fn active_pane_of(&self, tab_id: TabId) -> MuxResult<PaneId> {
        self.read(|mux| mux.active_pane_of(tab_id))
    }

    /// See [`MuxRegistry::active_tab_of`].
    pub fn active_tab_of(&self, window_id: WindowId) -> MuxResult<TabId> {
        self.read(|mux| mux.active_tab_of(window_id))
    }

    /// See [`MuxRegistry::set_active_tab`].
    pub fn set_active_tab(&self, window_id: WindowId, tab_id: TabId) -> MuxResult<()> {
        self.write(|mux| mux.set_active_tab(window_id, tab_id))
    }

    /// See [`MuxRegistry::set_active_pane`].
    pub fn set_active_pane(&self, pane_id: PaneId) -> MuxResult<()> {
        self.write(|mux| mux.set_active_pane(pane_id))
    }

    /// See [`MuxRegistry::set_window_workspace`].
    pub fn set_window_workspace(&self, window_id: WindowId, name: &str) -> MuxResult<()> {
        self.write(|mux| mux.set_window_workspace(window_id, name))
    }

    /// See [`MuxRegistry::rename_workspace`].
    pub fn rename_workspace(&self, old: &str, new: &str) -> MuxResult<()> {
        self.write(|mux| mux.rename_workspace(old, new))
    }

    /// See [`MuxRegistry::resize_window`].
    pub fn resize_window(&self, window_id: WindowId, size: TermSize) -> MuxResult<()> {
        self.write(|mux| mux.resize_window(window_id, size))
    }

    /// See [`MuxRegistry::adjust_pane_size`].
    pub fn adjust_pane_size(&self, pane_id: PaneId, delta: f64) -> MuxResult<()> {
        self.write(|mux| mux.adjust_pane_size(pane_id, delta))
    }

    /// See [`MuxRegistry::pane_size`].
    pub fn pane_size(&self, pane_id: PaneId) -> MuxResult<TermSize> {
        self.read(|mux| mux.pane_size(pane_id))
    }

    /// See [`MuxRegistry::pane_region`].
    pub fn pane_region(&self, pane_id: PaneId) -> MuxResult<Region> {
        self.read(|mux| mux.pane_region(pane_id))
    }

    /// See [`MuxRegistry::pane_rects`].
    pub fn pane_rects(&self, tab_id: TabId) -> MuxResult<HashMap<PaneId, Rect>> {
        self.read(|mux| mux.pane_rects(tab_id))
    }

    /// See [`MuxRegistry::pane_at`].
    pub fn pane_at(&self, tab_id: TabId, col: u16, row: u16) -> MuxResult<Option<PaneId>> {
        self.read(|mux| mux.pane_at(tab_id, col, row))
    }

    /// See [`MuxRegistry::mark_pane_dead`].
    pub fn mark_pane_dead(&self, pane_id: PaneId) -> MuxResult<()> {
        self.write(|mux| mux.mark_pane_dead(pane_id))
    }

    /// See [`MuxRegistry::prune_dead_panes`].
    pub fn prune_dead_panes(&self) -> Vec<PaneId> {
        self.write(MuxRegistry::prune_dead_panes)
    }

    /// See [`MuxRegistry::remove_pane`].
    pub fn remove_pane(&self, pane_id: PaneId) -> MuxResult<()> {
        self.write(|mux| mux.remove_pane(pane_id))
    }

    /// See [`MuxRegistry::remove_window`].
    pub fn remove_window(&self, window_id: WindowId) -> MuxResult<()> {
        self.write(|mux| mux.remove_window(window_id))
    }

    /// Windows of a workspace.
    pub fn windows_in_workspace(&self, name: &str) -> Vec<WindowId> {
        self.read(|mux| mux.windows_in_workspace(name))
    }

    /// All workspace names, sorted.
    pub fn workspace_names(&self) -> Vec<String> {
        self.read(MuxRegistry::workspace_names)
    }

    /// See [`MuxRegistry::panes_created`].
    pub fn panes_created(&self) -> u64 {
        self.read(MuxRegistry::panes_created)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::layout::SplitDirection;

    #[test]
    fn clones_share_one_registry() {
        let mux = Mux::default();
        let other = mux.clone();
        let (tab, pane, _) = other.spawn_window(SpawnOptions::default()).unwrap();
        assert_eq!(mux.active_pane_of(tab).unwrap(), pane);
        assert_eq!(mux.panes_created(), 1);
    }

    #[test]
    fn tracked_handle_counts_its_own_panes() {
        let mux = Mux::default();
        let tracked = mux.tracked();
        let clone = tracked.clone();

        mux.spawn_window(SpawnOptions::default()).unwrap();
        let (_, pane, _) = clone.spawn_window(SpawnOptions::default()).unwrap();
        tracked
            .write(|reg| reg.split_pane(pane, SplitOptions::new(SplitDirection::Left, 0.5)))
            .unwrap();
        assert!(tracked.split_pane(PaneId(99), SplitOptions::default()).is_err());

        assert_eq!(tracked.panes_created_by_handle(), 2);
        assert_eq!(mux.panes_created_by_handle(), 1);
        assert_eq!(mux.panes_created(), 3);
    }

    #[test]
    fn write_groups_mutations() {
        let mux = Mux::default();
        let (tab, panes) = mux.write(|reg| {
            let (tab, pane, _) = reg.spawn_window(SpawnOptions::default())?;
            let second = reg.split_pane(pane, SplitOptions::new(SplitDirection::Bottom, 0.5))?;
            MuxResult::Ok((tab, vec![pane, second]))
        })
        .unwrap();
        assert_eq!(mux.read(|reg| reg.panes_of(tab)).unwrap(), panes);
    }

    #[test]
    fn concurrent_mutations_keep_invariants() {
        let mux = Mux::default();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let mux = mux.clone();
                thread::spawn(move || {
                    let workspace = format!("ws{}", i % 3);
                    let (_, mut pane, _) =
                        mux.spawn_window(SpawnOptions::in_workspace(workspace)).unwrap();
                    for _ in 0..10 {
                        pane = mux.split_pane(pane, SplitOptions::default()).unwrap();
                        mux.read(|reg| reg.check_invariants()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(mux.panes_created(), 8 * 11);
        assert_eq!(mux.read(MuxRegistry::window_count), 8);
        mux.read(|reg| reg.check_invariants()).unwrap();
    }
}
