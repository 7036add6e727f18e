//! Configuration consumed by the registry and the startup sequence.
//!
//! Per-call options arrive from the scripting host as loosely typed tables,
//! so they are deserialized from [`serde_json::Value`]. Unknown fields are
//! ignored to stay compatible with richer host configurations.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MuxError, MuxResult};
use crate::layout::SplitDirection;
use crate::rect::TermSize;
use crate::workspace::DEFAULT_WORKSPACE;

/// Options for spawning a window or tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnOptions {
    /// Target workspace; the active one when absent. Ignored for tabs.
    pub workspace: Option<String>,
    /// Starting directory for the pane's process.
    pub cwd: Option<PathBuf>,
    /// Argument vector for the pane's process.
    pub args: Option<Vec<String>>,
}

impl SpawnOptions {
    /// Options targeting the named workspace.
    pub fn in_workspace(name: impl Into<String>) -> Self {
        Self { workspace: Some(name.into()), ..Self::default() }
    }

    /// Build from a host table. `null` means all defaults.
    pub fn from_value(value: Value) -> MuxResult<Self> {
        from_host_value(value, "spawn")
    }
}

/// Options for splitting a pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitOptions {
    /// Side of the original pane the new pane is placed on.
    pub direction: SplitDirection,
    /// Share of the original pane's space given to the new pane.
    pub size: f64,
    /// Starting directory for the new pane; inherited from the original pane when absent.
    pub cwd: Option<PathBuf>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self { direction: SplitDirection::Right, size: 0.5, cwd: None }
    }
}

impl SplitOptions {
    /// Split in `direction` giving `size` to the new pane.
    pub fn new(direction: SplitDirection, size: f64) -> Self {
        Self { direction, size, cwd: None }
    }

    /// Build from a host table. `null` means all defaults.
    pub fn from_value(value: Value) -> MuxResult<Self> {
        from_host_value(value, "split")
    }
}

fn from_host_value<T>(value: Value, what: &str) -> MuxResult<T>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value)
        .map_err(|e| MuxError::InvalidArgument(format!("bad {what} options: {e}")))
}

/// Startup behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    /// Workspace the registry starts out with.
    pub default_workspace: String,
    /// Program run in the default window; the host's default shell when absent.
    pub default_prog: Option<Vec<String>>,
    /// Starting directory of the default window.
    pub default_cwd: Option<PathBuf>,
    /// Upper bound on how long the startup hook may run, in milliseconds.
    pub hook_timeout_ms: Option<u64>,
    /// Canvas size given to new tabs until the first resize.
    pub initial_size: TermSize,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            default_workspace: DEFAULT_WORKSPACE.into(),
            default_prog: None,
            default_cwd: None,
            hook_timeout_ms: None,
            initial_size: TermSize::default(),
        }
    }
}

impl StartupConfig {
    /// Parse from TOML text.
    pub fn from_toml(text: &str) -> MuxResult<Self> {
        toml::from_str(text).map_err(|e| MuxError::Config(e.to_string()))
    }

    /// Hook time cap, if one is configured.
    pub fn hook_timeout(&self) -> Option<Duration> {
        self.hook_timeout_ms.map(Duration::from_millis)
    }
}
