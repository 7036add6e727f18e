//! Session model for a terminal multiplexer.
//!
//! This crate provides the workspace → window → tab → pane hierarchy, the
//! binary split trees inside tabs, and the startup sequence that decides
//! whether the default program is launched after the user's startup hook.
//! It is intentionally independent of the rendering, PTY and transport
//! layers so that it can be tested in isolation.

pub mod config;
pub mod error;
pub mod layout;
pub mod mux;
pub mod pane;
pub mod rect;
pub mod registry;
pub mod resize;
pub mod split;
pub mod startup;
pub mod tab;
pub mod window;
pub mod workspace;

pub use config::{SpawnOptions, SplitOptions, StartupConfig};
pub use error::{MuxError, MuxResult};
pub use layout::{Axis, PaneId, PaneNode, Side, SplitDirection};
pub use mux::Mux;
pub use registry::MuxRegistry;
pub use startup::{SpawnCommand, StartupCoordinator, StartupOutcome, StartupState};
pub use tab::TabId;
pub use window::WindowId;
