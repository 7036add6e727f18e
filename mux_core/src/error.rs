//! Error types for the multiplexer crate.

use std::fmt::Display;

use crate::layout::PaneId;
use crate::tab::TabId;
use crate::window::WindowId;

/// Errors that can occur in the multiplexer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MuxError {
    /// An id or workspace name does not resolve.
    #[error("not found: {0}")]
    NotFound(String),

    /// An argument was out of range or malformed (e.g. a split fraction of 1.0).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The startup hook raised an error, panicked or ran past its time cap.
    #[error("hook failure: {0}")]
    HookFailure(String),

    /// Configuration text could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl MuxError {
    /// A pane id that is unknown, dead or already destroyed.
    pub fn pane(id: PaneId) -> Self {
        Self::not_found("pane", id)
    }

    /// An unknown tab id.
    pub fn tab(id: TabId) -> Self {
        Self::not_found("tab", id)
    }

    /// An unknown window id.
    pub fn window(id: WindowId) -> Self {
        Self::not_found("window", id)
    }

    /// A workspace name with no windows in it.
    pub fn workspace(name: &str) -> Self {
        Self::not_found("workspace", format!("\"{name}\""))
    }

    /// Whether this is a [`MuxError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    fn not_found(kind: &str, what: impl Display) -> Self {
        Self::NotFound(format!("{kind} {what}"))
    }
}

/// Convenience type alias for multiplexer results.
pub type MuxResult<T> = Result<T, MuxError>;
