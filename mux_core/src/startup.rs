//! Startup sequence: run the user's startup hook, then decide whether the
//! default program still needs a window.
//!
//! The sequence is a linear state machine:
//!
//! ```text
//! Init -> HookRan -> SkipDefault
//!                 \-> SpawnDefault
//! ```
//!
//! The hook runs to completion, including any suspension points, before the
//! registry is inspected. It gets a [`Mux::tracked`] handle, and whether it
//! created panes is decided from a single reading of that handle's count
//! taken after it finished. The decision never races with the hook's own
//! continuations, and panes other handlers spawn meanwhile are not counted.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{SpawnOptions, StartupConfig};
use crate::error::{MuxError, MuxResult};
use crate::layout::PaneId;
use crate::mux::Mux;
use crate::tab::TabId;
use crate::window::WindowId;

/// Name of the lifecycle event the startup hook is registered for.
pub const STARTUP_EVENT: &str = "startup";

/// Where the startup sequence currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StartupState {
    /// Nothing has run yet.
    Init,
    /// The hook finished (or failed); the spawn decision is pending.
    HookRan,
    /// The hook created panes and no program was requested explicitly.
    SkipDefault,
    /// A window running the default or requested program was spawned.
    SpawnDefault,
}

impl StartupState {
    /// Whether the sequence has reached one of its final states.
    pub fn is_terminal(self) -> bool {
        matches!(self, StartupState::SkipDefault | StartupState::SpawnDefault)
    }
}

/// A program requested on the invoking command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnCommand {
    /// Argument vector; the default shell when absent.
    pub args: Option<Vec<String>>,
    /// Starting directory.
    pub cwd: Option<PathBuf>,
}

impl SpawnCommand {
    /// Run the given argument vector.
    pub fn program<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { args: Some(args.into_iter().map(Into::into).collect()), cwd: None }
    }
}

/// Starts the actual process for a pane.
pub trait ProcessLauncher: Send + Sync {
    /// Launch `command` as the process of `pane_id`.
    fn launch(&self, pane_id: PaneId, command: &SpawnCommand) -> MuxResult<()>;
}

/// Launcher that only records the request in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLauncher;

impl ProcessLauncher for LogLauncher {
    fn launch(&self, pane_id: PaneId, command: &SpawnCommand) -> MuxResult<()> {
        info!("Pane {pane_id} should run {:?} in {:?}", command.args, command.cwd);
        Ok(())
    }
}

/// Receives failures of lifecycle hooks for the invoking command.
pub trait Diagnostics: Send + Sync {
    /// Report that the hook for `event` failed.
    fn report(&self, event: &str, error: &MuxError);
}

/// Diagnostics sink writing to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&self, event: &str, error: &MuxError) {
        error!("The {event} hook failed: {error}");
    }
}

/// Result of a completed startup sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct StartupOutcome {
    /// Final state, always terminal.
    pub state: StartupState,
    /// Whether the hook finished successfully after creating at least one pane.
    pub hook_created_panes: bool,
    /// Failure of the hook, if any. Already reported to diagnostics.
    pub hook_error: Option<MuxError>,
    /// The window spawned for the default program.
    pub default_window: Option<(TabId, PaneId, WindowId)>,
}

/// Drives the startup sequence against a shared registry.
pub struct StartupCoordinator {
    mux: Mux,
    config: StartupConfig,
    launcher: Arc<dyn ProcessLauncher>,
    diagnostics: Arc<dyn Diagnostics>,
    state: StartupState,
}

impl StartupCoordinator {
    /// Create a coordinator logging launches and hook failures.
    pub fn new(mux: Mux, config: StartupConfig) -> Self {
        Self {
            mux,
            config,
            launcher: Arc::new(LogLauncher),
            diagnostics: Arc::new(LogDiagnostics),
            state: StartupState::Init,
        }
    }

    /// Use `launcher` to start the default program.
    pub fn with_launcher(mut self, launcher: Arc<dyn ProcessLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    /// Send hook failures to `diagnostics`.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Current state.
    pub fn state(&self) -> StartupState {
        self.state
    }

    /// Run the startup hook, then spawn the default program if still needed.
    ///
    /// The hook receives a handle to the registry and runs on its own task.
    /// An error, a panic or running past the configured time cap counts as a
    /// hook failure: it is reported to diagnostics and the sequence continues
    /// as if the hook had created nothing. An `explicit` program is always
    /// spawned, whatever the hook did.
    pub async fn run<F, Fut>(
        mut self,
        hook: F,
        explicit: Option<SpawnCommand>,
    ) -> MuxResult<StartupOutcome>
    where
        F: FnOnce(Mux) -> Fut,
        Fut: Future<Output = MuxResult<()>> + Send + 'static,
    {
        let handle = self.mux.tracked();
        info!("Running {STARTUP_EVENT} hook");
        let hook_error = self.invoke(hook, handle.clone()).await.err();
        self.finish(handle.panes_created_by_handle(), hook_error, explicit)
    }

    /// Run the sequence when no startup hook is registered.
    pub fn run_without_hook(mut self, explicit: Option<SpawnCommand>) -> MuxResult<StartupOutcome> {
        self.finish(0, None, explicit)
    }

    async fn invoke<F, Fut>(&self, hook: F, handle: Mux) -> MuxResult<()>
    where
        F: FnOnce(Mux) -> Fut,
        Fut: Future<Output = MuxResult<()>> + Send + 'static,
    {
        let task = tokio::spawn(hook(handle));
        let joined = match self.config.hook_timeout() {
            Some(limit) => {
                let abort = task.abort_handle();
                match tokio::time::timeout(limit, task).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        abort.abort();
                        return Err(MuxError::HookFailure(format!(
                            "{STARTUP_EVENT} hook did not finish within {limit:?}"
                        )));
                    },
                }
            },
            None => task.await,
        };

        match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(MuxError::HookFailure(err.to_string())),
            Err(err) if err.is_panic() => {
                Err(MuxError::HookFailure(format!("{STARTUP_EVENT} hook panicked")))
            },
            Err(err) => Err(MuxError::HookFailure(err.to_string())),
        }
    }

    fn finish(
        &mut self,
        hook_panes: u64,
        hook_error: Option<MuxError>,
        explicit: Option<SpawnCommand>,
    ) -> MuxResult<StartupOutcome> {
        self.transition(StartupState::HookRan);

        if let Some(err) = &hook_error {
            warn!("Ignoring panes from the failed {STARTUP_EVENT} hook");
            self.diagnostics.report(STARTUP_EVENT, err);
        }
        let hook_created_panes = hook_error.is_none() && hook_panes > 0;

        if hook_created_panes && explicit.is_none() {
            self.transition(StartupState::SkipDefault);
            info!("Startup hook created panes, not spawning the default program");
            return Ok(StartupOutcome {
                state: self.state,
                hook_created_panes,
                hook_error,
                default_window: None,
            });
        }

        self.transition(StartupState::SpawnDefault);
        let command = self.default_command(explicit);
        let options = SpawnOptions {
            workspace: None,
            cwd: command.cwd.clone(),
            args: command.args.clone(),
        };
        let ids = self.mux.spawn_window(options)?;
        self.launcher.launch(ids.1, &command)?;

        Ok(StartupOutcome {
            state: self.state,
            hook_created_panes,
            hook_error,
            default_window: Some(ids),
        })
    }

    fn default_command(&self, explicit: Option<SpawnCommand>) -> SpawnCommand {
        let mut command = explicit.unwrap_or_else(|| SpawnCommand {
            args: self.config.default_prog.clone(),
            cwd: None,
        });
        if command.cwd.is_none() {
            command.cwd = self.config.default_cwd.clone();
        }
        command
    }

    fn transition(&mut self, next: StartupState) {
        debug_assert!(next > self.state, "startup moved from {:?} back to {next:?}", self.state);
        debug!("Startup {:?} -> {next:?}", self.state);
        self.state = next;
    }
}
