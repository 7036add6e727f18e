//! Startup hook arbitration: when does the default program get a window.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use mux_core::config::{SpawnOptions, SplitOptions, StartupConfig};
use mux_core::error::{MuxError, MuxResult};
use mux_core::layout::{PaneId, SplitDirection};
use mux_core::mux::Mux;
use mux_core::startup::{
    Diagnostics, ProcessLauncher, STARTUP_EVENT, SpawnCommand, StartupCoordinator, StartupState,
};

#[derive(Default)]
struct RecordingLauncher {
    launched: Mutex<Vec<(PaneId, SpawnCommand)>>,
    fail: bool,
}

impl ProcessLauncher for RecordingLauncher {
    fn launch(&self, pane_id: PaneId, command: &SpawnCommand) -> MuxResult<()> {
        if self.fail {
            return Err(MuxError::InvalidArgument("no such program".into()));
        }
        self.launched.lock().push((pane_id, command.clone()));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingDiagnostics {
    reports: Mutex<Vec<(String, MuxError)>>,
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, event: &str, error: &MuxError) {
        self.reports.lock().push((event.to_string(), error.clone()));
    }
}

struct Harness {
    mux: Mux,
    launcher: Arc<RecordingLauncher>,
    diagnostics: Arc<RecordingDiagnostics>,
    coordinator: StartupCoordinator,
}

fn harness(config: StartupConfig) -> Harness {
    let mux = Mux::from_config(&config);
    let launcher = Arc::new(RecordingLauncher::default());
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let coordinator = StartupCoordinator::new(mux.clone(), config)
        .with_launcher(launcher.clone())
        .with_diagnostics(diagnostics.clone());
    Harness { mux, launcher, diagnostics, coordinator }
}

fn window_count(mux: &Mux) -> usize {
    mux.read(|reg| reg.window_count())
}

async fn noop_hook(_mux: Mux) -> MuxResult<()> {
    Ok(())
}

async fn spawn_hook(mux: Mux) -> MuxResult<()> {
    let (_, pane, _) = mux.spawn_window(SpawnOptions::default())?;
    mux.split_pane(pane, SplitOptions::new(SplitDirection::Right, 0.5))?;
    Ok(())
}

async fn two_workspaces_hook(mux: Mux) -> MuxResult<()> {
    mux.spawn_window(SpawnOptions::in_workspace("automation"))?;
    mux.spawn_window(SpawnOptions::in_workspace("coding"))?;
    mux.set_active_workspace("coding")
}

async fn failing_hook(mux: Mux) -> MuxResult<()> {
    mux.spawn_window(SpawnOptions::default())?;
    Err(MuxError::InvalidArgument("bad layout".into()))
}

async fn panicking_hook(_mux: Mux) -> MuxResult<()> {
    panic!("hook blew up");
}

async fn sleeping_hook(mux: Mux) -> MuxResult<()> {
    tokio::time::sleep(Duration::from_secs(30)).await;
    mux.spawn_window(SpawnOptions::default())?;
    Ok(())
}

async fn idle_sleeping_hook(_mux: Mux) -> MuxResult<()> {
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(())
}

async fn deferred_hook(mux: Mux) -> MuxResult<()> {
    tokio::task::yield_now().await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    mux.spawn_window(SpawnOptions::in_workspace("later"))?;
    Ok(())
}

#[tokio::test]
async fn hook_windows_replace_default() {
    let Harness { mux, launcher, diagnostics, coordinator } = harness(StartupConfig::default());

    let outcome = coordinator.run(spawn_hook, None).await.unwrap();

    assert_eq!(outcome.state, StartupState::SkipDefault);
    assert!(outcome.hook_created_panes);
    assert!(outcome.default_window.is_none());
    assert_eq!(window_count(&mux), 1);
    assert_eq!(mux.panes_created(), 2);
    assert!(launcher.launched.lock().is_empty());
    assert!(diagnostics.reports.lock().is_empty());
}

#[tokio::test]
async fn idle_hook_gets_default_window() {
    let config =
        StartupConfig { default_prog: Some(vec!["fish".into()]), ..StartupConfig::default() };
    let Harness { mux, launcher, coordinator, .. } = harness(config);

    let outcome = coordinator.run(noop_hook, None).await.unwrap();

    assert_eq!(outcome.state, StartupState::SpawnDefault);
    assert!(!outcome.hook_created_panes);
    let (_, pane, window) = outcome.default_window.unwrap();
    assert_eq!(mux.windows_in_workspace("main"), vec![window]);
    assert_eq!(*launcher.launched.lock(), vec![(pane, SpawnCommand::program(["fish"]))]);
}

#[tokio::test]
async fn hook_switches_workspace() {
    let Harness { mux, launcher, coordinator, .. } = harness(StartupConfig::default());

    let outcome = coordinator.run(two_workspaces_hook, None).await.unwrap();

    assert_eq!(outcome.state, StartupState::SkipDefault);
    assert_eq!(mux.active_workspace(), "coding");
    assert_eq!(mux.windows_in_workspace("automation").len(), 1);
    assert_eq!(mux.windows_in_workspace("coding").len(), 1);
    assert!(mux.windows_in_workspace("main").is_empty());
    assert_eq!(mux.workspace_names(), vec!["automation", "coding", "main"]);
    assert!(launcher.launched.lock().is_empty());
    mux.read(|reg| reg.check_invariants()).unwrap();
}

#[tokio::test]
async fn explicit_program_spawns_alongside_hook_panes() {
    let Harness { mux, launcher, coordinator, .. } = harness(StartupConfig::default());
    let explicit = SpawnCommand { args: Some(vec!["top".into()]), cwd: Some("/tmp".into()) };

    let outcome = coordinator.run(two_workspaces_hook, Some(explicit.clone())).await.unwrap();

    assert_eq!(outcome.state, StartupState::SpawnDefault);
    assert!(outcome.hook_created_panes);
    let (_, pane, window) = outcome.default_window.unwrap();
    let workspace = mux.read(|reg| reg.window(window).map(|w| w.workspace.clone()));
    assert_eq!(workspace.as_deref(), Some("coding"));
    assert_eq!(mux.windows_in_workspace("coding").len(), 2);
    assert_eq!(mux.windows_in_workspace("automation").len(), 1);
    assert_eq!(*launcher.launched.lock(), vec![(pane, explicit)]);
}

#[tokio::test]
async fn failed_hook_is_reported_and_default_spawned() {
    let Harness { mux, launcher, diagnostics, coordinator } = harness(StartupConfig::default());

    let outcome = coordinator.run(failing_hook, None).await.unwrap();

    assert_eq!(outcome.state, StartupState::SpawnDefault);
    assert!(!outcome.hook_created_panes);
    assert!(matches!(outcome.hook_error, Some(MuxError::HookFailure(_))));
    // Panes the hook made before failing stay where they are.
    assert_eq!(mux.windows_in_workspace("main").len(), 2);
    assert_eq!(launcher.launched.lock().len(), 1);

    let reports = diagnostics.reports.lock();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, STARTUP_EVENT);
    assert!(reports[0].1.to_string().contains("bad layout"));
}

#[tokio::test]
async fn panicking_hook_is_a_hook_failure() {
    let Harness { mux, diagnostics, coordinator, .. } = harness(StartupConfig::default());

    let outcome = coordinator.run(panicking_hook, None).await.unwrap();

    assert_eq!(outcome.state, StartupState::SpawnDefault);
    assert!(matches!(outcome.hook_error, Some(MuxError::HookFailure(_))));
    assert_eq!(diagnostics.reports.lock().len(), 1);
    assert_eq!(window_count(&mux), 1);
}

#[tokio::test]
async fn slow_hook_times_out() {
    let config = StartupConfig { hook_timeout_ms: Some(50), ..StartupConfig::default() };
    let Harness { mux, diagnostics, coordinator, .. } = harness(config);

    let outcome = coordinator.run(sleeping_hook, None).await.unwrap();

    assert_eq!(outcome.state, StartupState::SpawnDefault);
    assert!(matches!(outcome.hook_error, Some(MuxError::HookFailure(_))));
    assert_eq!(diagnostics.reports.lock().len(), 1);
    assert_eq!(window_count(&mux), 1);

    // The aborted hook never gets to spawn its window.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(window_count(&mux), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn suspended_hook_is_awaited() {
    let Harness { mux, launcher, coordinator, .. } = harness(StartupConfig::default());

    let outcome = coordinator.run(deferred_hook, None).await.unwrap();

    assert_eq!(outcome.state, StartupState::SkipDefault);
    assert_eq!(mux.windows_in_workspace("later").len(), 1);
    assert_eq!(window_count(&mux), 1);
    assert!(launcher.launched.lock().is_empty());
}

#[tokio::test]
async fn panes_spawned_by_other_handlers_do_not_count() {
    let Harness { mux, launcher, coordinator, .. } = harness(StartupConfig::default());
    let other = mux.clone();
    let background = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        other.spawn_window(SpawnOptions::in_workspace("other"))
    });

    let outcome = coordinator.run(idle_sleeping_hook, None).await.unwrap();
    background.await.unwrap().unwrap();

    assert_eq!(outcome.state, StartupState::SpawnDefault);
    assert!(!outcome.hook_created_panes);
    let (_, pane, window) = outcome.default_window.unwrap();
    assert_eq!(mux.windows_in_workspace("main"), vec![window]);
    assert_eq!(mux.windows_in_workspace("other").len(), 1);
    assert_eq!(launcher.launched.lock()[0].0, pane);
}

#[tokio::test]
async fn launcher_failure_is_returned() {
    let mux = Mux::default();
    let launcher = Arc::new(RecordingLauncher { fail: true, ..RecordingLauncher::default() });
    let coordinator =
        StartupCoordinator::new(mux.clone(), StartupConfig::default()).with_launcher(launcher);

    let err = coordinator.run(noop_hook, None).await.unwrap_err();
    assert_eq!(err, MuxError::InvalidArgument("no such program".into()));
    // The window exists even though its process could not be started.
    assert_eq!(window_count(&mux), 1);
}

#[tokio::test]
async fn hook_from_config_file() {
    let config = StartupConfig::from_toml(
        r#"
        default_workspace = "home"
        default_prog = ["bash", "-l"]
        default_cwd = "/srv"

        [initial_size]
        rows = 50
        cols = 200
        "#,
    )
    .unwrap();
    let Harness { mux, launcher, coordinator, .. } = harness(config);

    let outcome = coordinator.run(noop_hook, None).await.unwrap();

    let (tab, pane, _) = outcome.default_window.unwrap();
    assert_eq!(mux.active_workspace(), "home");
    assert_eq!(mux.pane_size(pane).unwrap().cols, 200);
    assert_eq!(mux.active_pane_of(tab).unwrap(), pane);
    let launched = launcher.launched.lock();
    assert_eq!(launched[0].1.cwd, Some("/srv".into()));
    assert_eq!(launched[0].1.args, Some(vec!["bash".to_string(), "-l".to_string()]));
}
