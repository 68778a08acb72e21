//! Simple Timer - Main Entry Point
//!
//! The native event loop (tray, global hotkeys) runs on the main thread and
//! the timer runs on its own thread. The terminal view owns stdout, so logs
//! go to a file next to the settings.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use tao::event_loop::EventLoopProxy;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use simple_timer::business::{ActionSource, App, AppEvent, HotkeyManager};
use simple_timer::data::SettingsStore;
use simple_timer::platform::instance::{self, InstanceGuard, InstanceRole, INSTANCE_PORT};
use simple_timer::ui::host::{self, DesktopHost, HostCommand};
use simple_timer::ui::{DesktopShell, TerminalView};

const LOG_FILE: &str = "simple-timer.log";

#[derive(Debug, Parser)]
#[command(name = "simple-timer", version, about = "Countdown timer with global hotkeys")]
struct Cli {
    /// Log at debug level
    #[arg(long)]
    debug: bool,

    /// Run without a system tray icon
    #[arg(long)]
    no_tray: bool,

    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings_path = cli.settings.unwrap_or_else(SettingsStore::default_path);
    init_logging(&settings_path, cli.debug)?;

    info!("Starting Simple Timer v{}", env!("CARGO_PKG_VERSION"));

    let guard = match instance::acquire(INSTANCE_PORT) {
        InstanceRole::Primary(guard) => guard,
        InstanceRole::Secondary => {
            info!("Handed off to the running instance");
            return Ok(());
        }
    };

    let store = SettingsStore::open(&settings_path);
    let (tx, rx) = mpsc::unbounded_channel();

    // Tray and global hotkeys only deliver events on the thread running the
    // native event loop, so that loop owns the main thread.
    let event_loop = host::event_loop();
    let proxy = event_loop.create_proxy();

    let hotkey_tx = tx.clone();
    let hotkeys = HotkeyManager::new(Arc::new(move |action| {
        let _ = hotkey_tx.send(AppEvent::Action(action, ActionSource::Hotkey));
    }));
    let desktop = DesktopHost::new(hotkeys, tx.clone(), !cli.no_tray);

    let timer_thread = thread::Builder::new()
        .name("timer".to_string())
        .spawn(move || {
            let result = run_timer(store, guard, proxy.clone(), tx, rx);
            if proxy.send_event(HostCommand::Exit).is_err() {
                warn!("Desktop event loop already closed");
            }
            result
        })
        .context("Failed to start timer thread")?;

    host::run(event_loop, desktop, timer_thread)
}

/// The timer's own event loop: one tokio runtime draining the event queue.
fn run_timer(
    store: SettingsStore,
    mut guard: InstanceGuard,
    host_proxy: EventLoopProxy<HostCommand>,
    tx: UnboundedSender<AppEvent>,
    mut rx: UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    runtime.block_on(async move {
        guard.listen(tx.clone());

        let view = TerminalView::new(store.settings().window_bounds, tx.clone());
        let shell = DesktopShell::new(host_proxy);
        let mut app = App::new(store, shell, view, tx);
        app.launch()?;

        while let Some(event) = rx.recv().await {
            if !app.handle(event) {
                break;
            }
        }

        app.shutdown();
        Ok(())
    })
}

fn init_logging(settings_path: &Path, debug: bool) -> Result<()> {
    let level = if debug {
        "simple_timer=debug"
    } else {
        "simple_timer=info"
    };

    let dir = settings_path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let log_path = dir.join(LOG_FILE);
    let file = File::options()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}
