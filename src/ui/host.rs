//! Desktop Host
//!
//! The tray icon and the global hotkeys belong to the main thread, where the
//! native event loop delivers their events. The timer runs on its own thread
//! and reaches them through [`HostCommand`]s sent over an event loop proxy.

use anyhow::Result;
use std::thread::JoinHandle;
use tao::event::{Event, StartCause};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};
use tokio::sync::mpsc::UnboundedSender;

use crate::business::{AppEvent, HotkeyManager};
use crate::data::HotkeyMap;
use crate::ui::SystemTray;

/// Requests from the timer thread to the main thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    RunStatus(bool),
    RegisterHotkeys(HotkeyMap),
    ReleaseHotkeys,
    /// The timer thread is done; leave the event loop.
    Exit,
}

pub struct DesktopHost {
    hotkeys: HotkeyManager,
    tray: Option<SystemTray>,
    tray_enabled: bool,
    events: UnboundedSender<AppEvent>,
}

impl DesktopHost {
    pub fn new(hotkeys: HotkeyManager, events: UnboundedSender<AppEvent>, tray_enabled: bool) -> Self {
        Self {
            hotkeys,
            tray: None,
            tray_enabled,
            events,
        }
    }

    /// Create the tray once the native loop is running.
    pub fn start(&mut self) {
        if !self.tray_enabled || self.tray.is_some() {
            return;
        }
        match SystemTray::new(self.events.clone()) {
            Ok(tray) => self.tray = Some(tray),
            Err(e) => tracing::warn!("System tray unavailable: {}", e),
        }
    }

    pub fn handle(&mut self, command: HostCommand) {
        match command {
            HostCommand::RunStatus(running) => {
                if let Some(tray) = &self.tray {
                    tray.set_running(running);
                }
            }
            HostCommand::RegisterHotkeys(hotkeys) => {
                if let Err(e) = self.hotkeys.update_config(&hotkeys) {
                    tracing::warn!("Failed to register hotkeys: {}", e);
                }
            }
            HostCommand::ReleaseHotkeys | HostCommand::Exit => self.release(),
        }
    }

    pub fn has_tray(&self) -> bool {
        self.tray.is_some()
    }

    fn release(&mut self) {
        self.hotkeys.stop();
        self.tray = None;
    }
}

/// The main-thread event loop. On Linux this also initializes GTK, which the
/// tray needs.
pub fn event_loop() -> EventLoop<HostCommand> {
    EventLoopBuilder::<HostCommand>::with_user_event().build()
}

/// Run the native event loop until the timer thread asks to exit, then wait
/// for that thread so the terminal is restored before the process ends.
pub fn run(
    event_loop: EventLoop<HostCommand>,
    mut host: DesktopHost,
    timer_thread: JoinHandle<Result<()>>,
) -> ! {
    let mut timer_thread = Some(timer_thread);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::NewEvents(StartCause::Init) => host.start(),
            Event::UserEvent(HostCommand::Exit) => {
                host.handle(HostCommand::Exit);
                if let Some(handle) = timer_thread.take() {
                    match handle.join() {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => tracing::error!("Timer stopped with an error: {:#}", e),
                        Err(_) => tracing::error!("Timer thread panicked"),
                    }
                }
                tracing::info!("Application exited");
                *control_flow = ControlFlow::Exit;
            }
            Event::UserEvent(command) => host.handle(command),
            _ => {}
        }
    })
}
