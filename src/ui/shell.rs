//! Desktop Shell
//!
//! The timer thread's side of the OS integration. Tray and hotkey requests
//! are forwarded to the main-thread host; notifications and the alert tone
//! are handled here.

use tao::event_loop::EventLoopProxy;

use crate::audio::AlertPlayer;
use crate::data::HotkeyMap;
use crate::platform::{DesktopNotifier, Notice, Shell};
use crate::ui::HostCommand;

pub struct DesktopShell {
    host: EventLoopProxy<HostCommand>,
    notifier: DesktopNotifier,
    alert: AlertPlayer,
}

impl DesktopShell {
    pub fn new(host: EventLoopProxy<HostCommand>) -> Self {
        Self {
            host,
            notifier: DesktopNotifier::new(),
            alert: AlertPlayer::new(),
        }
    }

    fn send(&self, command: HostCommand) {
        if self.host.send_event(command).is_err() {
            tracing::warn!("Desktop event loop is gone");
        }
    }
}

impl Shell for DesktopShell {
    fn report_run_status(&mut self, running: bool) {
        self.send(HostCommand::RunStatus(running));
    }

    fn report_timer_ended(&mut self, notice: &Notice) {
        if !self.notifier.is_supported() {
            tracing::debug!("Skipping notification: {}", notice.body);
            return;
        }
        if let Err(e) = self.notifier.notify(notice) {
            tracing::warn!("Failed to show notification: {}", e);
        }
    }

    fn reregister_hotkeys(&mut self, hotkeys: &HotkeyMap) {
        self.send(HostCommand::RegisterHotkeys(hotkeys.clone()));
    }

    fn play_alert(&mut self) {
        self.alert.play();
    }

    fn shutdown(&mut self) {
        self.send(HostCommand::ReleaseHotkeys);
    }
}
