//! Platform seams
//!
//! Traits the core talks to for OS-level concerns, plus the factory that
//! builds the concrete implementations.

use anyhow::Result;

use crate::data::{Action, HotkeyMap};

pub mod hotkeys;
pub mod instance;
pub mod notification;

pub use hotkeys::GlobalHotkeyProvider;
pub use instance::{InstanceGuard, InstanceRole};
pub use notification::DesktopNotifier;

/// Trait for platform-specific global hotkey registration
pub trait HotkeyProvider {
    /// Deliver the bound action whenever one of the hotkeys fires
    fn on_trigger(&self, callback: Box<dyn Fn(Action) + Send + Sync + 'static>);
    /// Unregister every hotkey and stop delivering
    fn stop(&self);
}

/// Desktop notification content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub silent: bool,
}

impl Notice {
    pub fn timer_ended(minutes: u32, sound_on_end: bool) -> Self {
        Self {
            title: "Timer Finished!".to_string(),
            body: format!("Your {} minute timer has ended.", minutes),
            silent: !sound_on_end,
        }
    }
}

/// OS-facing side of the application: tray, global hotkeys, notifications
/// and the alert tone. All calls are fire-and-forget.
pub trait Shell {
    /// Timer started or stopped.
    fn report_run_status(&mut self, running: bool);
    /// Timer reached zero.
    fn report_timer_ended(&mut self, notice: &Notice);
    /// Drop every global hotkey and register the given mapping.
    fn reregister_hotkeys(&mut self, hotkeys: &HotkeyMap);
    /// Play the end-of-timer tone.
    fn play_alert(&mut self);
    /// Release OS resources before exit.
    fn shutdown(&mut self) {}
}

/// Factory for creating platform-specific implementations
pub struct PlatformFactory;

impl PlatformFactory {
    pub fn create_hotkey_provider(hotkeys: &HotkeyMap) -> Result<Box<dyn HotkeyProvider>> {
        Ok(Box::new(GlobalHotkeyProvider::new(hotkeys)?))
    }
}
