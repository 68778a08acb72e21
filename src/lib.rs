//! Simple Timer - desktop countdown timer
//!
//! A countdown timer with global start/stop/reset hotkeys, a system tray
//! menu, end-of-timer notifications and an alert tone. Settings persist to
//! a TOML file and changes apply immediately.

pub mod audio;
pub mod business;
pub mod data;
pub mod platform;
pub mod ui;

pub use audio::AlertPlayer;
pub use business::{App, AppEvent, HotkeyManager, SettingsBridge, Timer};
pub use data::{Settings, SettingsStore};
