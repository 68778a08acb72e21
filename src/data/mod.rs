//! Data module for settings and their persistence

mod settings;
mod store;

pub use settings::{
    Action, HotkeyMap, SettingKey, SettingValue, Settings, WindowBounds, DEFAULT_TIMER_LENGTH,
};
pub use store::{SettingsError, SettingsStore};
