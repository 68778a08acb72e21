//! Application Settings
//!
//! The persisted settings record, its defaults, and key-addressed access.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A timer action that can be bound to a hotkey or triggered from the tray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Start,
    Stop,
    Reset,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Start, Action::Stop, Action::Reset];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Reset => "reset",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chord descriptor bound to each action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyMap {
    #[serde(default = "default_start_hotkey")]
    pub start: String,
    #[serde(default = "default_stop_hotkey")]
    pub stop: String,
    #[serde(default = "default_reset_hotkey")]
    pub reset: String,
}

fn default_start_hotkey() -> String {
    "CommandOrControl+Shift+S".to_string()
}

fn default_stop_hotkey() -> String {
    "CommandOrControl+Shift+P".to_string()
}

fn default_reset_hotkey() -> String {
    "CommandOrControl+Shift+R".to_string()
}

impl Default for HotkeyMap {
    fn default() -> Self {
        Self {
            start: default_start_hotkey(),
            stop: default_stop_hotkey(),
            reset: default_reset_hotkey(),
        }
    }
}

impl HotkeyMap {
    pub fn get(&self, action: Action) -> &str {
        match action {
            Action::Start => &self.start,
            Action::Stop => &self.stop,
            Action::Reset => &self.reset,
        }
    }

    pub fn set(&mut self, action: Action, chord: impl Into<String>) {
        let slot = match action {
            Action::Start => &mut self.start,
            Action::Stop => &mut self.stop,
            Action::Reset => &mut self.reset,
        };
        *slot = chord.into();
    }

    /// Read each binding on its own; a missing or non-string entry keeps
    /// its default.
    pub fn from_table(table: &toml::Table) -> Self {
        let mut hotkeys = HotkeyMap::default();
        for action in Action::ALL {
            if let Some(chord) = read::<String>(table, action.as_str()) {
                hotkeys.set(action, chord);
            }
        }
        hotkeys
    }

    /// Bindings in `start`, `stop`, `reset` order.
    pub fn iter(&self) -> impl Iterator<Item = (Action, &str)> + '_ {
        Action::ALL.into_iter().map(move |action| (action, self.get(action)))
    }
}

/// Size (and optional position) of the timer view, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub width: u16,
    pub height: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<u16>,
}

impl Default for WindowBounds {
    fn default() -> Self {
        Self {
            width: 56,
            height: 16,
            x: None,
            y: None,
        }
    }
}

/// Persisted application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Countdown length in minutes, always positive.
    #[serde(
        default = "default_timer_length",
        deserialize_with = "deserialize_timer_length"
    )]
    pub timer_length: u32,
    #[serde(default)]
    pub hotkeys: HotkeyMap,
    #[serde(default)]
    pub disable_hotkeys_when_running: bool,
    #[serde(default = "default_true")]
    pub popup_on_end: bool,
    #[serde(default = "default_true")]
    pub sound_on_end: bool,
    #[serde(default)]
    pub window_bounds: WindowBounds,
}

pub const DEFAULT_TIMER_LENGTH: u32 = 10;

fn default_timer_length() -> u32 {
    DEFAULT_TIMER_LENGTH
}

fn default_true() -> bool {
    true
}

// A zero length would finish on the first tick; treat it as unset.
fn deserialize_timer_length<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let minutes = u32::deserialize(deserializer)?;
    Ok(if minutes == 0 {
        default_timer_length()
    } else {
        minutes
    })
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timer_length: default_timer_length(),
            hotkeys: HotkeyMap::default(),
            disable_hotkeys_when_running: false,
            popup_on_end: true,
            sound_on_end: true,
            window_bounds: WindowBounds::default(),
        }
    }
}

/// Name of a single settings field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    TimerLength,
    Hotkeys,
    DisableHotkeysWhenRunning,
    PopupOnEnd,
    SoundOnEnd,
    WindowBounds,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::TimerLength => "timer_length",
            SettingKey::Hotkeys => "hotkeys",
            SettingKey::DisableHotkeysWhenRunning => "disable_hotkeys_when_running",
            SettingKey::PopupOnEnd => "popup_on_end",
            SettingKey::SoundOnEnd => "sound_on_end",
            SettingKey::WindowBounds => "window_bounds",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value for one settings field, tagged with the field it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    TimerLength(u32),
    Hotkeys(HotkeyMap),
    DisableHotkeysWhenRunning(bool),
    PopupOnEnd(bool),
    SoundOnEnd(bool),
    WindowBounds(WindowBounds),
}

impl SettingValue {
    pub fn key(&self) -> SettingKey {
        match self {
            SettingValue::TimerLength(_) => SettingKey::TimerLength,
            SettingValue::Hotkeys(_) => SettingKey::Hotkeys,
            SettingValue::DisableHotkeysWhenRunning(_) => SettingKey::DisableHotkeysWhenRunning,
            SettingValue::PopupOnEnd(_) => SettingKey::PopupOnEnd,
            SettingValue::SoundOnEnd(_) => SettingKey::SoundOnEnd,
            SettingValue::WindowBounds(_) => SettingKey::WindowBounds,
        }
    }
}

impl Settings {
    /// Build settings from a parsed file. Keys are read one at a time so a
    /// missing or mistyped key falls back to its default without touching
    /// the others.
    pub fn from_table(table: &toml::Table) -> Self {
        let defaults = Settings::default();

        let hotkeys = match table.get(SettingKey::Hotkeys.as_str()) {
            Some(toml::Value::Table(hotkeys)) => HotkeyMap::from_table(hotkeys),
            Some(other) => {
                tracing::warn!("Ignoring invalid setting hotkeys: {}", other);
                defaults.hotkeys
            }
            None => defaults.hotkeys,
        };

        Self {
            timer_length: read::<u32>(table, SettingKey::TimerLength.as_str())
                .filter(|minutes| *minutes > 0)
                .unwrap_or(defaults.timer_length),
            hotkeys,
            disable_hotkeys_when_running: read(
                table,
                SettingKey::DisableHotkeysWhenRunning.as_str(),
            )
            .unwrap_or(defaults.disable_hotkeys_when_running),
            popup_on_end: read(table, SettingKey::PopupOnEnd.as_str())
                .unwrap_or(defaults.popup_on_end),
            sound_on_end: read(table, SettingKey::SoundOnEnd.as_str())
                .unwrap_or(defaults.sound_on_end),
            window_bounds: read(table, SettingKey::WindowBounds.as_str())
                .unwrap_or(defaults.window_bounds),
        }
    }

    pub fn get(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::TimerLength => SettingValue::TimerLength(self.timer_length),
            SettingKey::Hotkeys => SettingValue::Hotkeys(self.hotkeys.clone()),
            SettingKey::DisableHotkeysWhenRunning => {
                SettingValue::DisableHotkeysWhenRunning(self.disable_hotkeys_when_running)
            }
            SettingKey::PopupOnEnd => SettingValue::PopupOnEnd(self.popup_on_end),
            SettingKey::SoundOnEnd => SettingValue::SoundOnEnd(self.sound_on_end),
            SettingKey::WindowBounds => SettingValue::WindowBounds(self.window_bounds),
        }
    }

    /// Overwrite the field named by `value`. A zero timer length is ignored.
    pub fn apply(&mut self, value: SettingValue) {
        match value {
            SettingValue::TimerLength(0) => {}
            SettingValue::TimerLength(minutes) => self.timer_length = minutes,
            SettingValue::Hotkeys(hotkeys) => self.hotkeys = hotkeys,
            SettingValue::DisableHotkeysWhenRunning(flag) => {
                self.disable_hotkeys_when_running = flag
            }
            SettingValue::PopupOnEnd(flag) => self.popup_on_end = flag,
            SettingValue::SoundOnEnd(flag) => self.sound_on_end = flag,
            SettingValue::WindowBounds(bounds) => self.window_bounds = bounds,
        }
    }
}

fn read<T: DeserializeOwned>(table: &toml::Table, key: &str) -> Option<T> {
    let value = table.get(key)?.clone();
    match value.try_into() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring invalid setting {}: {}", key, e);
            None
        }
    }
}
