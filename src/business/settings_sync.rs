//! Settings Sync Bridge
//!
//! Keeps the in-memory settings used by the view and the durable store in
//! step. Every edit is written through immediately; hotkey edits also
//! re-register all global hotkeys.

use crate::business::Chord;
use crate::data::{Action, HotkeyMap, SettingValue, Settings, SettingsStore, WindowBounds};
use crate::platform::Shell;

pub struct SettingsBridge {
    store: SettingsStore,
}

impl SettingsBridge {
    pub fn new(store: SettingsStore) -> Self {
        match store.path() {
            Some(path) => tracing::info!("Settings loaded from {}", path.display()),
            None => tracing::info!("Using in-memory settings"),
        }
        Self { store }
    }

    pub fn settings(&self) -> &Settings {
        self.store.settings()
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Persist one edited field. A `Hotkeys` value goes through
    /// [`set_hotkeys`](Self::set_hotkeys).
    pub fn update<S: Shell + ?Sized>(&mut self, value: SettingValue, shell: &mut S) {
        match value {
            SettingValue::Hotkeys(hotkeys) => self.set_hotkeys(hotkeys, shell),
            value => self.persist(value),
        }
    }

    /// Bind `chord` to `action`, keeping the other two bindings.
    pub fn bind_hotkey<S: Shell + ?Sized>(&mut self, action: Action, chord: &Chord, shell: &mut S) {
        let mut hotkeys = self.settings().hotkeys.clone();
        hotkeys.set(action, chord.to_string());
        tracing::info!("Binding {} to {}", action, chord);
        self.set_hotkeys(hotkeys, shell);
    }

    /// Store the whole mapping as one unit, then re-register every hotkey.
    pub fn set_hotkeys<S: Shell + ?Sized>(&mut self, hotkeys: HotkeyMap, shell: &mut S) {
        self.persist(SettingValue::Hotkeys(hotkeys.clone()));
        shell.reregister_hotkeys(&hotkeys);
    }

    pub fn save_window_bounds(&mut self, bounds: WindowBounds) {
        if self.settings().window_bounds != bounds {
            self.persist(SettingValue::WindowBounds(bounds));
        }
    }

    fn persist(&mut self, value: SettingValue) {
        let key = value.key();
        match self.store.set(value) {
            Ok(()) => tracing::debug!("Saved setting {}", key),
            Err(e) => tracing::warn!("Failed to save setting {}: {}", key, e),
        }
    }
}
