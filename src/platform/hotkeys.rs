//! Global hotkeys via `global-hotkey`
//!
//! Registers one hotkey per timer action and maps fired hotkey ids back to
//! the action they are bound to.

use anyhow::Result;
use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::business::{Chord, HotkeyError};
use crate::data::{Action, HotkeyMap};
use crate::platform::HotkeyProvider;

pub struct GlobalHotkeyProvider {
    manager: GlobalHotKeyManager,
    registered: Vec<HotKey>,
    bindings: HashMap<u32, Action>,
    is_active: AtomicBool,
}

impl GlobalHotkeyProvider {
    /// Register every binding in `hotkeys`. Individual bindings that cannot be
    /// parsed or registered are logged and skipped.
    pub fn new(hotkeys: &HotkeyMap) -> Result<Self> {
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| anyhow::anyhow!("Failed to create hotkey manager: {}", e))?;

        let mut registered = Vec::new();
        let mut bindings = HashMap::new();

        for (action, descriptor) in hotkeys.iter() {
            let hotkey = match parse_combo_key(descriptor) {
                Ok(hotkey) => hotkey,
                Err(e) => {
                    tracing::warn!("Skipping {} hotkey {:?}: {}", action, descriptor, e);
                    continue;
                }
            };

            // Chords may repeat across actions; the first binding keeps it.
            if bindings.contains_key(&hotkey.id()) {
                tracing::warn!("{} hotkey {:?} is already bound", action, descriptor);
                continue;
            }

            match manager.register(hotkey) {
                Ok(()) => {
                    registered.push(hotkey);
                    bindings.insert(hotkey.id(), action);
                    tracing::info!("Registered {} hotkey {}", action, descriptor);
                }
                Err(e) => {
                    tracing::warn!("Failed to register {} hotkey {}: {}", action, descriptor, e);
                }
            }
        }

        Ok(Self {
            manager,
            registered,
            bindings,
            is_active: AtomicBool::new(true),
        })
    }
}

impl HotkeyProvider for GlobalHotkeyProvider {
    fn on_trigger(&self, callback: Box<dyn Fn(Action) + Send + Sync + 'static>) {
        let bindings = self.bindings.clone();
        GlobalHotKeyEvent::set_event_handler(Some(move |event: GlobalHotKeyEvent| {
            if event.state != HotKeyState::Pressed {
                return;
            }
            if let Some(action) = bindings.get(&event.id) {
                tracing::debug!("Hotkey fired: {}", action);
                callback(*action);
            }
        }));
    }

    fn stop(&self) {
        if !self.is_active.swap(false, Ordering::SeqCst) {
            return;
        }
        GlobalHotKeyEvent::set_event_handler(None::<fn(GlobalHotKeyEvent)>);
        if let Err(e) = self.manager.unregister_all(&self.registered) {
            tracing::warn!("Failed to unregister hotkeys: {}", e);
        }
    }
}

impl Drop for GlobalHotkeyProvider {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Parse a combo key string like "CommandOrControl+Shift+S"
pub fn parse_combo_key(key_str: &str) -> Result<HotKey, HotkeyError> {
    let chord: Chord = key_str.parse()?;

    let key = chord
        .key()
        .ok_or_else(|| HotkeyError::MissingKey(key_str.to_string()))?;
    let code = parse_key_code(key)?;

    let flags = chord.modifiers();
    let mut modifiers = Modifiers::empty();
    if flags.primary {
        modifiers |= primary_modifier();
    }
    if flags.alt {
        modifiers |= Modifiers::ALT;
    }
    if flags.shift {
        modifiers |= Modifiers::SHIFT;
    }

    let modifiers = (!modifiers.is_empty()).then_some(modifiers);
    Ok(HotKey::new(modifiers, code))
}

fn primary_modifier() -> Modifiers {
    if cfg!(target_os = "macos") {
        Modifiers::SUPER
    } else {
        Modifiers::CONTROL
    }
}

/// Parse a key code from string
fn parse_key_code(key: &str) -> Result<Code, HotkeyError> {
    let code = match key.to_uppercase().as_str() {
        "A" => Code::KeyA,
        "B" => Code::KeyB,
        "C" => Code::KeyC,
        "D" => Code::KeyD,
        "E" => Code::KeyE,
        "F" => Code::KeyF,
        "G" => Code::KeyG,
        "H" => Code::KeyH,
        "I" => Code::KeyI,
        "J" => Code::KeyJ,
        "K" => Code::KeyK,
        "L" => Code::KeyL,
        "M" => Code::KeyM,
        "N" => Code::KeyN,
        "O" => Code::KeyO,
        "P" => Code::KeyP,
        "Q" => Code::KeyQ,
        "R" => Code::KeyR,
        "S" => Code::KeyS,
        "T" => Code::KeyT,
        "U" => Code::KeyU,
        "V" => Code::KeyV,
        "W" => Code::KeyW,
        "X" => Code::KeyX,
        "Y" => Code::KeyY,
        "Z" => Code::KeyZ,
        "0" | ")" => Code::Digit0,
        "1" | "!" => Code::Digit1,
        "2" | "@" => Code::Digit2,
        "3" | "#" => Code::Digit3,
        "4" | "$" => Code::Digit4,
        "5" | "%" => Code::Digit5,
        "6" | "^" => Code::Digit6,
        "7" | "&" => Code::Digit7,
        "8" | "*" => Code::Digit8,
        "9" | "(" => Code::Digit9,
        "-" | "_" => Code::Minus,
        "=" | "PLUS" => Code::Equal,
        "," | "<" => Code::Comma,
        "." | ">" => Code::Period,
        "/" | "?" => Code::Slash,
        ";" | ":" => Code::Semicolon,
        "'" | "\"" => Code::Quote,
        "[" | "{" => Code::BracketLeft,
        "]" | "}" => Code::BracketRight,
        "\\" | "|" => Code::Backslash,
        "`" | "~" => Code::Backquote,
        "SPACE" => Code::Space,
        "TAB" => Code::Tab,
        "ENTER" | "RETURN" => Code::Enter,
        "ESCAPE" | "ESC" => Code::Escape,
        "BACKSPACE" => Code::Backspace,
        "DELETE" => Code::Delete,
        "INSERT" => Code::Insert,
        "HOME" => Code::Home,
        "END" => Code::End,
        "PAGEUP" => Code::PageUp,
        "PAGEDOWN" => Code::PageDown,
        "UP" => Code::ArrowUp,
        "DOWN" => Code::ArrowDown,
        "LEFT" => Code::ArrowLeft,
        "RIGHT" => Code::ArrowRight,
        "F1" => Code::F1,
        "F2" => Code::F2,
        "F3" => Code::F3,
        "F4" => Code::F4,
        "F5" => Code::F5,
        "F6" => Code::F6,
        "F7" => Code::F7,
        "F8" => Code::F8,
        "F9" => Code::F9,
        "F10" => Code::F10,
        "F11" => Code::F11,
        "F12" => Code::F12,
        _ => return Err(HotkeyError::UnknownKey(key.to_string())),
    };

    Ok(code)
}
