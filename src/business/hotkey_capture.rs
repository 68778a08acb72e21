//! Hotkey Capture
//!
//! Turns key-chord input into chord descriptors and tracks the per-action
//! capture session used to rebind a hotkey.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::data::Action;

/// Placeholder shown while nothing has been captured yet.
pub const CAPTURE_PLACEHOLDER: &str = "Press keys...";

/// Portable primary-modifier token used in stored descriptors.
pub const PRIMARY_TOKEN: &str = "CommandOrControl";

/// How the primary modifier is shown on this host.
#[cfg(target_os = "macos")]
pub const PRIMARY_LABEL: &str = "Cmd";
#[cfg(not(target_os = "macos"))]
pub const PRIMARY_LABEL: &str = "Ctrl";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("empty hotkey descriptor")]
    Empty,
    #[error("hotkey {0:?} has no key besides modifiers")]
    MissingKey(String),
    #[error("hotkey {0:?} names more than one key")]
    MultipleKeys(String),
    #[error("unknown key {0:?}")]
    UnknownKey(String),
}

/// The key part of a keyboard event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Ctrl, Alt, Shift, Meta or similar pressed on its own.
    Modifier,
    Space,
    Char(char),
    /// Any other key, by its platform name (`F5`, `Enter`, `Up`).
    Named(String),
}

/// A keyboard event as seen by the capture dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
            alt: false,
            shift: false,
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChordModifiers {
    /// Ctrl, or Cmd on macOS.
    pub primary: bool,
    pub alt: bool,
    pub shift: bool,
}

impl ChordModifiers {
    pub fn any(&self) -> bool {
        self.primary || self.alt || self.shift
    }
}

/// Modifiers plus at most one terminal key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    modifiers: ChordModifiers,
    key: Option<String>,
}

impl Chord {
    /// Build a chord from one keyboard event.
    pub fn from_input(input: &KeyInput) -> Self {
        let modifiers = ChordModifiers {
            primary: input.ctrl || input.meta,
            alt: input.alt,
            shift: input.shift,
        };

        let key = match &input.key {
            Key::Modifier => None,
            Key::Space => Some("Space".to_string()),
            // `+` is the token delimiter.
            Key::Char('+') => Some("Plus".to_string()),
            Key::Char(c) => Some(c.to_uppercase().collect()),
            Key::Named(name) => Some(name.clone()),
        };

        Self { modifiers, key }
    }

    pub fn modifiers(&self) -> ChordModifiers {
        self.modifiers
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// At least one modifier and exactly one terminal key.
    pub fn is_complete(&self) -> bool {
        self.modifiers.any() && self.key.is_some()
    }

    /// Descriptor with the host's primary-modifier label, e.g. `Ctrl+Shift+S`.
    pub fn label(&self) -> String {
        self.tokens(PRIMARY_LABEL).join("+")
    }

    fn tokens<'a>(&'a self, primary: &'a str) -> Vec<&'a str> {
        let mut tokens = Vec::with_capacity(4);
        if self.modifiers.primary {
            tokens.push(primary);
        }
        if self.modifiers.alt {
            tokens.push("Alt");
        }
        if self.modifiers.shift {
            tokens.push("Shift");
        }
        if let Some(key) = &self.key {
            tokens.push(key);
        }
        tokens
    }
}

/// Stored form, using the portable `CommandOrControl` token.
impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens(PRIMARY_TOKEN).join("+"))
    }
}

impl FromStr for Chord {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(HotkeyError::Empty);
        }

        let mut modifiers = ChordModifiers::default();
        let mut key: Option<String> = None;

        for part in s.split('+').map(str::trim) {
            match part.to_lowercase().as_str() {
                "" => return Err(HotkeyError::Empty),
                "commandorcontrol" | "cmdorctrl" | "commandorctrl" | "cmdorcontrol" | "ctrl"
                | "control" | "cmd" | "command" | "super" | "meta" => modifiers.primary = true,
                "alt" | "option" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                _ => {
                    if key.is_some() {
                        return Err(HotkeyError::MultipleKeys(s.to_string()));
                    }
                    key = Some(part.to_string());
                }
            }
        }

        Ok(Self { modifiers, key })
    }
}

/// Host label for a stored descriptor. Unparsable descriptors are shown
/// with only the primary token substituted.
pub fn display_label(descriptor: &str) -> String {
    descriptor
        .parse::<Chord>()
        .map(|chord| chord.label())
        .unwrap_or_else(|_| descriptor.replace(PRIMARY_TOKEN, PRIMARY_LABEL))
}

/// An open "press the new hotkey" dialog for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSession {
    action: Action,
    captured: Option<Chord>,
}

impl CaptureSession {
    pub fn open(action: Action) -> Self {
        tracing::debug!("Capturing hotkey for {}", action);
        Self {
            action,
            captured: None,
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Feed one keyboard event. A completed chord replaces whatever was
    /// captured before; incomplete ones are ignored. Returns whether this
    /// event produced a chord.
    pub fn feed(&mut self, input: &KeyInput) -> bool {
        let chord = Chord::from_input(input);
        if !chord.is_complete() {
            return false;
        }
        tracing::debug!("Captured {} for {}", chord, self.action);
        self.captured = Some(chord);
        true
    }

    pub fn captured(&self) -> Option<&Chord> {
        self.captured.as_ref()
    }

    pub fn can_confirm(&self) -> bool {
        self.captured.is_some()
    }

    pub fn preview(&self) -> String {
        self.captured
            .as_ref()
            .map(Chord::label)
            .unwrap_or_else(|| CAPTURE_PLACEHOLDER.to_string())
    }

    /// Close the session, yielding the captured binding if there is one.
    pub fn confirm(self) -> Option<(Action, Chord)> {
        let action = self.action;
        self.captured.map(|chord| (action, chord))
    }
}
