//! Business logic: the timer, hotkey capture, settings sync and the
//! application context that drives them

pub mod app;
mod hotkey_capture;
mod hotkey_manager;
mod settings_sync;
mod ticker;
mod timer;

pub use app::{ActionSource, App, AppEvent, Toggle, ALWAYS_ON_TOP_RELEASE, MAX_TIMER_LENGTH};
pub use hotkey_capture::{
    display_label, CaptureSession, Chord, ChordModifiers, HotkeyError, Key, KeyInput,
    CAPTURE_PLACEHOLDER, PRIMARY_LABEL, PRIMARY_TOKEN,
};
pub use hotkey_manager::{ActionCallback, HotkeyManager};
pub use settings_sync::SettingsBridge;
pub use ticker::{Ticker, TICK_PERIOD};
pub use timer::{format_remaining, Phase, Timer, TimerCommand, TimerEffect, SECONDS_PER_MINUTE};
