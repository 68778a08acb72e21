//! UI module: the terminal view and the desktop integration around it

pub mod host;
pub mod shell;
pub mod system_tray;
pub mod terminal;

pub use host::{DesktopHost, HostCommand};
pub use shell::DesktopShell;
pub use system_tray::SystemTray;
pub use terminal::TerminalView;

use anyhow::Result;

use crate::business::Phase;
use crate::data::{Action, WindowBounds};

/// Everything the view needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    /// Remaining time as `MM:SS`.
    pub display: String,
    pub phase: Phase,
    pub can_start: bool,
    pub can_stop: bool,
    pub length_editable: bool,
    pub timer_length: u32,
    pub popup_on_end: bool,
    pub sound_on_end: bool,
    pub disable_hotkeys_when_running: bool,
    /// Host labels of the bound chords, in action order.
    pub hotkeys: Vec<(Action, String)>,
    pub capture: Option<CaptureView>,
    pub always_on_top: bool,
}

/// State of an open hotkey capture dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureView {
    pub action: Action,
    pub preview: String,
    pub can_confirm: bool,
}

/// The foreground timer window.
pub trait View {
    /// Make the view visible. Called once, after the first frame is ready.
    fn show(&mut self) -> Result<()>;
    /// Draw the current state.
    fn render(&mut self, model: &ViewModel) -> Result<()>;
    /// Show, restore and focus the view.
    fn raise(&mut self);
    fn set_always_on_top(&mut self, on_top: bool);
    /// Current size and position, if known.
    fn bounds(&self) -> Option<WindowBounds>;
    /// Tear the view down.
    fn close(&mut self);
}
