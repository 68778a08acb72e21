//! Terminal View
//!
//! Draws the countdown and settings in the terminal with crossterm and turns
//! key presses into application events. The view stays hidden (no raw mode,
//! no alternate screen) until `show` is called.
//!
//! Terminals that speak the keyboard enhancement protocol report Shift
//! alongside Ctrl and report bare modifier presses; legacy terminals cannot,
//! so chords captured there lose Shift when Ctrl is held.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Print, PrintStyledContent, Stylize},
    terminal::{
        self, disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, Clear, ClearType,
        EnterAlternateScreen, LeaveAlternateScreen, SetSize, SetTitle,
    },
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use crate::business::{ActionSource, AppEvent, CaptureSession, Key, KeyInput, Phase, Toggle};
use crate::data::{Action, WindowBounds};
use crate::ui::{View, ViewModel};

const TITLE: &str = "Simple Timer";
const TITLE_ON_TOP: &str = "* Simple Timer *";
const DISPLAY_ROW: usize = 2;
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Modifier presses become escape codes too, so Ctrl+Shift+S keeps its Shift.
pub const KEYBOARD_FLAGS: KeyboardEnhancementFlags =
    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        .union(KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES);

pub struct TerminalView {
    bounds: WindowBounds,
    visible: bool,
    enhanced_keys: bool,
    events: Option<UnboundedSender<AppEvent>>,
    input_active: Arc<AtomicBool>,
}

impl TerminalView {
    /// A hidden view that will be sized to `bounds` when shown. Input is
    /// read once the view is shown and forwarded to `events`.
    pub fn new(bounds: WindowBounds, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            bounds,
            visible: false,
            enhanced_keys: false,
            events: Some(events),
            input_active: Arc::new(AtomicBool::new(true)),
        }
    }

    fn spawn_input(&mut self) {
        let Some(events) = self.events.take() else {
            return;
        };
        let active = self.input_active.clone();

        thread::spawn(move || {
            let mut keys = KeyTranslator::default();
            while active.load(Ordering::SeqCst) {
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        tracing::warn!("Terminal input failed: {}", e);
                        break;
                    }
                }

                let app_event = match event::read() {
                    Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => keys.key(&key),
                    Ok(Event::FocusLost) => Some(keys.focus_lost()),
                    Ok(Event::Resize(..)) => Some(AppEvent::Refresh),
                    Ok(_) => None,
                    Err(e) => {
                        tracing::warn!("Terminal input failed: {}", e);
                        break;
                    }
                };

                if let Some(app_event) = app_event {
                    if events.send(app_event).is_err() {
                        break;
                    }
                }
            }
            tracing::debug!("Terminal input thread exiting");
        });
    }
}

impl View for TerminalView {
    fn show(&mut self) -> Result<()> {
        if self.visible {
            return Ok(());
        }

        enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, EnableFocusChange, Hide, SetTitle(TITLE))?;
        if let Err(e) = execute!(out, SetSize(self.bounds.width, self.bounds.height)) {
            tracing::debug!("Terminal does not support resizing: {}", e);
        }

        self.enhanced_keys = matches!(supports_keyboard_enhancement(), Ok(true));
        if self.enhanced_keys {
            execute!(out, PushKeyboardEnhancementFlags(KEYBOARD_FLAGS))?;
        } else {
            tracing::warn!(
                "Terminal lacks keyboard enhancement; Shift cannot be detected together with Ctrl"
            );
        }

        self.visible = true;
        self.spawn_input();
        Ok(())
    }

    fn render(&mut self, model: &ViewModel) -> Result<()> {
        if !self.visible {
            return Ok(());
        }

        let mut out = io::stdout();
        queue!(out, Clear(ClearType::All))?;
        for (row, line) in layout(model).iter().enumerate() {
            queue!(out, MoveTo(0, row as u16))?;
            if row != DISPLAY_ROW {
                queue!(out, Print(line))?;
                continue;
            }

            let mut styled = line.as_str().bold();
            styled = match model.phase {
                Phase::Running => styled.green(),
                Phase::Finished => styled.red(),
                Phase::Idle => styled,
            };
            if model.always_on_top {
                styled = styled.reverse();
            }
            queue!(out, PrintStyledContent(styled))?;
        }
        out.flush()?;
        Ok(())
    }

    fn raise(&mut self) {
        if let Err(e) = self.show() {
            tracing::warn!("Failed to show timer: {}", e);
            return;
        }
        // A terminal cannot take focus; ring the bell instead.
        if let Err(e) = execute!(io::stdout(), Print("\x07")) {
            tracing::warn!("Failed to raise timer: {}", e);
        }
    }

    fn set_always_on_top(&mut self, on_top: bool) {
        if !self.visible {
            return;
        }
        let title = if on_top { TITLE_ON_TOP } else { TITLE };
        if let Err(e) = execute!(io::stdout(), SetTitle(title)) {
            tracing::warn!("Failed to update title: {}", e);
        }
    }

    fn bounds(&self) -> Option<WindowBounds> {
        if !self.visible {
            return None;
        }
        terminal::size().ok().map(|(width, height)| WindowBounds {
            width,
            height,
            ..self.bounds
        })
    }

    fn close(&mut self) {
        self.input_active.store(false, Ordering::SeqCst);
        if !self.visible {
            return;
        }
        self.visible = false;

        let mut out = io::stdout();
        if self.enhanced_keys {
            if let Err(e) = execute!(out, PopKeyboardEnhancementFlags) {
                tracing::warn!("Failed to restore keyboard mode: {}", e);
            }
            self.enhanced_keys = false;
        }
        if let Err(e) = execute!(out, DisableFocusChange, Show, LeaveAlternateScreen) {
            tracing::warn!("Failed to restore terminal: {}", e);
        }
        if let Err(e) = disable_raw_mode() {
            tracing::warn!("Failed to leave raw mode: {}", e);
        }
    }
}

impl Drop for TerminalView {
    fn drop(&mut self) {
        self.close();
    }
}

/// Key press translation that follows the capture dialog's open state.
///
/// The dialog state is tracked here as keys are translated, so keys typed
/// right after opening the dialog go to the capture even before the next
/// frame is drawn.
#[derive(Debug, Default)]
pub struct KeyTranslator {
    capture: Option<CaptureSession>,
}

impl KeyTranslator {
    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    pub fn key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        let event = translate(key, self.is_capturing())?;
        match &event {
            AppEvent::OpenCapture(action) => self.capture = Some(CaptureSession::open(*action)),
            AppEvent::CaptureKey(input) => {
                if let Some(session) = self.capture.as_mut() {
                    session.feed(input);
                }
            }
            // An incomplete chord cannot be confirmed; the dialog stays open.
            AppEvent::ConfirmCapture => {
                if self.capture.as_ref().is_some_and(CaptureSession::can_confirm) {
                    self.capture = None;
                }
            }
            AppEvent::CancelCapture => self.capture = None,
            _ => {}
        }
        Some(event)
    }

    pub fn focus_lost(&mut self) -> AppEvent {
        self.capture = None;
        AppEvent::FocusLost
    }
}

/// Map a key press to an application event.
///
/// While a hotkey capture is open, bare Enter and Esc confirm and cancel;
/// every other key is fed to the capture.
pub fn translate(key: &KeyEvent, capturing: bool) -> Option<AppEvent> {
    if capturing {
        if key.modifiers.is_empty() {
            match key.code {
                KeyCode::Enter => return Some(AppEvent::ConfirmCapture),
                KeyCode::Esc => return Some(AppEvent::CancelCapture),
                _ => {}
            }
        }
        return key_input(key).map(AppEvent::CaptureKey);
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(AppEvent::Quit);
    }
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
    {
        return None;
    }

    let event = match key.code {
        KeyCode::Char('s') => AppEvent::Action(Action::Start, ActionSource::View),
        KeyCode::Char('p') => AppEvent::Action(Action::Stop, ActionSource::View),
        KeyCode::Char('r') => AppEvent::Action(Action::Reset, ActionSource::View),
        KeyCode::Char('+') | KeyCode::Char('=') => AppEvent::AdjustLength(1),
        KeyCode::Char('-') | KeyCode::Char('_') => AppEvent::AdjustLength(-1),
        KeyCode::Char('o') => AppEvent::Toggle(Toggle::PopupOnEnd),
        KeyCode::Char('n') => AppEvent::Toggle(Toggle::SoundOnEnd),
        KeyCode::Char('d') => AppEvent::Toggle(Toggle::DisableHotkeysWhenRunning),
        KeyCode::Char('1') => AppEvent::OpenCapture(Action::Start),
        KeyCode::Char('2') => AppEvent::OpenCapture(Action::Stop),
        KeyCode::Char('3') => AppEvent::OpenCapture(Action::Reset),
        KeyCode::Char('q') | KeyCode::Esc => AppEvent::Quit,
        _ => return None,
    };
    Some(event)
}

/// Convert a crossterm key event to capture input. Keys with no hotkey
/// name (media keys, null) yield `None`.
pub fn key_input(key: &KeyEvent) -> Option<KeyInput> {
    let named = |name: &str| Key::Named(name.to_string());
    let code = match key.code {
        KeyCode::Modifier(_) => Key::Modifier,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::F(n) => Key::Named(format!("F{}", n)),
        KeyCode::Enter => named("Enter"),
        KeyCode::Esc => named("Escape"),
        KeyCode::Tab | KeyCode::BackTab => named("Tab"),
        KeyCode::Backspace => named("Backspace"),
        KeyCode::Delete => named("Delete"),
        KeyCode::Insert => named("Insert"),
        KeyCode::Home => named("Home"),
        KeyCode::End => named("End"),
        KeyCode::PageUp => named("PageUp"),
        KeyCode::PageDown => named("PageDown"),
        KeyCode::Up => named("Up"),
        KeyCode::Down => named("Down"),
        KeyCode::Left => named("Left"),
        KeyCode::Right => named("Right"),
        _ => return None,
    };

    let modifiers = key.modifiers;
    Some(KeyInput {
        key: code,
        ctrl: modifiers.contains(KeyModifiers::CONTROL),
        meta: modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::META),
        alt: modifiers.contains(KeyModifiers::ALT),
        shift: modifiers.contains(KeyModifiers::SHIFT),
    })
}

/// Text lines of one frame. The countdown sits on `DISPLAY_ROW`.
pub fn layout(model: &ViewModel) -> Vec<String> {
    let on_off = |flag: bool| if flag { "on" } else { "off" };
    let button = |key: &str, label: &str, enabled: bool| {
        if enabled {
            format!("[{}] {}", key, label)
        } else {
            format!("[ ] {}", label)
        }
    };

    let marker = match model.phase {
        Phase::Idle => "",
        Phase::Running => "RUNNING",
        Phase::Finished => "TIME'S UP",
    };

    let mut lines = vec![
        format!(" {}", TITLE),
        String::new(),
        format!("        {}   {}", model.display, marker)
            .trim_end()
            .to_string(),
        String::new(),
        format!(
            " {}  {}  {}",
            button("s", "Start", model.can_start),
            button("p", "Stop", model.can_stop),
            button("r", "Reset", true)
        ),
        if model.length_editable {
            format!(" [-/+] Length: {} min", model.timer_length)
        } else {
            format!(" Length: {} min (locked while running)", model.timer_length)
        },
        String::new(),
        format!(" [o] Popup on end: {}", on_off(model.popup_on_end)),
        format!(" [n] Sound on end: {}", on_off(model.sound_on_end)),
        format!(
            " [d] Disable hotkeys while running: {}",
            on_off(model.disable_hotkeys_when_running)
        ),
        String::new(),
    ];

    for (index, (action, label)) in model.hotkeys.iter().enumerate() {
        lines.push(format!(" [{}] {} hotkey: {}", index + 1, action_label(*action), label));
    }

    lines.push(String::new());
    lines.push(" [q] Quit".to_string());

    if let Some(capture) = &model.capture {
        lines.push(String::new());
        lines.push(format!(
            " Set {} hotkey: {}",
            action_label(capture.action),
            capture.preview
        ));
        lines.push(format!(
            " {}  [Esc] Cancel",
            button("Enter", "Save", capture.can_confirm)
        ));
    }

    lines
}

fn action_label(action: Action) -> &'static str {
    match action {
        Action::Start => "Start",
        Action::Stop => "Stop",
        Action::Reset => "Reset",
    }
}
