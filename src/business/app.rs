//! Application Context
//!
//! The single owner of timer, tick source, settings bridge, capture session,
//! shell and view. Every input (hotkeys, tray clicks, key presses, ticks,
//! delayed callbacks) arrives as an [`AppEvent`] on one queue and is applied
//! here in order, followed by one render.

use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::business::{
    display_label, CaptureSession, KeyInput, Phase, SettingsBridge, Ticker, Timer, TimerCommand,
    TimerEffect,
};
use crate::data::{Action, SettingValue, Settings, SettingsStore};
use crate::platform::{Notice, Shell};
use crate::ui::{CaptureView, View, ViewModel};

/// How long a popped-up view stays on top.
pub const ALWAYS_ON_TOP_RELEASE: Duration = Duration::from_secs(3);

/// Upper bound for length changes made with the +/- keys.
pub const MAX_TIMER_LENGTH: u32 = 999;

/// Where an action request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSource {
    Hotkey,
    Tray,
    View,
}

/// A boolean setting flipped from the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    PopupOnEnd,
    SoundOnEnd,
    DisableHotkeysWhenRunning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Action(Action, ActionSource),
    /// One second elapsed on the tick source of the given generation.
    Tick(u64),
    Edit(SettingValue),
    /// Change the timer length by this many minutes.
    AdjustLength(i32),
    Toggle(Toggle),
    OpenCapture(Action),
    CaptureKey(KeyInput),
    ConfirmCapture,
    CancelCapture,
    FocusLost,
    ReleaseAlwaysOnTop,
    ShowWindow,
    Refresh,
    Quit,
}

pub struct App<S: Shell, V: View> {
    timer: Timer,
    ticker: Ticker,
    bridge: SettingsBridge,
    capture: Option<CaptureSession>,
    shell: S,
    view: V,
    events: UnboundedSender<AppEvent>,
    always_on_top: bool,
    on_top_release: Option<JoinHandle<()>>,
}

impl<S: Shell, V: View> App<S, V> {
    /// Load settings, build the timer from them and register hotkeys.
    pub fn new(
        store: SettingsStore,
        mut shell: S,
        view: V,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        let bridge = SettingsBridge::new(store);
        let timer = Timer::new(bridge.settings().timer_length);
        shell.reregister_hotkeys(&bridge.settings().hotkeys);

        Self {
            timer,
            ticker: Ticker::new(events.clone()),
            bridge,
            capture: None,
            shell,
            view,
            events,
            always_on_top: false,
            on_top_release: None,
        }
    }

    /// Show the view once the first frame is ready.
    pub fn launch(&mut self) -> Result<()> {
        self.view.show()?;
        self.render();
        tracing::info!("Timer ready at {}", self.timer.display());
        Ok(())
    }

    /// Apply one event. Returns `false` once the application should exit.
    pub fn handle(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Action(action, source) => self.dispatch(action, source),
            AppEvent::Tick(generation) => {
                if !self.ticker.accepts(generation) {
                    tracing::debug!("Dropping stale tick from source {}", generation);
                    return true;
                }
                self.run(TimerCommand::Tick);
            }
            AppEvent::Edit(value) => self.edit(value),
            AppEvent::AdjustLength(delta) => {
                let minutes = (i64::from(self.settings().timer_length) + i64::from(delta))
                    .clamp(1, i64::from(MAX_TIMER_LENGTH)) as u32;
                self.edit(SettingValue::TimerLength(minutes));
            }
            AppEvent::Toggle(toggle) => {
                let settings = self.settings();
                let value = match toggle {
                    Toggle::PopupOnEnd => SettingValue::PopupOnEnd(!settings.popup_on_end),
                    Toggle::SoundOnEnd => SettingValue::SoundOnEnd(!settings.sound_on_end),
                    Toggle::DisableHotkeysWhenRunning => SettingValue::DisableHotkeysWhenRunning(
                        !settings.disable_hotkeys_when_running,
                    ),
                };
                self.edit(value);
            }
            AppEvent::OpenCapture(action) => self.capture = Some(CaptureSession::open(action)),
            AppEvent::CaptureKey(input) => {
                if let Some(session) = self.capture.as_mut() {
                    session.feed(&input);
                }
            }
            AppEvent::ConfirmCapture => self.confirm_capture(),
            AppEvent::CancelCapture | AppEvent::FocusLost => {
                if self.capture.take().is_some() {
                    tracing::debug!("Hotkey capture cancelled");
                }
            }
            AppEvent::ReleaseAlwaysOnTop => {
                self.on_top_release = None;
                self.set_always_on_top(false);
            }
            AppEvent::ShowWindow => self.view.raise(),
            AppEvent::Refresh => {}
            AppEvent::Quit => {
                tracing::info!("Quit requested");
                return false;
            }
        }

        self.render();
        true
    }

    /// Cancel pending work, persist the view bounds and release the shell.
    pub fn shutdown(&mut self) {
        self.ticker.cancel();
        if let Some(task) = self.on_top_release.take() {
            task.abort();
        }
        if let Some(bounds) = self.view.bounds() {
            self.bridge.save_window_bounds(bounds);
        }
        self.shell.shutdown();
        self.view.close();
        tracing::info!("Shut down");
    }

    pub fn view_model(&self) -> ViewModel {
        let settings = self.settings();
        let running = self.timer.is_running();

        ViewModel {
            display: self.timer.display(),
            phase: self.timer.phase(),
            can_start: self.timer.phase() == Phase::Idle,
            can_stop: running,
            length_editable: !running,
            timer_length: settings.timer_length,
            popup_on_end: settings.popup_on_end,
            sound_on_end: settings.sound_on_end,
            disable_hotkeys_when_running: settings.disable_hotkeys_when_running,
            hotkeys: settings
                .hotkeys
                .iter()
                .map(|(action, descriptor)| (action, display_label(descriptor)))
                .collect(),
            capture: self.capture.as_ref().map(|session| CaptureView {
                action: session.action(),
                preview: session.preview(),
                can_confirm: session.can_confirm(),
            }),
            always_on_top: self.always_on_top,
        }
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn settings(&self) -> &Settings {
        self.bridge.settings()
    }

    pub fn capture(&self) -> Option<&CaptureSession> {
        self.capture.as_ref()
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_active()
    }

    fn dispatch(&mut self, action: Action, source: ActionSource) {
        if source == ActionSource::Hotkey
            && self.settings().disable_hotkeys_when_running
            && self.timer.is_running()
        {
            tracing::debug!("Hotkey {} suppressed while running", action);
            return;
        }

        tracing::info!("{} requested from {:?}", action, source);
        let command = match action {
            Action::Start => TimerCommand::Start,
            Action::Stop => TimerCommand::Stop,
            Action::Reset => TimerCommand::Reset,
        };
        self.run(command);
    }

    fn edit(&mut self, value: SettingValue) {
        if let SettingValue::TimerLength(minutes) = value {
            if self.timer.is_running() {
                tracing::debug!("Ignoring length change while running");
                return;
            }
            if minutes == 0 {
                tracing::debug!("Ignoring zero timer length");
                return;
            }
            self.bridge.update(value, &mut self.shell);
            self.run(TimerCommand::SetLength(minutes));
            return;
        }

        self.bridge.update(value, &mut self.shell);
    }

    fn confirm_capture(&mut self) {
        if !self.capture.as_ref().is_some_and(CaptureSession::can_confirm) {
            return;
        }
        if let Some((action, chord)) = self.capture.take().and_then(CaptureSession::confirm) {
            self.bridge.bind_hotkey(action, &chord, &mut self.shell);
        }
    }

    fn run(&mut self, command: TimerCommand) {
        for effect in self.timer.apply(command) {
            match effect {
                TimerEffect::StartTicking => {
                    self.ticker.start();
                }
                TimerEffect::StopTicking => self.ticker.cancel(),
                TimerEffect::RunStatus(running) => {
                    tracing::info!("Timer {}", if running { "running" } else { "stopped" });
                    self.shell.report_run_status(running);
                }
                TimerEffect::Ended { minutes } => self.finished(minutes),
            }
        }
    }

    fn finished(&mut self, minutes: u32) {
        tracing::info!("{} minute timer finished", minutes);
        let popup = self.settings().popup_on_end;
        let sound = self.settings().sound_on_end;

        self.shell
            .report_timer_ended(&Notice::timer_ended(minutes, sound));

        if popup {
            self.view.raise();
            self.set_always_on_top(true);
            self.schedule_on_top_release();
        }

        if sound {
            self.shell.play_alert();
        }
    }

    fn set_always_on_top(&mut self, on_top: bool) {
        self.always_on_top = on_top;
        self.view.set_always_on_top(on_top);
    }

    fn schedule_on_top_release(&mut self) {
        if let Some(task) = self.on_top_release.take() {
            task.abort();
        }
        let events = self.events.clone();
        self.on_top_release = Some(tokio::spawn(async move {
            tokio::time::sleep(ALWAYS_ON_TOP_RELEASE).await;
            let _ = events.send(AppEvent::ReleaseAlwaysOnTop);
        }));
    }

    fn render(&mut self) {
        let model = self.view_model();
        if let Err(e) = self.view.render(&model) {
            tracing::warn!("Failed to render timer: {}", e);
        }
    }
}

impl<S: Shell, V: View> Drop for App<S, V> {
    fn drop(&mut self) {
        if let Some(task) = self.on_top_release.take() {
            task.abort();
        }
    }
}
