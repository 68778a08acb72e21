//! Recording fakes for driving the application without a desktop.

#![allow(dead_code)]

use anyhow::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use simple_timer::business::{App, AppEvent};
use simple_timer::data::{HotkeyMap, Settings, SettingsStore, WindowBounds};
use simple_timer::platform::{Notice, Shell};
use simple_timer::ui::{View, ViewModel};

#[derive(Debug, Default)]
pub struct RecordingShell {
    pub run_status: Vec<bool>,
    pub notices: Vec<Notice>,
    pub registrations: Vec<HotkeyMap>,
    pub alerts: usize,
    pub shut_down: bool,
}

impl Shell for RecordingShell {
    fn report_run_status(&mut self, running: bool) {
        self.run_status.push(running);
    }

    fn report_timer_ended(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }

    fn reregister_hotkeys(&mut self, hotkeys: &HotkeyMap) {
        self.registrations.push(hotkeys.clone());
    }

    fn play_alert(&mut self) {
        self.alerts += 1;
    }

    fn shutdown(&mut self) {
        self.shut_down = true;
    }
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub shown: bool,
    pub frames: Vec<ViewModel>,
    pub raised: usize,
    pub on_top: Vec<bool>,
    pub bounds: Option<WindowBounds>,
    pub closed: bool,
}

impl RecordingView {
    pub fn last_frame(&self) -> &ViewModel {
        self.frames.last().expect("at least one frame")
    }
}

impl View for RecordingView {
    fn show(&mut self) -> Result<()> {
        self.shown = true;
        Ok(())
    }

    fn render(&mut self, model: &ViewModel) -> Result<()> {
        self.frames.push(model.clone());
        Ok(())
    }

    fn raise(&mut self) {
        self.raised += 1;
    }

    fn set_always_on_top(&mut self, on_top: bool) {
        self.on_top.push(on_top);
    }

    fn bounds(&self) -> Option<WindowBounds> {
        self.bounds
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

pub struct Harness {
    pub app: App<RecordingShell, RecordingView>,
    pub events: UnboundedReceiver<AppEvent>,
}

impl Harness {
    pub fn new(settings: Settings) -> Self {
        Self::with_store(SettingsStore::in_memory(settings))
    }

    pub fn with_store(store: SettingsStore) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let mut app = App::new(store, RecordingShell::default(), RecordingView::default(), tx);
        app.launch().expect("launch");
        Self { app, events }
    }

    pub fn send(&mut self, event: AppEvent) -> bool {
        self.app.handle(event)
    }

    /// Deliver queued events until `done` holds. Paused tokio time
    /// auto-advances while waiting.
    pub async fn run_until(&mut self, done: impl Fn(&App<RecordingShell, RecordingView>) -> bool) {
        while !done(&self.app) {
            let event = self.events.recv().await.expect("event channel open");
            self.app.handle(event);
        }
    }
}

pub fn settings(edit: impl FnOnce(&mut Settings)) -> Settings {
    let mut settings = Settings::default();
    edit(&mut settings);
    settings
}
