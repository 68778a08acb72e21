mod common;

use std::time::Duration;
use tokio::time::Instant;

use common::{settings, Harness};
use simple_timer::business::{
    ActionSource, AppEvent, Key, KeyInput, Phase, Toggle, ALWAYS_ON_TOP_RELEASE,
};
use simple_timer::data::{Action, SettingValue, SettingsStore, WindowBounds};

fn start(source: ActionSource) -> AppEvent {
    AppEvent::Action(Action::Start, source)
}

#[tokio::test(start_paused = true)]
async fn one_minute_timer_finishes_after_sixty_ticks() {
    let mut h = Harness::new(settings(|s| {
        s.timer_length = 1;
        s.popup_on_end = false;
        s.sound_on_end = true;
    }));
    assert!(h.app.view().shown);
    assert_eq!(h.app.view().last_frame().display, "01:00");

    let started = Instant::now();
    h.send(start(ActionSource::View));
    h.run_until(|app| app.timer().phase() == Phase::Finished)
        .await;

    assert_eq!(started.elapsed(), Duration::from_secs(60));
    assert_eq!(h.app.timer().display(), "00:00");
    assert!(!h.app.is_ticking());

    let shell = h.app.shell();
    assert_eq!(shell.run_status, vec![true, false]);
    assert_eq!(shell.notices.len(), 1);
    assert_eq!(shell.notices[0].title, "Timer Finished!");
    assert!(shell.notices[0].body.contains('1'));
    assert!(!shell.notices[0].silent);
    assert_eq!(shell.alerts, 1);
    assert_eq!(h.app.view().raised, 0);
}

#[tokio::test(start_paused = true)]
async fn finished_timer_pops_up_and_releases_always_on_top() {
    let mut h = Harness::new(settings(|s| {
        s.timer_length = 1;
        s.popup_on_end = true;
        s.sound_on_end = false;
    }));

    h.send(start(ActionSource::Tray));
    h.run_until(|app| app.timer().phase() == Phase::Finished)
        .await;
    assert_eq!(h.app.view().raised, 1);
    assert_eq!(h.app.view().on_top, vec![true]);
    assert!(h.app.view().last_frame().always_on_top);
    assert!(h.app.shell().notices[0].silent);
    assert_eq!(h.app.shell().alerts, 0);

    let finished = Instant::now();
    h.run_until(|app| !app.view_model().always_on_top).await;
    assert_eq!(finished.elapsed(), ALWAYS_ON_TOP_RELEASE);
    assert_eq!(h.app.view().on_top, vec![true, false]);
}

#[tokio::test(start_paused = true)]
async fn hotkeys_are_ignored_while_running_when_disabled() {
    let mut h = Harness::new(settings(|s| s.disable_hotkeys_when_running = true));

    h.send(start(ActionSource::Hotkey));
    assert!(h.app.timer().is_running());

    h.send(AppEvent::Action(Action::Stop, ActionSource::Hotkey));
    h.send(AppEvent::Action(Action::Reset, ActionSource::Hotkey));
    assert!(h.app.timer().is_running());

    h.send(AppEvent::Action(Action::Stop, ActionSource::Tray));
    assert_eq!(h.app.timer().phase(), Phase::Idle);
    assert_eq!(h.app.shell().run_status, vec![true, false]);
}

#[tokio::test(start_paused = true)]
async fn hotkeys_work_while_running_by_default() {
    let mut h = Harness::new(settings(|_| {}));

    h.send(start(ActionSource::Hotkey));
    h.send(AppEvent::Action(Action::Stop, ActionSource::Hotkey));
    assert_eq!(h.app.timer().phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn reset_returns_to_idle_from_every_phase() {
    let mut h = Harness::new(settings(|s| {
        s.timer_length = 1;
        s.popup_on_end = false;
    }));

    h.send(AppEvent::Action(Action::Reset, ActionSource::View));
    assert_eq!(h.app.timer().phase(), Phase::Idle);
    assert_eq!(h.app.timer().remaining(), 60);
    assert!(h.app.shell().run_status.is_empty());

    h.send(start(ActionSource::View));
    h.run_until(|app| app.timer().remaining() == 55).await;
    h.send(AppEvent::Action(Action::Reset, ActionSource::View));
    assert_eq!(h.app.timer().phase(), Phase::Idle);
    assert_eq!(h.app.timer().remaining(), 60);
    assert!(!h.app.is_ticking());
    assert_eq!(h.app.shell().run_status, vec![true, false]);

    h.send(start(ActionSource::View));
    h.run_until(|app| app.timer().phase() == Phase::Finished)
        .await;
    h.send(AppEvent::Action(Action::Start, ActionSource::View));
    assert_eq!(h.app.timer().phase(), Phase::Finished);

    h.send(AppEvent::Action(Action::Reset, ActionSource::View));
    assert_eq!(h.app.timer().phase(), Phase::Idle);
    assert_eq!(h.app.timer().display(), "01:00");
    assert!(h.app.view().last_frame().can_start);
}

#[tokio::test(start_paused = true)]
async fn stale_ticks_do_not_move_the_countdown() {
    let mut h = Harness::new(settings(|s| s.timer_length = 1));

    h.send(start(ActionSource::View));
    let Some(AppEvent::Tick(first)) = h.events.recv().await else {
        panic!("expected a tick");
    };
    h.send(AppEvent::Tick(first));
    assert_eq!(h.app.timer().remaining(), 59);

    h.send(AppEvent::Action(Action::Stop, ActionSource::View));
    h.send(start(ActionSource::View));

    let frames = h.app.view().frames.len();
    h.send(AppEvent::Tick(first));
    assert_eq!(h.app.timer().remaining(), 59);
    assert_eq!(h.app.view().frames.len(), frames);
}

#[tokio::test(start_paused = true)]
async fn length_edits_are_ignored_while_running() {
    let mut h = Harness::new(settings(|s| s.timer_length = 10));

    h.send(start(ActionSource::View));
    h.send(AppEvent::Edit(SettingValue::TimerLength(5)));
    h.send(AppEvent::AdjustLength(1));
    assert_eq!(h.app.settings().timer_length, 10);
    assert_eq!(h.app.timer().length_minutes(), 10);
    assert!(!h.app.view().last_frame().length_editable);

    h.send(AppEvent::Action(Action::Stop, ActionSource::View));
    h.send(AppEvent::Edit(SettingValue::TimerLength(5)));
    assert_eq!(h.app.settings().timer_length, 5);
    assert_eq!(h.app.timer().display(), "05:00");

    h.send(AppEvent::Edit(SettingValue::TimerLength(0)));
    assert_eq!(h.app.settings().timer_length, 5);
}

#[tokio::test(start_paused = true)]
async fn confirmed_capture_reregisters_all_three_hotkeys() {
    let mut h = Harness::new(settings(|_| {}));
    let initial = h.app.shell().registrations.len();
    assert_eq!(initial, 1);

    h.send(AppEvent::OpenCapture(Action::Start));
    h.send(AppEvent::CaptureKey(KeyInput::new(Key::Modifier).ctrl()));
    assert!(!h.app.view().last_frame().capture.as_ref().unwrap().can_confirm);

    // Confirm without a complete chord keeps the dialog open.
    h.send(AppEvent::ConfirmCapture);
    assert!(h.app.capture().is_some());

    h.send(AppEvent::CaptureKey(KeyInput::new(Key::Char('k')).ctrl().alt()));
    h.send(AppEvent::ConfirmCapture);
    assert!(h.app.capture().is_none());

    let registrations = &h.app.shell().registrations;
    assert_eq!(registrations.len(), 2);
    let latest = registrations.last().unwrap();
    assert_eq!(latest.start, "CommandOrControl+Alt+K");
    assert_eq!(latest.stop, "CommandOrControl+Shift+P");
    assert_eq!(latest.reset, "CommandOrControl+Shift+R");
    assert_eq!(h.app.settings().hotkeys, *latest);
}

#[tokio::test(start_paused = true)]
async fn focus_loss_cancels_capture_without_rebinding() {
    let mut h = Harness::new(settings(|_| {}));

    h.send(AppEvent::OpenCapture(Action::Stop));
    h.send(AppEvent::CaptureKey(KeyInput::new(Key::Char('x')).ctrl()));
    h.send(AppEvent::FocusLost);

    assert!(h.app.capture().is_none());
    assert_eq!(h.app.shell().registrations.len(), 1);
    assert_eq!(h.app.settings().hotkeys.stop, "CommandOrControl+Shift+P");
}

#[tokio::test(start_paused = true)]
async fn toggles_flip_settings() {
    let mut h = Harness::new(settings(|s| {
        s.popup_on_end = true;
        s.sound_on_end = true;
    }));

    h.send(AppEvent::Toggle(Toggle::SoundOnEnd));
    h.send(AppEvent::Toggle(Toggle::DisableHotkeysWhenRunning));

    let frame = h.app.view().last_frame();
    assert!(frame.popup_on_end);
    assert!(!frame.sound_on_end);
    assert!(frame.disable_hotkeys_when_running);
}

#[tokio::test(start_paused = true)]
async fn quit_stops_the_loop_and_shutdown_releases_everything() {
    let mut h = Harness::new(settings(|_| {}));
    h.send(start(ActionSource::View));

    assert!(!h.send(AppEvent::Quit));
    h.app.shutdown();

    assert!(!h.app.is_ticking());
    assert!(h.app.shell().shut_down);
    assert!(h.app.view().closed);
}

#[tokio::test(start_paused = true)]
async fn settings_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    let mut h = Harness::with_store(SettingsStore::open(&path));
    h.send(AppEvent::Edit(SettingValue::TimerLength(25)));
    h.send(AppEvent::Toggle(Toggle::PopupOnEnd));
    h.send(AppEvent::OpenCapture(Action::Reset));
    h.send(AppEvent::CaptureKey(KeyInput::new(Key::Named("F5".into())).shift()));
    h.send(AppEvent::ConfirmCapture);
    h.app.shutdown();

    let reopened = SettingsStore::open(&path);
    let settings = reopened.settings();
    assert_eq!(settings.timer_length, 25);
    assert!(!settings.popup_on_end);
    assert_eq!(settings.hotkeys.reset, "Shift+F5");

    let h = Harness::with_store(reopened);
    assert_eq!(h.app.timer().display(), "25:00");
}

#[tokio::test(start_paused = true)]
async fn shutdown_persists_changed_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    let mut h = Harness::with_store(SettingsStore::open(&path));
    let bounds = WindowBounds {
        width: 80,
        height: 24,
        x: None,
        y: None,
    };
    h.send(AppEvent::Refresh);
    h.app.shutdown();
    assert_eq!(SettingsStore::open(&path).settings().window_bounds, WindowBounds::default());

    let mut h = Harness::with_store(SettingsStore::open(&path));
    set_bounds(&mut h, bounds);
    h.app.shutdown();
    assert_eq!(SettingsStore::open(&path).settings().window_bounds, bounds);
}

fn set_bounds(h: &mut Harness, bounds: WindowBounds) {
    h.app.view_mut().bounds = Some(bounds);
}
