//! System Tray
//!
//! Tray icon with Show/Start/Stop/Reset/Quit menu. Menu clicks and a
//! double-click on the icon are forwarded to the application event queue;
//! the tooltip mirrors the run status. Must be created on the thread that
//! runs the native event loop.

use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;
use tray_icon::{
    menu::{Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem},
    TrayIcon, TrayIconBuilder, TrayIconEvent,
};

use crate::business::{ActionSource, AppEvent};
use crate::data::Action;

const TOOLTIP_RUNNING: &str = "Simple Timer - Running";
const TOOLTIP_STOPPED: &str = "Simple Timer - Stopped";

pub struct SystemTray {
    tray_icon: TrayIcon,
}

struct MenuIds {
    show: MenuId,
    start: MenuId,
    stop: MenuId,
    reset: MenuId,
    quit: MenuId,
}

impl MenuIds {
    fn event_for(&self, id: &MenuId) -> Option<AppEvent> {
        let event = if *id == self.show {
            AppEvent::ShowWindow
        } else if *id == self.start {
            AppEvent::Action(Action::Start, ActionSource::Tray)
        } else if *id == self.stop {
            AppEvent::Action(Action::Stop, ActionSource::Tray)
        } else if *id == self.reset {
            AppEvent::Action(Action::Reset, ActionSource::Tray)
        } else if *id == self.quit {
            AppEvent::Quit
        } else {
            return None;
        };
        Some(event)
    }
}

/// Double-clicking the icon brings the timer forward.
fn icon_event(event: &TrayIconEvent) -> Option<AppEvent> {
    match event {
        TrayIconEvent::DoubleClick { .. } => Some(AppEvent::ShowWindow),
        _ => None,
    }
}

impl SystemTray {
    /// Create the tray icon and start forwarding its events to `events`.
    pub fn new(events: UnboundedSender<AppEvent>) -> Result<Self> {
        let icon = load_icon()?;
        let menu = Menu::new();

        let show_item = MenuItem::new("Show Timer", true, None);
        let start_item = MenuItem::new("Start Timer", true, None);
        let stop_item = MenuItem::new("Stop Timer", true, None);
        let reset_item = MenuItem::new("Reset Timer", true, None);
        let separator = PredefinedMenuItem::separator();
        let quit_item = MenuItem::new("Quit", true, None);

        let ids = MenuIds {
            show: show_item.id().clone(),
            start: start_item.id().clone(),
            stop: stop_item.id().clone(),
            reset: reset_item.id().clone(),
            quit: quit_item.id().clone(),
        };

        menu.append(&show_item)?;
        menu.append(&start_item)?;
        menu.append(&stop_item)?;
        menu.append(&reset_item)?;
        menu.append(&separator)?;
        menu.append(&quit_item)?;

        let tray_icon = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip(TOOLTIP_STOPPED)
            .with_icon(icon)
            .build()?;

        tracing::info!("System tray initialized");

        let menu_events = events.clone();
        MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
            if let Some(app_event) = ids.event_for(&event.id) {
                tracing::debug!("Tray menu: {:?}", app_event);
                let _ = menu_events.send(app_event);
            }
        }));

        TrayIconEvent::set_event_handler(Some(move |event: TrayIconEvent| {
            if let Some(app_event) = icon_event(&event) {
                let _ = events.send(app_event);
            }
        }));

        Ok(Self { tray_icon })
    }

    /// Update the tooltip for the current run status.
    pub fn set_running(&self, running: bool) {
        let tooltip = if running {
            TOOLTIP_RUNNING
        } else {
            TOOLTIP_STOPPED
        };
        if let Err(e) = self.tray_icon.set_tooltip(Some(tooltip)) {
            tracing::warn!("Failed to update tray tooltip: {}", e);
        }
    }
}

impl Drop for SystemTray {
    fn drop(&mut self) {
        MenuEvent::set_event_handler(None::<fn(MenuEvent)>);
        TrayIconEvent::set_event_handler(None::<fn(TrayIconEvent)>);
    }
}

/// Draw the tray icon: a round clock face with two hands.
fn load_icon() -> Result<tray_icon::Icon> {
    let width = 32u32;
    let height = 32u32;
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);

    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let radius = (width.min(height) as f32 / 2.0) - 1.0;

    // Warm gradient (orange to red)
    let color_start = (251u8, 146u8, 60u8);
    let color_end = (220u8, 38u8, 38u8);

    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - center_x;
            let dy = y as f32 - center_y;
            let dist = (dx * dx + dy * dy).sqrt();

            if dist <= radius {
                let gradient_t = ((x as f32 / width as f32) + (y as f32 / height as f32)) / 2.0;
                let mix = |a: u8, b: u8| (a as f32 * (1.0 - gradient_t) + b as f32 * gradient_t) as u8;

                // Soft edge anti-aliasing
                let alpha = if dist > radius - 1.5 {
                    ((radius - dist + 1.5) / 1.5 * 255.0) as u8
                } else {
                    255
                };

                rgba.extend_from_slice(&[
                    mix(color_start.0, color_end.0),
                    mix(color_start.1, color_end.1),
                    mix(color_start.2, color_end.2),
                    alpha,
                ]);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }

    let cx = center_x as i32;
    let cy = center_y as i32;
    let mut paint = |x: i32, y: i32| {
        let idx = (y as u32 * width + x as u32) as usize * 4;
        if idx + 3 < rgba.len() {
            rgba[idx..idx + 4].copy_from_slice(&[255, 255, 255, 255]);
        }
    };

    // Minute hand, pointing up
    for dy in -10..=0 {
        paint(cx, cy + dy);
        paint(cx - 1, cy + dy);
    }
    // Hour hand, pointing right
    for dx in 0..=7 {
        paint(cx + dx, cy);
        paint(cx + dx, cy - 1);
    }

    let icon = tray_icon::Icon::from_rgba(rgba, width, height)?;
    Ok(icon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tray_icon::{MouseButton, MouseButtonState, Rect, TrayIconId};

    fn ids() -> MenuIds {
        MenuIds {
            show: MenuId::new("show"),
            start: MenuId::new("start"),
            stop: MenuId::new("stop"),
            reset: MenuId::new("reset"),
            quit: MenuId::new("quit"),
        }
    }

    #[test]
    fn menu_items_map_to_tray_actions() {
        let ids = ids();
        assert_eq!(ids.event_for(&MenuId::new("show")), Some(AppEvent::ShowWindow));
        assert_eq!(
            ids.event_for(&MenuId::new("stop")),
            Some(AppEvent::Action(Action::Stop, ActionSource::Tray))
        );
        assert_eq!(ids.event_for(&MenuId::new("quit")), Some(AppEvent::Quit));
        assert_eq!(ids.event_for(&MenuId::new("other")), None);
    }

    #[test]
    fn double_click_shows_the_timer() {
        let rect = Rect::default();
        let double_click = TrayIconEvent::DoubleClick {
            id: TrayIconId::new("timer"),
            position: rect.position,
            rect,
            button: MouseButton::Left,
        };
        assert_eq!(icon_event(&double_click), Some(AppEvent::ShowWindow));

        let single_click = TrayIconEvent::Click {
            id: TrayIconId::new("timer"),
            position: rect.position,
            rect,
            button: MouseButton::Left,
            button_state: MouseButtonState::Up,
        };
        assert_eq!(icon_event(&single_click), None);
    }
}
