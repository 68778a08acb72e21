//! Desktop notifications via `notify-rust`

use anyhow::Result;
use notify_rust::Notification;

use crate::platform::Notice;

const APP_NAME: &str = "Simple Timer";

pub struct DesktopNotifier {
    supported: bool,
}

impl DesktopNotifier {
    /// Check the host once for a notification service.
    pub fn new() -> Self {
        let supported = detect_support();
        if !supported {
            tracing::debug!("Desktop notifications are not supported on this host");
        }
        Self { supported }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn notify(&self, notice: &Notice) -> Result<()> {
        let mut notification = Notification::new();
        notification
            .summary(&notice.title)
            .body(&notice.body)
            .appname(APP_NAME);

        #[cfg(all(unix, not(target_os = "macos")))]
        if notice.silent {
            notification.hint(notify_rust::Hint::SuppressSound(true));
        }

        #[cfg(target_os = "macos")]
        if !notice.silent {
            notification.sound_name("Glass");
        }

        notification.show()?;
        tracing::info!("Notification shown: {}", notice.body);
        Ok(())
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn detect_support() -> bool {
    notify_rust::get_server_information().is_ok()
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn detect_support() -> bool {
    true
}
