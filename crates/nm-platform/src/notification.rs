//! Notification sink for headless runs.
//! 无界面运行时的通知输出：写入日志。

use std::sync::atomic::{AtomicU64, Ordering};

use nm_core::notification::{Notification, NotificationId, NotificationLevel};
use nm_core::ports::NotificationPort;
use tracing::{error, info, warn};

/// Renders notifications as log events. Persistent ones are logged once and
/// their dismissal is logged at `info`.
#[derive(Debug, Default)]
pub struct TracingNotifier {
    next_id: AtomicU64,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationPort for TracingNotifier {
    fn notify(&self, notification: Notification) -> NotificationId {
        let id = NotificationId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let persistent = notification.is_persistent();
        match notification.level {
            NotificationLevel::Success => {
                info!(target: "nomai::notify", id = id.0, persistent, "{}", notification.message)
            }
            NotificationLevel::Warning => {
                warn!(target: "nomai::notify", id = id.0, persistent, "{}", notification.message)
            }
            NotificationLevel::Error => {
                error!(target: "nomai::notify", id = id.0, persistent, "{}", notification.message)
            }
        }
        id
    }

    fn dismiss(&self, id: NotificationId) {
        info!(target: "nomai::notify", id = id.0, "notification dismissed");
    }
}
