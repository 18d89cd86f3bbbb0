use crate::notification::{Notification, NotificationId};

/// Fire-and-forget notification sink.
///
/// 通知输出端：只负责展示，不被核心等待。
pub trait NotificationPort: Send + Sync {
    fn notify(&self, notification: Notification) -> NotificationId;

    /// Dismiss a persistent notification. Unknown ids are ignored.
    fn dismiss(&self, id: NotificationId);
}

