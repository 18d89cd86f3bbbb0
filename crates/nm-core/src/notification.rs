//! User-facing notifications raised by the core.
//!
//! The sink is fire-and-forget; nothing in the core waits on display.

use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

impl NotificationLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        }
    }
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long a notification stays visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationDuration {
    Transient(Duration),
    /// Visible until dismissed.
    Persistent,
}

/// Handle returned by the sink, used to dismiss persistent notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub duration: NotificationDuration,
}

const DEFAULT_TRANSIENT: Duration = Duration::from_secs(3);

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
            duration: NotificationDuration::Transient(DEFAULT_TRANSIENT),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
            duration: NotificationDuration::Transient(Duration::from_secs(5)),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            duration: NotificationDuration::Transient(DEFAULT_TRANSIENT),
        }
    }

    pub fn persistent_error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            duration: NotificationDuration::Persistent,
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self.duration, NotificationDuration::Persistent)
    }
}
