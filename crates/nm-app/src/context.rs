//! Process-scoped shared state.
//!
//! Created once at startup and injected into every component that needs the
//! connectivity flag, the one-shot initialization guard, or reconnect events.
//!
//! 进程级共享状态：连接状态、一次性初始化标志与重连广播。

use std::sync::atomic::{AtomicBool, Ordering};

use nm_core::connectivity::ReconnectEvent;
use tokio::sync::broadcast;

const RECONNECT_CHANNEL_CAPACITY: usize = 16;

pub struct AppContext {
    online: AtomicBool,
    session_initialized: AtomicBool,
    reconnect_tx: broadcast::Sender<ReconnectEvent>,
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext {
    /// Starts online until the platform says otherwise.
    pub fn new() -> Self {
        let (reconnect_tx, _) = broadcast::channel(RECONNECT_CHANNEL_CAPACITY);
        Self {
            online: AtomicBool::new(true),
            session_initialized: AtomicBool::new(false),
            reconnect_tx,
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub fn subscribe_reconnect(&self) -> broadcast::Receiver<ReconnectEvent> {
        self.reconnect_tx.subscribe()
    }

    /// Claim the session initialization. Returns `true` exactly once.
    pub fn mark_session_initialized(&self) -> bool {
        self.session_initialized
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_session_initialized(&self) -> bool {
        self.session_initialized.load(Ordering::SeqCst)
    }

    /// Written only by the connectivity monitor. Returns whether the value
    /// changed.
    pub(crate) fn set_online(&self, online: bool) -> bool {
        self.online.swap(online, Ordering::SeqCst) != online
    }

    /// Number of receivers that saw the event.
    pub(crate) fn broadcast_reconnect(&self, event: ReconnectEvent) -> usize {
        // No subscribers is not an error.
        self.reconnect_tx.send(event).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn starts_online_and_uninitialized() {
        let context = AppContext::new();
        assert!(context.is_online());
        assert!(!context.is_session_initialized());
    }

    #[test]
    fn initialization_guard_is_one_shot() {
        let context = AppContext::new();
        assert!(context.mark_session_initialized());
        assert!(!context.mark_session_initialized());
        assert!(context.is_session_initialized());
    }

    #[test]
    fn set_online_reports_transitions_only() {
        let context = AppContext::new();
        assert!(!context.set_online(true));
        assert!(context.set_online(false));
        assert!(!context.set_online(false));
        assert!(!context.is_online());
    }

    #[tokio::test]
    async fn reconnect_reaches_subscribers() {
        let context = AppContext::new();
        assert_eq!(context.broadcast_reconnect(ReconnectEvent { at: Utc::now() }), 0);

        let mut rx = context.subscribe_reconnect();
        let event = ReconnectEvent { at: Utc::now() };
        assert_eq!(context.broadcast_reconnect(event), 1);
        assert_eq!(rx.recv().await.unwrap(), event);
    }
}
