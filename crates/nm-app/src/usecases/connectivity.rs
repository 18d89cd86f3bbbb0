//! Connectivity monitor.
//!
//! Sole writer of the process-wide online flag. Observes platform signals,
//! raises notifications on transitions and broadcasts reconnects.

use std::sync::{Arc, Mutex};

use nm_core::connectivity::{ConnectivitySignal, ReconnectEvent};
use nm_core::notification::{Notification, NotificationId};
use nm_core::ports::{ClockPort, ConnectivitySignalPort, NotificationPort};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::context::AppContext;

const ONLINE_MESSAGE: &str = "Back online";
const OFFLINE_MESSAGE: &str = "You are offline. Some features may be unavailable.";

pub struct ConnectivityMonitor {
    context: Arc<AppContext>,
    notifier: Arc<dyn NotificationPort>,
    clock: Arc<dyn ClockPort>,
    offline_notice: Mutex<Option<NotificationId>>,
}

impl ConnectivityMonitor {
    pub fn new(
        context: Arc<AppContext>,
        notifier: Arc<dyn NotificationPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            context,
            notifier,
            clock,
            offline_notice: Mutex::new(None),
        }
    }

    /// Apply one platform signal. Returns `false` when the signal did not
    /// change the connectivity state.
    pub fn handle_signal(&self, signal: ConnectivitySignal) -> bool {
        if !self.context.set_online(signal.is_online()) {
            debug!(?signal, "connectivity unchanged");
            return false;
        }

        match signal {
            ConnectivitySignal::Online => {
                info!("connectivity restored");
                if let Some(id) = self.take_offline_notice() {
                    self.notifier.dismiss(id);
                }
                self.notifier.notify(Notification::success(ONLINE_MESSAGE));
                let receivers = self.context.broadcast_reconnect(ReconnectEvent {
                    at: self.clock.now(),
                });
                debug!(receivers, "reconnect broadcast");
            }
            ConnectivitySignal::Offline => {
                warn!("connectivity lost");
                let id = self
                    .notifier
                    .notify(Notification::persistent_error(OFFLINE_MESSAGE));
                if let Some(previous) = self.replace_offline_notice(id) {
                    self.notifier.dismiss(previous);
                }
            }
        }
        true
    }

    /// Consume signals until the source closes.
    pub async fn run(&self, mut signals: mpsc::Receiver<ConnectivitySignal>) {
        while let Some(signal) = signals.recv().await {
            self.handle_signal(signal);
        }
        debug!("connectivity signal source closed");
    }

    /// Subscribe to `source` and drive the monitor on a background task.
    pub fn spawn(
        self: &Arc<Self>,
        source: &dyn ConnectivitySignalPort,
    ) -> anyhow::Result<JoinHandle<()>> {
        let signals = source.subscribe()?;
        let monitor = Arc::clone(self);
        Ok(tokio::spawn(
            async move { monitor.run(signals).await }
                .instrument(info_span!("usecase.connectivity_monitor.run")),
        ))
    }

    pub fn is_online(&self) -> bool {
        self.context.is_online()
    }

    fn take_offline_notice(&self) -> Option<NotificationId> {
        match self.offline_notice.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    fn replace_offline_notice(&self, id: NotificationId) -> Option<NotificationId> {
        match self.offline_notice.lock() {
            Ok(mut guard) => guard.replace(id),
            Err(poisoned) => poisoned.into_inner().replace(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use mockall::predicate::eq;
    use nm_core::notification::NotificationLevel;

    mockall::mock! {
        pub Notifier {}

        impl NotificationPort for Notifier {
            fn notify(&self, notification: Notification) -> NotificationId;
            fn dismiss(&self, id: NotificationId);
        }
    }

    struct FixedClock(DateTime<Utc>);

    impl ClockPort for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn offline_then_online_raises_persistent_then_transient_notice() {
        let mut notifier = MockNotifier::new();
        let mut seq = mockall::Sequence::new();
        notifier
            .expect_notify()
            .withf(|n| n.level == NotificationLevel::Error && n.is_persistent())
            .times(1)
            .in_sequence(&mut seq)
            .return_const(NotificationId(7));
        notifier
            .expect_dismiss()
            .with(eq(NotificationId(7)))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        notifier
            .expect_notify()
            .withf(|n| n.level == NotificationLevel::Success && !n.is_persistent())
            .times(1)
            .in_sequence(&mut seq)
            .return_const(NotificationId(8));

        let context = Arc::new(AppContext::new());
        let monitor = ConnectivityMonitor::new(context.clone(), Arc::new(notifier), fixed_clock());
        let mut reconnects = context.subscribe_reconnect();

        assert!(monitor.handle_signal(ConnectivitySignal::Offline));
        assert!(!context.is_online());
        assert!(monitor.handle_signal(ConnectivitySignal::Online));
        assert!(context.is_online());

        let event = reconnects.recv().await.unwrap();
        assert_eq!(event.at, Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn repeated_signals_are_ignored() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();
        notifier.expect_dismiss().never();

        let context = Arc::new(AppContext::new());
        let monitor = ConnectivityMonitor::new(context.clone(), Arc::new(notifier), fixed_clock());
        let mut reconnects = context.subscribe_reconnect();

        assert!(!monitor.handle_signal(ConnectivitySignal::Online));
        assert!(!monitor.handle_signal(ConnectivitySignal::Online));
        assert!(reconnects.try_recv().is_err());
    }

    #[tokio::test]
    async fn run_drains_signal_channel() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(2).return_const(NotificationId(1));
        notifier.expect_dismiss().times(1).return_const(());

        let context = Arc::new(AppContext::new());
        let monitor = ConnectivityMonitor::new(context.clone(), Arc::new(notifier), fixed_clock());
        let (tx, rx) = mpsc::channel(4);
        tx.send(ConnectivitySignal::Offline).await.unwrap();
        tx.send(ConnectivitySignal::Offline).await.unwrap();
        tx.send(ConnectivitySignal::Online).await.unwrap();
        drop(tx);

        monitor.run(rx).await;

        assert!(context.is_online());
    }
}
