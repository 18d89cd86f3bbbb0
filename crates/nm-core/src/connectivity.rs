//! Connectivity signals and the reconnect event.

use chrono::{DateTime, Utc};

/// Raw platform signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivitySignal {
    Online,
    Offline,
}

impl ConnectivitySignal {
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable {
            ConnectivitySignal::Online
        } else {
            ConnectivitySignal::Offline
        }
    }

    pub fn is_online(self) -> bool {
        matches!(self, ConnectivitySignal::Online)
    }
}

/// Broadcast when the device goes from offline back to online.
///
/// 设备从离线恢复在线时广播。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectEvent {
    pub at: DateTime<Utc>,
}
