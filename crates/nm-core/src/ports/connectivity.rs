use crate::connectivity::ConnectivitySignal;

/// Platform source of online/offline transitions.
///
/// The returned receiver yields signals until the source shuts down.
pub trait ConnectivitySignalPort: Send + Sync {
    fn subscribe(&self) -> anyhow::Result<tokio::sync::mpsc::Receiver<ConnectivitySignal>>;
}
