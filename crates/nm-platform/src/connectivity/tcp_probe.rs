//! TCP reachability probe.
//!
//! Periodically opens a connection to the backend host and reports
//! `Online`/`Offline` on transitions. The first probe result is always sent.
//!
//! 周期性地连接后端主机，仅在状态切换时发出信号；首次探测结果总会发出。

use std::time::Duration;

use anyhow::{bail, Context};
use nm_core::connectivity::ConnectivitySignal;
use nm_core::ports::ConnectivitySignalPort;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, Instrument};

const SIGNAL_CHANNEL_CAPACITY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpProbeConfig {
    pub host: String,
    pub port: u16,
    pub interval: Duration,
    pub timeout: Duration,
}

pub struct TcpReachabilityProbe {
    config: TcpProbeConfig,
}

impl TcpReachabilityProbe {
    pub fn new(config: TcpProbeConfig) -> Self {
        Self { config }
    }

    /// One timeout-bounded connection attempt.
    pub async fn probe_once(&self) -> bool {
        probe(&self.config).await
    }
}

async fn probe(config: &TcpProbeConfig) -> bool {
    let connect = TcpStream::connect((config.host.as_str(), config.port));
    match tokio::time::timeout(config.timeout, connect).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(err)) => {
            debug!(error = %err, "probe connection failed");
            false
        }
        Err(_) => {
            debug!(timeout_ms = config.timeout.as_millis() as u64, "probe timed out");
            false
        }
    }
}

async fn run_probe_loop(config: TcpProbeConfig, tx: mpsc::Sender<ConnectivitySignal>) {
    let mut last: Option<bool> = None;
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tx.closed() => break,
        }

        let reachable = probe(&config).await;
        if last == Some(reachable) {
            continue;
        }
        last = Some(reachable);

        let signal = ConnectivitySignal::from_reachable(reachable);
        info!(?signal, "reachability changed");
        if tx.send(signal).await.is_err() {
            break;
        }
    }
    debug!("probe loop stopped");
}

impl ConnectivitySignalPort for TcpReachabilityProbe {
    fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<ConnectivitySignal>> {
        if self.config.host.is_empty() {
            bail!("connectivity probe host is not configured");
        }
        let runtime = tokio::runtime::Handle::try_current()
            .context("connectivity probe requires a tokio runtime")?;

        let (tx, rx) = mpsc::channel(SIGNAL_CHANNEL_CAPACITY);
        let span = info_span!(
            "platform.tcp_probe",
            host = %self.config.host,
            port = self.config.port
        );
        runtime.spawn(run_probe_loop(self.config.clone(), tx).instrument(span));
        Ok(rx)
    }
}
