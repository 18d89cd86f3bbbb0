mod tcp_probe;

pub use tcp_probe::{TcpProbeConfig, TcpReachabilityProbe};
