//! Host liveness pre-check.
//!
//! A quick TCP connect to a couple of common ports, falling back to one
//! system `ping`. The result only drives a warning; scanning proceeds
//! either way.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::timeout;

/// Ports tried before falling back to ping.
pub const DEFAULT_LIVENESS_PORTS: &[u16] = &[80, 443];

/// Liveness check configuration.
#[derive(Debug, Clone)]
pub struct LivenessCheck {
    pub ports: Vec<u16>,
    pub timeout: Duration,
    pub ping: bool,
}

impl LivenessCheck {
    pub fn new(timeout: Duration) -> Self {
        Self {
            ports: DEFAULT_LIVENESS_PORTS.to_vec(),
            timeout,
            ping: true,
        }
    }

    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }

    pub fn without_ping(mut self) -> Self {
        self.ping = false;
        self
    }

    /// Report whether `ip` appears reachable.
    pub async fn is_alive(&self, ip: IpAddr) -> bool {
        for &port in &self.ports {
            let addr = SocketAddr::new(ip, port);
            if let Ok(Ok(_stream)) = timeout(self.timeout, TcpStream::connect(addr)).await {
                tracing::debug!(%ip, port, "host answered on TCP");
                return true;
            }
        }

        if self.ping {
            let alive = ping(ip, self.timeout).await;
            tracing::debug!(%ip, alive, "ping fallback");
            return alive;
        }

        false
    }
}

/// Send one ICMP echo using the system `ping` binary.
async fn ping(ip: IpAddr, wait: Duration) -> bool {
    let wait_secs = wait.as_millis().div_ceil(1000).max(1);

    let mut cmd = Command::new("ping");
    if ip.is_ipv6() {
        cmd.arg("-6");
    }

    #[cfg(target_os = "windows")]
    cmd.args(["-n", "1", "-w", &wait.as_millis().to_string()]);

    #[cfg(not(target_os = "windows"))]
    cmd.args(["-c", "1", "-W", &wait_secs.to_string()]);

    cmd.arg(ip.to_string())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .kill_on_drop(true);

    let deadline = Duration::from_secs(wait_secs as u64) + Duration::from_millis(500);
    match timeout(deadline, cmd.status()).await {
        Ok(Ok(status)) => status.success(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "could not run ping");
            false
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_defaults() {
        let check = LivenessCheck::new(Duration::from_secs(1));
        assert_eq!(check.ports, vec![80, 443]);
        assert!(check.ping);
    }

    #[tokio::test]
    async fn test_alive_when_port_answers() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let check = LivenessCheck::new(Duration::from_millis(500))
            .with_ports(vec![port])
            .without_ping();
        assert!(check.is_alive(LOCALHOST).await);
    }

    #[tokio::test]
    async fn test_not_alive_without_answer_or_ping() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let check = LivenessCheck::new(Duration::from_millis(200))
            .with_ports(vec![port])
            .without_ping();
        assert!(!check.is_alive(LOCALHOST).await);
    }
}
