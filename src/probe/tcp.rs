//! TCP probe implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::TcpStream;

use super::{Check, ProbeError, Verdict};

/// Checks if a TCP handshake can be made.
#[derive(Debug, Clone)]
pub struct TcpCheck {
    pub host: String,
    pub port: u16,
}

impl TcpCheck {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }
}

#[async_trait]
impl Check for TcpCheck {
    async fn execute(&self, timeout: Duration) -> Verdict {
        let start = Instant::now();
        let result = run_tcp_probe(&self.host, self.port, timeout).await;

        if let Err(e) = &result {
            tracing::debug!("{} failed: {}", self.name(), e);
        }

        Verdict::new(result.is_ok(), start.elapsed()).with_hint(&format!("TCP/{}", self.port))
    }

    fn name(&self) -> String {
        format!("TCP {}:{}", self.host, self.port)
    }
}

/// Open a connection to `host:port` and close it again.
async fn run_tcp_probe(host: &str, port: u16, timeout: Duration) -> Result<(), ProbeError> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
        .await
        .map_err(|_| ProbeError::Timeout(timeout))?
        .map_err(|e| ProbeError::Network(e.to_string()))?;

    drop(stream);
    Ok(())
}
