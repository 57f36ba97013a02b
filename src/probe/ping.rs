//! Ping probe implementation using the system `ping` / `ping6` command.
//!
//! Only the exit status is interpreted; round-trip times are not parsed.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;

use super::{Check, ProbeError, Verdict};

/// Checks the availability of a host with a single ICMP echo request.
#[derive(Debug, Clone)]
pub struct IcmpCheck {
    pub host: String,
}

impl IcmpCheck {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
        }
    }

    /// IPv6 literals contain a colon, hostnames and IPv4 addresses don't.
    fn is_v6(&self) -> bool {
        self.host.contains(':')
    }

    fn executable(&self) -> &'static str {
        if self.is_v6() {
            "ping6"
        } else {
            "ping"
        }
    }

    fn kind(&self) -> &'static str {
        if self.is_v6() {
            "ICMPv6"
        } else {
            "ICMP"
        }
    }
}

#[async_trait]
impl Check for IcmpCheck {
    async fn execute(&self, timeout: Duration) -> Verdict {
        let start = Instant::now();
        let result = run_ping_command(self.executable(), &self.host, timeout).await;

        if let Err(e) = &result {
            tracing::debug!("{} failed: {}", self.name(), e);
        }

        Verdict::new(result.is_ok(), start.elapsed()).with_hint(self.kind())
    }

    fn name(&self) -> String {
        format!("{} {}", self.kind(), self.host)
    }
}

/// Run one echo request via the given ping executable, bounded by `timeout`.
///
/// The child is killed if the timeout fires first.
async fn run_ping_command(exe: &str, host: &str, timeout: Duration) -> Result<(), ProbeError> {
    let mut child = Command::new(exe)
        .args(["-c", "1", host])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ProbeError::Command(format!("failed to execute {}: {}", exe, e)))?;

    let status = tokio::time::timeout(timeout, child.wait())
        .await
        .map_err(|_| ProbeError::Timeout(timeout))?
        .map_err(|e| ProbeError::Command(format!("failed to wait for {}: {}", exe, e)))?;

    if !status.success() {
        return Err(ProbeError::Command(format!("{} exited with {}", exe, status)));
    }

    Ok(())
}
