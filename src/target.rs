//! Target parsing.
//!
//! Turns `[label=]<host>[:port]` specifications into [`Target`]s with their
//! checks attached.

use std::fmt;
use std::net::{IpAddr, Ipv6Addr, SocketAddrV4};
use std::sync::Arc;

use thiserror::Error;

use crate::probe::{Check, CheckGroup, IcmpCheck, TcpCheck};

/// Configuration errors, all detected before any target is watched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("not a valid port: {0}")]
    InvalidDefaultPort(i64),
    #[error("not a valid target: {0}")]
    InvalidTarget(String),
    #[error("invalid port: {0}")]
    InvalidPort(String),
    #[error("unable to parse host/port: {0}")]
    UnparsableAddress(String),
    #[error("no checks requested")]
    NoChecks,
}

/// Which kinds of checks each target gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSelection {
    pub tcp: bool,
    pub icmp: bool,
}

impl Default for CheckSelection {
    fn default() -> Self {
        Self {
            tcp: true,
            icmp: true,
        }
    }
}

/// A single host that needs to be checked for packetloss.
pub struct Target {
    /// Canonical address or hostname
    pub host: String,
    /// Optional label, empty if unset
    pub label: String,
    /// Port used by the TCP check
    pub port: u16,
    /// Check that determines whether the target is online
    pub check: Box<dyn Check>,
}

impl Target {
    /// Unique identifier of the target.
    pub fn id(&self) -> &str {
        &self.host
    }

    pub fn title(&self) -> String {
        if self.label.is_empty() {
            self.host.clone()
        } else {
            format!("{} ({})", self.host, self.label)
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("host", &self.host)
            .field("label", &self.label)
            .field("port", &self.port)
            .field("check", &self.check.name())
            .finish()
    }
}

/// Parse all target specifications, in order.
///
/// Fails on the first invalid entry; a port of 0 (or none) falls back to
/// `default_port`.
pub fn parse_targets(
    specs: &[String],
    default_port: i64,
    selection: CheckSelection,
) -> Result<Vec<Target>, ConfigError> {
    let default_port =
        u16::try_from(default_port).map_err(|_| ConfigError::InvalidDefaultPort(default_port))?;

    specs
        .iter()
        .map(|spec| parse_target(spec, default_port, selection))
        .collect()
}

fn parse_target(
    spec: &str,
    default_port: u16,
    selection: CheckSelection,
) -> Result<Target, ConfigError> {
    // Extract the label first
    let (label, address) = match spec.matches('=').count() {
        0 => ("", spec),
        1 => spec.split_once('=').unwrap_or(("", spec)),
        _ => return Err(ConfigError::InvalidTarget(spec.to_string())),
    };

    let (host, port) = parse_address(address)?;
    if host.is_empty() {
        return Err(ConfigError::InvalidTarget(spec.to_string()));
    }
    let port = if port == 0 { default_port } else { port };

    let mut checks: Vec<Arc<dyn Check>> = Vec::new();
    if selection.tcp {
        checks.push(Arc::new(TcpCheck::new(&host, port)));
    }
    if selection.icmp {
        checks.push(Arc::new(IcmpCheck::new(&host)));
    }

    Ok(Target {
        host,
        label: label.to_string(),
        port,
        check: Box::new(CheckGroup::new(checks)?),
    })
}

/// Split a target without label into host and port, 0 if no port is given.
///
/// IP literals are returned in canonical form, hostnames as given. IPv6
/// zones (`fe80::1%eth0`) are kept.
pub fn parse_address(address: &str) -> Result<(String, u16), ConfigError> {
    // Just an IP address
    if let Some(ip) = parse_ip(address) {
        return Ok((ip, 0));
    }

    // An IPv6 address with port
    if let Some((ip, port)) = address
        .strip_prefix('[')
        .and_then(|rest| rest.split_once("]:"))
    {
        let ip = parse_ip(ip).filter(|ip| ip.contains(':'));
        if let (Some(ip), Ok(port)) = (ip, port.parse::<u16>()) {
            return Ok((ip, port));
        }
    }

    // An IPv4 address with port
    if let Ok(socket) = address.parse::<SocketAddrV4>() {
        return Ok((socket.ip().to_string(), socket.port()));
    }

    // A hostname...
    match address.matches(':').count() {
        // ...without port
        0 => Ok((address.to_string(), 0)),
        // ...with port
        1 => {
            let (host, port) = address.split_once(':').unwrap_or((address, ""));
            let port = port
                .parse::<i64>()
                .ok()
                .and_then(|p| u16::try_from(p).ok())
                .ok_or_else(|| ConfigError::InvalidPort(port.to_string()))?;
            Ok((host.to_string(), port))
        }
        _ => Err(ConfigError::UnparsableAddress(address.to_string())),
    }
}

/// Canonical form of an IP literal, with the zone of an IPv6 address
/// re-attached.
fn parse_ip(literal: &str) -> Option<String> {
    match literal.split_once('%') {
        None => literal.parse::<IpAddr>().ok().map(|ip| ip.to_string()),
        Some((ip, zone)) if !zone.is_empty() => {
            let ip = ip.parse::<Ipv6Addr>().ok()?;
            Some(format!("{}%{}", ip, zone))
        }
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn specs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_labeled_ipv4_with_port() {
        let targets = assert_ok!(parse_targets(
            &specs(&["web=203.0.113.5:8080"]),
            22,
            CheckSelection::default()
        ));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].label, "web");
        assert_eq!(targets[0].host, "203.0.113.5");
        assert_eq!(targets[0].port, 8080);
        assert_eq!(targets[0].title(), "203.0.113.5 (web)");
    }

    #[test]
    fn test_bare_ip_uses_default_port() {
        let targets = assert_ok!(parse_targets(
            &specs(&["203.0.113.5"]),
            22,
            CheckSelection::default()
        ));
        assert_eq!(targets[0].port, 22);
        assert_eq!(targets[0].title(), "203.0.113.5");
        assert_eq!(targets[0].id(), "203.0.113.5");
    }

    #[test]
    fn test_parse_address_forms() {
        let cases = [
            ("2001:DB8::1", "2001:db8::1", 0),
            ("[2001:db8::1]:443", "2001:db8::1", 443),
            ("192.0.2.1:80", "192.0.2.1", 80),
            ("example.org", "example.org", 0),
            ("example.org:2222", "example.org", 2222),
        ];
        for (address, host, port) in cases {
            assert_eq!(parse_address(address).unwrap(), (host.to_string(), port));
        }
    }

    #[test]
    fn test_ipv6_zone_is_kept() {
        assert_eq!(
            parse_address("fe80::1%eth0").unwrap(),
            ("fe80::1%eth0".to_string(), 0)
        );
        assert_eq!(
            parse_address("FE80::0001%eth0").unwrap(),
            ("fe80::1%eth0".to_string(), 0)
        );
        assert_eq!(
            parse_address("[fe80::1%eth0]:22").unwrap(),
            ("fe80::1%eth0".to_string(), 22)
        );
        assert_eq!(
            parse_address("[fe80::1%2]:22").unwrap(),
            ("fe80::1%2".to_string(), 22)
        );
    }

    #[test]
    fn test_malformed_ip_literals() {
        assert!(matches!(
            parse_address("fe80::1%"),
            Err(ConfigError::UnparsableAddress(_))
        ));
        assert!(matches!(
            parse_address("[fe80::1]:99999"),
            Err(ConfigError::UnparsableAddress(_))
        ));
    }

    #[test]
    fn test_zoned_target_gets_icmpv6_check() {
        let targets = assert_ok!(parse_targets(
            &specs(&["lan=fe80::1%eth0"]),
            22,
            CheckSelection::default()
        ));
        assert_eq!(targets[0].title(), "fe80::1%eth0 (lan)");
        assert_eq!(
            targets[0].check.name(),
            "TCP fe80::1%eth0:22 + ICMPv6 fe80::1%eth0"
        );
    }

    #[test]
    fn test_explicit_zero_port_falls_back_to_default() {
        let targets = assert_ok!(parse_targets(
            &specs(&["example.org:0"]),
            443,
            CheckSelection::default()
        ));
        assert_eq!(targets[0].port, 443);
    }

    #[test]
    fn test_format_errors() {
        let sel = CheckSelection::default();
        assert!(matches!(
            parse_targets(&specs(&["bad:host:spec"]), 22, sel),
            Err(ConfigError::UnparsableAddress(_))
        ));
        assert!(matches!(
            parse_targets(&specs(&["a=b=192.0.2.1"]), 22, sel),
            Err(ConfigError::InvalidTarget(_))
        ));
        assert!(matches!(
            parse_targets(&specs(&["web="]), 22, sel),
            Err(ConfigError::InvalidTarget(_))
        ));
        assert!(matches!(
            parse_targets(&specs(&["example.org:http"]), 22, sel),
            Err(ConfigError::InvalidPort(_))
        ));
    }

    #[test]
    fn test_port_out_of_range() {
        let sel = CheckSelection::default();
        assert!(matches!(
            parse_targets(&specs(&["example.org:70000"]), 22, sel),
            Err(ConfigError::InvalidPort(p)) if p == "70000"
        ));
        assert_err!(parse_targets(&specs(&["example.org:-1"]), 22, sel));
    }

    #[test]
    fn test_default_port_validated_before_targets() {
        let sel = CheckSelection::default();
        assert!(matches!(
            parse_targets(&specs(&["bad:host:spec"]), 70000, sel),
            Err(ConfigError::InvalidDefaultPort(70000))
        ));
        assert!(matches!(
            parse_targets(&[], -1, sel),
            Err(ConfigError::InvalidDefaultPort(-1))
        ));
    }

    #[test]
    fn test_one_bad_entry_fails_all() {
        let result = parse_targets(
            &specs(&["192.0.2.1", "bad:host:spec"]),
            22,
            CheckSelection::default(),
        );
        assert_err!(result);
    }

    #[test]
    fn test_check_selection() {
        let targets = assert_ok!(parse_targets(
            &specs(&["192.0.2.1"]),
            22,
            CheckSelection::default()
        ));
        assert_eq!(targets[0].check.name(), "TCP 192.0.2.1:22 + ICMP 192.0.2.1");

        let tcp_only = CheckSelection {
            tcp: true,
            icmp: false,
        };
        let targets = assert_ok!(parse_targets(&specs(&["192.0.2.1"]), 22, tcp_only));
        assert_eq!(targets[0].check.name(), "TCP 192.0.2.1:22");

        let none = CheckSelection {
            tcp: false,
            icmp: false,
        };
        assert!(matches!(
            parse_targets(&specs(&["192.0.2.1"]), 22, none),
            Err(ConfigError::NoChecks)
        ));
    }

    #[test]
    fn test_order_is_preserved() {
        let targets = assert_ok!(parse_targets(
            &specs(&["b.example", "a=192.0.2.9", "::1"]),
            22,
            CheckSelection::default()
        ));
        let hosts: Vec<&str> = targets.iter().map(|t| t.host.as_str()).collect();
        assert_eq!(hosts, vec!["b.example", "192.0.2.9", "::1"]);
    }
}
