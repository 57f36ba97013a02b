//! Configuration module for online-watch.
//!
//! Settings come from the command line only.

use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::target::CheckSelection;

/// Command line arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "online-watch",
    version,
    about = "Monitors targets for packetloss using TCP and ICMP(v6)"
)]
pub struct Cli {
    /// Targets to watch: [label=]<host|IPv4|IPv6>[:port]
    #[arg(value_name = "TARGETS", required = true)]
    pub targets: Vec<String>,

    /// Default port for TCP checks
    #[arg(
        short = 'p',
        long = "port",
        default_value_t = 22,
        allow_negative_numbers = true
    )]
    pub port: i64,

    /// Disable TCP checks
    #[arg(long = "no-tcp", action = ArgAction::SetTrue)]
    pub no_tcp: bool,

    /// Disable ICMP checks
    #[arg(long = "no-icmp", action = ArgAction::SetTrue)]
    pub no_icmp: bool,

    /// Log all results
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Time between checks (ms)
    #[arg(long = "interval", value_name = "MS", default_value_t = 250)]
    pub interval: u64,

    /// TCP/ICMP timeout (ms)
    #[arg(long = "timeout", value_name = "MS", default_value_t = 250)]
    pub timeout: u64,

    /// Consecutive failures before a failure is shown (without --verbose)
    #[arg(
        long = "show-after",
        value_name = "N",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub show_after: u32,
}

/// How often a target is checked and how long a check may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Time between the starts of two consecutive checks
    pub interval: Duration,
    /// Timeout passed to every probe
    pub timeout: Duration,
}

/// Watch configuration.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub targets: Vec<String>,
    /// Default TCP port, validated when targets are parsed
    pub port: i64,
    pub checks: CheckSelection,
    pub verbose: bool,
    pub interval_ms: u64,
    pub timeout_ms: u64,
    /// Consecutive failures needed before a failure line is printed
    pub show_after: u32,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            port: 22,
            checks: CheckSelection::default(),
            verbose: false,
            interval_ms: 250,
            timeout_ms: 250,
            show_after: 1,
        }
    }
}

impl From<Cli> for WatchConfig {
    fn from(cli: Cli) -> Self {
        Self {
            targets: cli.targets,
            port: cli.port,
            checks: CheckSelection {
                tcp: !cli.no_tcp,
                icmp: !cli.no_icmp,
            },
            verbose: cli.verbose,
            interval_ms: cli.interval,
            timeout_ms: cli.timeout,
            show_after: cli.show_after,
        }
    }
}

impl WatchConfig {
    pub fn timing(&self) -> Timing {
        Timing {
            interval: Duration::from_millis(self.interval_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}
