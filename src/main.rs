//! online-watch - Packetloss Monitor
//!
//! Watches a set of targets using TCP and ICMP(v6) checks and reports
//! outages as they happen.

mod config;
mod printer;
mod probe;
mod scheduler;
mod target;

use config::{Cli, WatchConfig};
use printer::{color_enabled, Printer};
use scheduler::{Scheduler, VERDICT_BUFFER};

use clap::Parser;
use std::io;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };
    let cfg = WatchConfig::from(cli);

    // Initialize logging, stdout is reserved for results
    let directive = if cfg.verbose {
        "online_watch=debug"
    } else {
        "online_watch=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse()?),
        )
        .init();

    let targets = match target::parse_targets(&cfg.targets, cfg.port, cfg.checks) {
        Ok(targets) => targets,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let (tx, mut rx) = mpsc::channel(VERDICT_BUFFER);
    let mut scheduler = Scheduler::new(cfg.timing());
    scheduler.start(targets, tx);

    let mut printer = Printer::new(io::stdout(), cfg.verbose, cfg.show_after)
        .with_color(color_enabled(std::env::var("NO_COLOR").is_ok()));

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(verdict) = rx.recv() => printer.print(&verdict)?,
            _ = &mut shutdown => break,
        }
    }

    // In-flight checks fail to emit once the receiver is gone, which bounds
    // the wait to one timeout.
    scheduler.stop();
    drop(rx);
    scheduler.join().await;

    println!();
    printer.summary()?;

    Ok(())
}
