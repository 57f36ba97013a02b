//! Result printing.
//!
//! Consumes verdicts, keeps outage statistics per target and writes the
//! live result lines plus a closing summary.

mod streak;

pub use streak::*;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::time::Duration;

use colored::Colorize;

use crate::probe::{Verdict, OKAY_GLYPH};

/// Writes result lines and tracks streaks, keyed by target title.
pub struct Printer<W: Write> {
    output: W,
    verbose: bool,
    /// Failures in a row needed before a failure is printed (non-verbose)
    consecutive_failures: u32,
    color: bool,
    streaks: BTreeMap<String, Streak>,
}

impl<W: Write> Printer<W> {
    pub fn new(output: W, verbose: bool, consecutive_failures: u32) -> Self {
        Self {
            output,
            verbose,
            consecutive_failures,
            color: false,
            streaks: BTreeMap::new(),
        }
    }

    /// Color hints green or red depending on their outcome.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    #[cfg(test)]
    pub fn streaks(&self) -> &BTreeMap<String, Streak> {
        &self.streaks
    }

    /// Without verbose, only failures that reached the threshold are shown.
    pub fn is_visible(&self, verdict: &Verdict) -> bool {
        self.verbose || (!verdict.okay && verdict.consecutive >= self.consecutive_failures)
    }

    /// Record a verdict and print it if it is visible.
    pub fn print(&mut self, verdict: &Verdict) -> io::Result<()> {
        let title = verdict
            .target
            .as_ref()
            .map(|t| t.title())
            .unwrap_or_default();

        self.streaks.entry(title.clone()).or_default().record(verdict);

        if !self.is_visible(verdict) {
            return Ok(());
        }

        write!(
            self.output,
            "{} ",
            verdict.done.format("%Y-%m-%d %H:%M:%S%.3f")
        )?;
        write!(self.output, "{} ", title)?;

        let mut hints = verdict.hints.clone();
        hints.sort();
        for hint in &hints {
            write!(self.output, "{} ", self.paint(hint))?;
        }

        writeln!(
            self.output,
            "for {} ({}x)",
            format_duration(verdict.since_change),
            verdict.consecutive
        )
    }

    /// Print the longest outage of every target seen, sorted by title.
    pub fn summary(&mut self) -> io::Result<()> {
        for (title, streak) in &self.streaks {
            if streak.had_outage() {
                writeln!(
                    self.output,
                    "- Longest outage {}: {} ({}x)",
                    title,
                    format_duration(streak.longest_outage),
                    streak.longest_failure_streak
                )?;
            } else {
                writeln!(self.output, "- Longest outage {}: no outage", title)?;
            }
        }
        self.output.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.output
    }

    fn paint(&self, hint: &str) -> String {
        if !self.color {
            hint.to_string()
        } else if hint.ends_with(OKAY_GLYPH) {
            hint.green().to_string()
        } else {
            hint.red().to_string()
        }
    }
}

/// Whether hints get colored: never when `NO_COLOR` is set, otherwise
/// whatever the terminal supports.
pub fn color_enabled(no_color: bool) -> bool {
    !no_color && colored::control::SHOULD_COLORIZE.should_colorize()
}

/// Format a duration rounded to the millisecond, e.g. `0s`, `250ms`,
/// `1.5s`, `2m3.004s`, `1h0m0s`.
pub fn format_duration(d: Duration) -> String {
    let total_ms = (d.as_nanos() + 500_000) / 1_000_000;

    if total_ms == 0 {
        return "0s".to_string();
    }
    if total_ms < 1000 {
        return format!("{}ms", total_ms);
    }

    let hours = total_ms / 3_600_000;
    let minutes = total_ms / 60_000 % 60;
    let seconds = total_ms / 1000 % 60;
    let millis = total_ms % 1000;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    out.push_str(&seconds.to_string());
    if millis > 0 {
        let fraction = format!("{:03}", millis);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out.push('s');
    out
}
