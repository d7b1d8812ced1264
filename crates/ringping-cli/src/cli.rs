//! CLI argument parsing for ringping

use clap::{Parser, ValueEnum};

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated bucket table and percentiles
    Text,
    /// Histogram snapshot as JSON
    Json,
}

/// Ring round-trip latency benchmark
#[derive(Parser, Debug, Clone)]
#[command(name = "ringping")]
#[command(about = "Measure ring round-trip latency between pinger threads and an echo thread")]
#[command(version)]
pub struct Cli {
    /// Pause between a pinger's round trips, in microseconds
    #[arg(short = 'd', long, default_value = "1")]
    pub delay_us: u64,

    /// Run length in seconds
    #[arg(short = 't', long, default_value = "120")]
    pub duration_secs: u64,

    /// Number of pingers (default: one per spare core)
    #[arg(long)]
    pub pingers: Option<usize>,

    /// Pin the echo thread and every pinger to its own core
    #[arg(long)]
    pub pin: bool,

    /// Slots in the shared echo ring (power of two)
    #[arg(long, default_value = "128")]
    pub echo_capacity: usize,

    /// Most requests the echo thread drains per iteration
    #[arg(long, default_value = "64")]
    pub burst: usize,

    /// Slots in each pinger's reply ring (power of two)
    #[arg(long, default_value = "2")]
    pub reply_capacity: usize,

    /// Histogram bucket width in nanoseconds
    #[arg(long, default_value = "100")]
    pub bin_width_ns: u64,

    /// Histogram ceiling in microseconds
    #[arg(long, default_value = "10000")]
    pub max_latency_us: u64,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["ringping"]);
        assert_eq!(cli.delay_us, 1);
        assert_eq!(cli.duration_secs, 120);
        assert!(cli.pingers.is_none());
        assert!(!cli.pin);
        assert_eq!(cli.echo_capacity, 128);
        assert_eq!(cli.burst, 64);
        assert_eq!(cli.reply_capacity, 2);
        assert_eq!(cli.bin_width_ns, 100);
        assert_eq!(cli.max_latency_us, 10_000);
        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["ringping", "-d", "0", "-t", "5"]);
        assert_eq!(cli.delay_us, 0);
        assert_eq!(cli.duration_secs, 5);
    }

    #[test]
    fn test_cli_custom_values() {
        let cli = Cli::parse_from([
            "ringping",
            "--delay-us", "10",
            "--duration-secs", "30",
            "--pingers", "4",
            "--pin",
            "--echo-capacity", "256",
            "--burst", "16",
            "--reply-capacity", "4",
            "--bin-width-ns", "50",
            "--max-latency-us", "500",
            "--format", "json",
            "--log-level", "debug",
        ]);
        assert_eq!(cli.delay_us, 10);
        assert_eq!(cli.duration_secs, 30);
        assert_eq!(cli.pingers, Some(4));
        assert!(cli.pin);
        assert_eq!(cli.echo_capacity, 256);
        assert_eq!(cli.burst, 16);
        assert_eq!(cli.reply_capacity, 4);
        assert_eq!(cli.bin_width_ns, 50);
        assert_eq!(cli.max_latency_us, 500);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_cli_rejects_unknown_option() {
        assert!(Cli::try_parse_from(["ringping", "--bogus"]).is_err());
        assert!(Cli::try_parse_from(["ringping", "-d", "-3"]).is_err());
        assert!(Cli::try_parse_from(["ringping", "--format", "xml"]).is_err());
    }
}
