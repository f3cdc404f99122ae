//! Command-line interface

use clap::Parser;
use std::net::Ipv6Addr;
use std::path::PathBuf;
use std::time::Duration;

/// TCP/IPv6 client test - connect, send periodic payloads, assert lifecycle events
#[derive(Parser, Debug, Clone)]
#[command(name = "tcp6c")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Server IPv6 address
    #[arg(long, value_parser = parse_ipv6)]
    pub remote_host: Option<Ipv6Addr>,

    /// Server TCP port
    #[arg(long)]
    pub remote_port: Option<u16>,

    /// Local IPv6 address to bind
    #[arg(long, value_parser = parse_ipv6)]
    pub local_host: Option<Ipv6Addr>,

    /// Local TCP port to bind (0 lets the stack choose)
    #[arg(long)]
    pub local_port: Option<u16>,

    /// Board name; "frdm_k64f" connects after a fixed delay without waiting for the network
    #[arg(long)]
    pub board: Option<String>,

    /// Seconds to wait before the first connection attempt
    #[arg(long, value_name = "SECS", value_parser = parse_secs)]
    pub startup_delay: Option<Duration>,

    /// Seconds between payloads
    #[arg(long, value_name = "SECS", value_parser = parse_secs)]
    pub tick: Option<Duration>,

    /// Seconds to wait before reconnecting after NotFoundError
    #[arg(long, value_name = "SECS", value_parser = parse_secs)]
    pub retry_delay: Option<Duration>,

    /// Number of "hello" payloads sent before "close"
    #[arg(long)]
    pub send_count: Option<u32>,

    /// Seconds between checks that the local address is usable
    #[arg(long, value_name = "SECS", value_parser = parse_secs)]
    pub network_poll: Option<Duration>,

    /// Overall test deadline in seconds
    #[arg(long, value_name = "SECS", value_parser = parse_secs)]
    pub deadline: Option<Duration>,

    /// Keep earlier send timers running when the socket reconnects
    #[arg(long)]
    pub overlap_timers: bool,

    /// Print the assertion report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Print host routing setup for the test network and exit
    #[arg(long)]
    pub show_setup: bool,

    /// Write a commented .env template to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub create_env: Option<PathBuf>,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if let Some(0) = self.send_count {
            return Err("--send-count must be greater than 0".to_string());
        }

        if let Some(tick) = self.tick {
            if tick.is_zero() {
                return Err("--tick must be greater than 0".to_string());
            }
        }

        if let Some(board) = &self.board {
            if board.trim().is_empty() {
                return Err("--board cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && !self.json
    }
}

fn parse_ipv6(value: &str) -> Result<Ipv6Addr, String> {
    value
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse()
        .map_err(|e| format!("'{}' is not an IPv6 address: {}", value, e))
}

fn parse_secs(value: &str) -> Result<Duration, String> {
    crate::types::parse_seconds(value).map_err(|e| e.to_string())
}
