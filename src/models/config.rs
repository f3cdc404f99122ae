//! Configuration data model and validation

use crate::models::options::ConnectionOptions;
use crate::types::{parse_seconds, AppError, Result};
use serde::{Deserialize, Serialize};
use std::net::Ipv6Addr;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Socket endpoints
    #[serde(default)]
    pub options: ConnectionOptions,

    /// Platform identity reported to the driver
    #[serde(default = "default_board")]
    pub board: String,

    /// Driver timing constants
    #[serde(default)]
    pub timing: DriverTiming,

    /// Keep earlier send timers running when the socket reconnects
    #[serde(default)]
    pub overlap_timers: bool,

    /// Print the assertion report as JSON
    #[serde(default)]
    pub json_output: bool,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

/// Delays, periods and counts that shape one test run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverTiming {
    /// Wait between readiness and the first connection attempt
    pub startup_delay: Duration,
    /// Send timer period
    pub tick_period: Duration,
    /// Wait before reconnecting after `NotFoundError`
    pub retry_delay: Duration,
    /// Number of hello payloads before the close payload
    pub send_count: u32,
    /// Poll interval while waiting for the network to come up
    pub network_poll: Duration,
    /// Overall deadline for the run
    pub deadline: Duration,
}

impl Default for DriverTiming {
    fn default() -> Self {
        Self {
            startup_delay: crate::defaults::DEFAULT_STARTUP_DELAY,
            tick_period: crate::defaults::DEFAULT_TICK_PERIOD,
            retry_delay: crate::defaults::DEFAULT_RETRY_DELAY,
            send_count: crate::defaults::DEFAULT_SEND_COUNT,
            network_poll: crate::defaults::DEFAULT_NETWORK_POLL,
            deadline: crate::defaults::DEFAULT_TEST_DEADLINE,
        }
    }
}

impl DriverTiming {
    /// Validate timing values
    pub fn validate(&self) -> Result<()> {
        if self.tick_period.is_zero() {
            return Err(AppError::config("Tick period must be greater than 0"));
        }

        if self.retry_delay.is_zero() {
            return Err(AppError::config("Retry delay must be greater than 0"));
        }

        if self.network_poll.is_zero() {
            return Err(AppError::config("Network poll interval must be greater than 0"));
        }

        if self.send_count == 0 {
            return Err(AppError::config("Send count must be greater than 0"));
        }

        if self.send_count > 10_000 {
            return Err(AppError::config("Send count cannot exceed 10000"));
        }

        if self.deadline.is_zero() {
            return Err(AppError::config("Test deadline must be greater than 0"));
        }

        let max = crate::defaults::MAX_TIMING_VALUE;
        for (name, value) in [
            ("Startup delay", self.startup_delay),
            ("Tick period", self.tick_period),
            ("Retry delay", self.retry_delay),
            ("Network poll interval", self.network_poll),
            ("Test deadline", self.deadline),
        ] {
            if value > max {
                return Err(AppError::config(format!(
                    "{} of {}s exceeds the {}s limit",
                    name,
                    value.as_secs_f64(),
                    max.as_secs()
                )));
            }
        }

        Ok(())
    }

    /// Shortest time a clean run can take: startup wait plus every tick
    pub fn minimum_run_time(&self) -> Duration {
        self.tick_period
            .saturating_mul(self.send_count.saturating_add(1))
            .saturating_add(self.startup_delay)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            options: ConnectionOptions::default(),
            board: default_board(),
            timing: DriverTiming::default(),
            overlap_timers: false,
            json_output: false,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        self.options.validate()?;
        self.timing.validate()?;

        if self.board.trim().is_empty() {
            return Err(AppError::config("Board name cannot be empty"));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("TCP6_REMOTE_HOST") {
            self.options.remote_host = parse_host("TCP6_REMOTE_HOST", &host)?;
        }

        if let Ok(port) = std::env::var("TCP6_REMOTE_PORT") {
            self.options.remote_port = parse_port("TCP6_REMOTE_PORT", &port)?;
        }

        if let Ok(host) = std::env::var("TCP6_LOCAL_HOST") {
            self.options.local_host = parse_host("TCP6_LOCAL_HOST", &host)?;
        }

        if let Ok(port) = std::env::var("TCP6_LOCAL_PORT") {
            self.options.local_port = parse_port("TCP6_LOCAL_PORT", &port)?;
        }

        if let Ok(board) = std::env::var("TCP6_BOARD") {
            self.board = board.trim().to_string();
        }

        if let Ok(delay) = std::env::var("TCP6_STARTUP_DELAY") {
            self.timing.startup_delay = parse_env_seconds("TCP6_STARTUP_DELAY", &delay)?;
        }

        if let Ok(tick) = std::env::var("TCP6_TICK_PERIOD") {
            self.timing.tick_period = parse_env_seconds("TCP6_TICK_PERIOD", &tick)?;
        }

        if let Ok(delay) = std::env::var("TCP6_RETRY_DELAY") {
            self.timing.retry_delay = parse_env_seconds("TCP6_RETRY_DELAY", &delay)?;
        }

        if let Ok(count) = std::env::var("TCP6_SEND_COUNT") {
            self.timing.send_count = count.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TCP6_SEND_COUNT value '{}': {}", count, e)))?;
        }

        if let Ok(poll) = std::env::var("TCP6_NETWORK_POLL") {
            self.timing.network_poll = parse_env_seconds("TCP6_NETWORK_POLL", &poll)?;
        }

        if let Ok(deadline) = std::env::var("TCP6_DEADLINE") {
            self.timing.deadline = parse_env_seconds("TCP6_DEADLINE", &deadline)?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

fn parse_host(key: &str, value: &str) -> Result<Ipv6Addr> {
    Ipv6Addr::from_str(value.trim().trim_start_matches('[').trim_end_matches(']'))
        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))
}

fn parse_port(key: &str, value: &str) -> Result<u16> {
    value.trim().parse()
        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))
}

fn parse_env_seconds(key: &str, value: &str) -> Result<Duration> {
    parse_seconds(value).map_err(|e| AppError::config(format!("Invalid {} value: {}", key, e)))
}

// Default value functions for serde
fn default_board() -> String {
    std::env::consts::OS.to_string()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
