//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    models::Config,
    error::Result,
    config::env::EnvManager,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(host) = cli.remote_host {
            config.options.remote_host = host;
        }
        if let Some(port) = cli.remote_port {
            config.options.remote_port = port;
        }
        if let Some(host) = cli.local_host {
            config.options.local_host = host;
        }
        if let Some(port) = cli.local_port {
            config.options.local_port = port;
        }

        if let Some(board) = &cli.board {
            config.board = board.trim().to_string();
        }

        if let Some(delay) = cli.startup_delay {
            config.timing.startup_delay = delay;
        }
        if let Some(delay) = cli.tick {
            config.timing.tick_period = delay;
        }
        if let Some(delay) = cli.retry_delay {
            config.timing.retry_delay = delay;
        }
        if let Some(count) = cli.send_count {
            config.timing.send_count = count;
        }
        if let Some(poll) = cli.network_poll {
            config.timing.network_poll = poll;
        }
        if let Some(delay) = cli.deadline {
            config.timing.deadline = delay;
        }

        if cli.overlap_timers {
            config.overlap_timers = true;
        }

        if !cli.use_colors() {
            config.enable_color = false;
        }

        // These are CLI-only
        config.json_output = cli.json;
        config.verbose = cli.verbose;
        config.debug = cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let timing = &config.timing;
    let mut summary = Vec::new();

    summary.push(format!("Remote: {}", config.options.remote_addr()));
    summary.push(format!("Local: {}", config.options.local_addr()));
    summary.push(format!("Family: {}", config.options.family));
    summary.push(format!("Board: {}", config.board));
    summary.push(format!("Startup delay: {}s", timing.startup_delay.as_secs_f64()));
    summary.push(format!("Tick period: {}s", timing.tick_period.as_secs_f64()));
    summary.push(format!("Retry delay: {}s", timing.retry_delay.as_secs_f64()));
    summary.push(format!("Send count: {}", timing.send_count));
    summary.push(format!("Network poll: {}s", timing.network_poll.as_secs_f64()));
    summary.push(format!("Deadline: {}s", timing.deadline.as_secs_f64()));
    summary.push(format!("Timer policy: {}", if config.overlap_timers { "overlap" } else { "restart" }));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::net::Ipv6Addr;
    use std::time::Duration;

    fn overridden(args: &[&str]) -> Config {
        let cli = Cli::parse_from(args);
        let mut config = Config::default();
        ConfigParser::new(cli).apply_cli_overrides(&mut config);
        config
    }

    #[test]
    fn test_no_flags_keep_defaults() {
        let config = overridden(&["tcp6c"]);
        let defaults = Config::default();

        assert_eq!(config.options, defaults.options);
        assert_eq!(config.timing, defaults.timing);
        assert!(!config.overlap_timers);
        assert!(config.enable_color);
    }

    #[test]
    fn test_endpoint_overrides() {
        let config = overridden(&[
            "tcp6c",
            "--remote-host", "::1",
            "--remote-port", "5000",
            "--local-host", "::1",
            "--local-port", "0",
        ]);

        assert_eq!(config.options.remote_host, Ipv6Addr::LOCALHOST);
        assert_eq!(config.options.remote_port, 5000);
        assert_eq!(config.options.local_port, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timing_overrides() {
        let config = overridden(&[
            "tcp6c",
            "--startup-delay", "0",
            "--tick", "0.1",
            "--retry-delay", "0.2",
            "--send-count", "3",
            "--network-poll", "0.25",
            "--deadline", "10",
        ]);

        assert_eq!(config.timing.startup_delay, Duration::ZERO);
        assert_eq!(config.timing.tick_period, Duration::from_millis(100));
        assert_eq!(config.timing.retry_delay, Duration::from_millis(200));
        assert_eq!(config.timing.send_count, 3);
        assert_eq!(config.timing.network_poll, Duration::from_millis(250));
        assert_eq!(config.timing.deadline, Duration::from_secs(10));
    }

    #[test]
    fn test_output_flags() {
        let config = overridden(&["tcp6c", "--json", "--verbose", "--overlap-timers", "--board", "frdm_k64f"]);

        assert!(config.json_output);
        assert!(!config.enable_color);
        assert!(config.verbose);
        assert!(config.overlap_timers);
        assert_eq!(config.board, "frdm_k64f");
    }

    #[test]
    fn test_display_config_summary() {
        let summary = display_config_summary(&Config::default());

        assert!(summary.contains("Remote: [2001:db8::2]:9876"));
        assert!(summary.contains("Local: [2001:db8::1]:8484"));
        assert!(summary.contains("Family: IPv6"));
        assert!(summary.contains("Send count: 7"));
        assert!(summary.contains("Timer policy: restart"));
    }
}
