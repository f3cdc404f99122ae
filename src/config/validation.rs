//! Configuration validation utilities and rules

use crate::{
    models::{Config, ConnectionOptions, DriverTiming},
    error::Result,
};
use colored::Colorize;
use std::net::Ipv6Addr;
use std::time::Duration;

/// Configuration validator with advanced validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration with comprehensive checks
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();

        // Hard errors first
        config.validate()?;

        warnings.extend(Self::validate_endpoints(&config.options));
        warnings.extend(Self::validate_timing(&config.timing));

        Ok(warnings)
    }

    /// Checks on the socket endpoints
    fn validate_endpoints(options: &ConnectionOptions) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let remote = options.remote_host;

        if remote.is_loopback() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Remote host {} is the loopback address", remote)
            ));
        } else if is_link_local(&remote) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Remote host {} is link-local; connections without a scope id may fail", remote)
            ));
        } else if !is_documentation(&remote) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Remote host {} is outside the 2001:db8::/32 test range", remote)
            ));
        }

        if options.local_host.is_unspecified() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "Local host is '::'; the stack picks the source address".to_string()
            ));
        }

        if options.local_port != 0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Fixed local port {}; reconnects reuse it with SO_REUSEADDR", options.local_port)
            ));
        }

        warnings
    }

    /// Checks on delays, periods and the deadline
    fn validate_timing(timing: &DriverTiming) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if timing.tick_period < Duration::from_millis(100) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Tick period of {}s may flood slow links", timing.tick_period.as_secs_f64())
            ));
        }

        let minimum = timing.minimum_run_time();
        if timing.deadline < minimum {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Deadline of {}s is shorter than the {}s a clean run needs",
                    timing.deadline.as_secs_f64(),
                    minimum.as_secs_f64()
                )
            ));
        }

        if timing.retry_delay >= timing.deadline {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "Retry delay is not shorter than the deadline; reconnects will never happen".to_string()
            ));
        }

        warnings
    }
}

/// 2001:db8::/32
fn is_documentation(addr: &Ipv6Addr) -> bool {
    let segments = addr.segments();
    segments[0] == 0x2001 && segments[1] == 0x0db8
}

/// fe80::/10
fn is_link_local(addr: &Ipv6Addr) -> bool {
    (addr.segments()[0] & 0xffc0) == 0xfe80
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Validation warning with level and message
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let label = if use_color {
            match self.level {
                ValidationLevel::Info => self.level.as_str().blue().to_string(),
                ValidationLevel::Warning => self.level.as_str().yellow().to_string(),
            }
        } else {
            self.level.as_str().to_string()
        };
        format!("[{}] {}", label, self.message)
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(warnings: &[ValidationWarning]) -> Vec<&str> {
        warnings.iter().map(|w| w.message.as_str()).collect()
    }

    #[test]
    fn test_default_config_only_notes_fixed_port() {
        let warnings = validate_config(&Config::default()).unwrap();

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, ValidationLevel::Info);
        assert!(warnings[0].message.contains("Fixed local port 8484"));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let mut config = Config::default();
        config.timing.send_count = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_loopback_and_routable_remotes() {
        let mut config = Config::default();
        config.options.remote_host = Ipv6Addr::LOCALHOST;
        config.options.local_host = Ipv6Addr::LOCALHOST;
        config.options.local_port = 0;
        let warnings = validate_config(&config).unwrap();
        assert_eq!(messages(&warnings), vec!["Remote host ::1 is the loopback address"]);

        config.options.remote_host = "2606:4700::1111".parse().unwrap();
        let warnings = validate_config(&config).unwrap();
        assert!(warnings[0].message.contains("outside the 2001:db8::/32 test range"));
    }

    #[test]
    fn test_link_local_remote_warns() {
        let mut config = Config::default();
        config.options.remote_host = "fe80::1".parse().unwrap();
        let warnings = validate_config(&config).unwrap();
        assert!(warnings
            .iter()
            .any(|w| w.level == ValidationLevel::Warning && w.message.contains("link-local")));
    }

    #[test]
    fn test_short_deadline_warns() {
        let mut config = Config::default();
        config.timing.deadline = Duration::from_secs(20);
        let warnings = validate_config(&config).unwrap();

        assert!(warnings.iter().any(|w| w.message.contains("shorter than the 54s")));
        assert!(warnings.iter().all(|w| !w.message.contains("Retry delay")));
    }

    #[test]
    fn test_oversized_deadline_is_an_error() {
        let mut config = Config::default();
        config.timing.deadline = crate::types::parse_seconds("1e19").unwrap();

        let error = validate_config(&config).unwrap_err();
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_fast_tick_warns() {
        let mut config = Config::default();
        config.timing.tick_period = Duration::from_millis(10);
        let warnings = validate_config(&config).unwrap();
        assert!(warnings.iter().any(|w| w.message.starts_with("Tick period")));
    }

    #[test]
    fn test_plain_format() {
        let warning = ValidationWarning::new(ValidationLevel::Warning, "careful".to_string());
        assert_eq!(warning.format(false), "[WARNING] careful");
    }
}
