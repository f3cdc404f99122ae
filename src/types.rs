//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Address family of the connection; only IPv6 is driven by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressFamily {
    Ipv6,
}

impl AddressFamily {
    /// Numeric family code as used by socket option objects (`family: 6`)
    pub fn code(&self) -> u8 {
        match self {
            AddressFamily::Ipv6 => 6,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IPv{}", self.code())
    }
}

/// Fixed text payloads written to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Periodic payload
    Hello,
    /// Terminating payload
    Close,
}

impl Payload {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Payload::Hello => b"hello\r\n",
            Payload::Close => b"close\r\n",
        }
    }

    /// Short name used in log lines (`send data: 'hello'`)
    pub fn label(&self) -> &'static str {
        match self {
            Payload::Hello => "hello",
            Payload::Close => "close",
        }
    }
}

/// Decode received bytes for logging; non-ASCII bytes are replaced
pub fn decode_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
        .collect()
}

/// Parse a non-negative number of seconds, fractions allowed (`"0.25"`)
pub fn parse_seconds(value: &str) -> Result<Duration> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|e| AppError::parse(format!("Invalid duration '{}': {}", value, e)))?;

    if !secs.is_finite() || secs < 0.0 {
        return Err(AppError::parse(format!(
            "Duration must be a non-negative number of seconds, got '{}'",
            value
        )));
    }

    Duration::try_from_secs_f64(secs)
        .map_err(|e| AppError::parse(format!("Duration '{}' is out of range: {}", value, e)))
}
