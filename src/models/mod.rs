//! Data models for the TCP/IPv6 client test driver

pub mod config;
pub mod options;

// Re-export main model types
pub use config::{Config, DriverTiming};
pub use options::ConnectionOptions;
