//! TCP/IPv6 Client Test Driver
//!
//! Drives one TCP client connection over IPv6 through connect, periodic
//! send and close, recording lifecycle events (`connect`, `error`, `close`)
//! into an assertion sink.

pub mod app;
pub mod assertion;
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod models;
pub mod platform;
pub mod socket;
pub mod types;

// Re-export commonly used types
pub use assertion::{AssertionReport, AssertionSink, ConsoleAssertionSink};
pub use driver::{ConnectionTestDriver, TimerPolicy};
pub use error::{AppError, Result};
pub use models::{Config, ConnectionOptions, DriverTiming};
pub use platform::{PlatformIdentity, StaticBoard};
pub use socket::{SocketError, SocketErrorName, SocketEvent, SocketService, TcpSocketService};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");

/// Default configuration values
pub mod defaults {
    use std::net::Ipv6Addr;
    use std::time::Duration;

    pub const DEFAULT_REMOTE_HOST: Ipv6Addr = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 2);
    pub const DEFAULT_REMOTE_PORT: u16 = 9876;
    pub const DEFAULT_LOCAL_HOST: Ipv6Addr = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1);
    pub const DEFAULT_LOCAL_PORT: u16 = 8484;

    /// Board that connects after a fixed delay instead of waiting for "up"
    pub const DELAYED_CONNECT_BOARD: &str = "frdm_k64f";

    pub const DEFAULT_STARTUP_DELAY: Duration = Duration::from_secs(30);
    pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(3);
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);
    pub const DEFAULT_SEND_COUNT: u32 = 7;
    pub const DEFAULT_NETWORK_POLL: Duration = Duration::from_secs(1);
    pub const DEFAULT_TEST_DEADLINE: Duration = Duration::from_secs(600);
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Upper bound for every configured delay, period and deadline
    pub const MAX_TIMING_VALUE: Duration = Duration::from_secs(24 * 60 * 60);
}
