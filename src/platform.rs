//! Platform identity and readiness gating

use crate::defaults::DELAYED_CONNECT_BOARD;
use std::net::Ipv6Addr;

/// Static identity of the board the driver runs on
pub trait PlatformIdentity: Send + Sync {
    fn board_name(&self) -> &str;
}

/// Board identity fixed at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticBoard {
    name: String,
}

impl StaticBoard {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into() }
    }
}

impl PlatformIdentity for StaticBoard {
    fn board_name(&self) -> &str {
        &self.name
    }
}

/// How the driver waits before its first connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Connect after the startup delay without waiting for the network
    FixedDelay,
    /// Wait for the network "up" notification, then the startup delay
    NetworkUp,
}

impl Readiness {
    pub fn for_board(identity: &dyn PlatformIdentity) -> Self {
        if identity.board_name() == DELAYED_CONNECT_BOARD {
            Readiness::FixedDelay
        } else {
            Readiness::NetworkUp
        }
    }
}

/// Routing instructions for reaching the test server over the IPv6 link
pub fn setup_instructions(remote: Ipv6Addr) -> String {
    let segments = remote.segments();
    let prefix = Ipv6Addr::new(segments[0], segments[1], segments[2], segments[3], 0, 0, 0, 0);

    let mut lines = Vec::new();
    lines.push("Run a TCP server that accepts the connection on the remote address.".to_string());
    lines.push("If using Bluetooth communication, please connect server with Bluetooth".to_string());
    lines.push("Add soft router on linux:".to_string());
    lines.push(format!("    ip -6 route add {}/64 dev bt0", prefix));
    lines.push("And add Lan IPv6 address on linux:".to_string());
    lines.push(format!("    ip -6 addr add {}/64 dev bt0", remote));
    lines.join("\n")
}
