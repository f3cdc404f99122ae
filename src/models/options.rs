//! Connection options for the IPv6 client socket

use crate::types::{AddressFamily, AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv6Addr, SocketAddr, SocketAddrV6};

/// Endpoint description handed to `SocketService::connect`
///
/// Built once at startup and never mutated; reconnect attempts reuse the
/// same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionOptions {
    pub remote_host: Ipv6Addr,
    pub remote_port: u16,
    pub local_host: Ipv6Addr,
    pub local_port: u16,
    pub family: AddressFamily,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            remote_host: crate::defaults::DEFAULT_REMOTE_HOST,
            remote_port: crate::defaults::DEFAULT_REMOTE_PORT,
            local_host: crate::defaults::DEFAULT_LOCAL_HOST,
            local_port: crate::defaults::DEFAULT_LOCAL_PORT,
            family: AddressFamily::Ipv6,
        }
    }
}

impl ConnectionOptions {
    /// Remote endpoint as a socket address
    pub fn remote_addr(&self) -> SocketAddr {
        SocketAddr::V6(SocketAddrV6::new(self.remote_host, self.remote_port, 0, 0))
    }

    /// Local bind address; port 0 lets the stack choose
    pub fn local_addr(&self) -> SocketAddr {
        SocketAddr::V6(SocketAddrV6::new(self.local_host, self.local_port, 0, 0))
    }

    /// Structural checks on the options; no network access
    pub fn validate(&self) -> Result<()> {
        if self.family != AddressFamily::Ipv6 {
            return Err(AppError::config("Address family must be IPv6"));
        }

        if self.remote_port == 0 {
            return Err(AppError::config("Remote port must be greater than 0"));
        }

        if self.remote_host.is_unspecified() {
            return Err(AppError::config("Remote host cannot be the unspecified address '::'"));
        }

        if self.remote_host.is_multicast() {
            return Err(AppError::config(format!(
                "Remote host {} is a multicast address",
                self.remote_host
            )));
        }

        if self.local_host.is_multicast() {
            return Err(AppError::config(format!(
                "Local host {} is a multicast address",
                self.local_host
            )));
        }

        if self.remote_addr() == self.local_addr() {
            return Err(AppError::config("Local and remote endpoints must differ"));
        }

        Ok(())
    }
}

impl fmt::Display for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.local_addr(), self.remote_addr(), self.family)
    }
}
