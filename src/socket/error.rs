//! Named socket error categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

/// Category carried by an `error` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketErrorName {
    /// Remote endpoint or local address not reachable; the only retried kind
    NotFound,
    /// Connection attempt timed out
    Timeout,
    /// Established connection was reset or aborted
    ConnectionReset,
    /// Write attempted without an established connection
    NotConnected,
    /// Anything else
    Network,
}

impl SocketErrorName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocketErrorName::NotFound => "NotFoundError",
            SocketErrorName::Timeout => "TimeoutError",
            SocketErrorName::ConnectionReset => "ConnectionResetError",
            SocketErrorName::NotConnected => "NotConnectedError",
            SocketErrorName::Network => "NetworkError",
        }
    }

    /// Map an I/O error kind onto an error name
    pub fn from_io_kind(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::NotFound
            | io::ErrorKind::AddrNotAvailable => SocketErrorName::NotFound,
            io::ErrorKind::TimedOut => SocketErrorName::Timeout,
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof => SocketErrorName::ConnectionReset,
            io::ErrorKind::NotConnected => SocketErrorName::NotConnected,
            _ => SocketErrorName::Network,
        }
    }
}

impl fmt::Display for SocketErrorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error delivered through a socket `error` event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{name}: {message}")]
pub struct SocketError {
    pub name: SocketErrorName,
    pub message: String,
}

impl SocketError {
    pub fn new<S: Into<String>>(name: SocketErrorName, message: S) -> Self {
        Self {
            name,
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::new(SocketErrorName::NotFound, message)
    }

    pub fn not_connected() -> Self {
        Self::new(SocketErrorName::NotConnected, "socket is not connected")
    }

    /// Whether this error triggers a reconnect
    pub fn is_not_found(&self) -> bool {
        self.name == SocketErrorName::NotFound
    }
}

impl From<io::Error> for SocketError {
    fn from(error: io::Error) -> Self {
        Self::new(SocketErrorName::from_io_kind(error.kind()), error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refused_maps_to_not_found() {
        let error: SocketError = io::Error::from(io::ErrorKind::ConnectionRefused).into();
        assert_eq!(error.name, SocketErrorName::NotFound);
        assert!(error.is_not_found());
        assert!(error.to_string().starts_with("NotFoundError: "));
    }

    #[test]
    fn test_unavailable_local_address_maps_to_not_found() {
        assert_eq!(
            SocketErrorName::from_io_kind(io::ErrorKind::AddrNotAvailable),
            SocketErrorName::NotFound
        );
    }

    #[test]
    fn test_other_kinds_are_not_retried() {
        for kind in [
            io::ErrorKind::TimedOut,
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::BrokenPipe,
            io::ErrorKind::PermissionDenied,
            io::ErrorKind::NotConnected,
        ] {
            let error: SocketError = io::Error::from(kind).into();
            assert!(!error.is_not_found(), "{:?} must not be retried", kind);
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(SocketErrorName::Timeout.as_str(), "TimeoutError");
        assert_eq!(SocketErrorName::Network.to_string(), "NetworkError");
        assert_eq!(SocketError::not_connected().name, SocketErrorName::NotConnected);
    }
}
