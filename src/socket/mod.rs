//! Socket service abstraction and its tokio implementation
//!
//! A [`SocketService`] is the client-side socket handle the driver owns.
//! Connection outcomes are not returned from [`SocketService::connect`];
//! they arrive later as [`SocketEvent`]s on the channel the service was
//! created with, in the order the stack produced them.

pub mod error;
pub mod tcp;

pub use error::{SocketError, SocketErrorName};
pub use tcp::TcpSocketService;

use crate::models::ConnectionOptions;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Lifecycle notifications emitted by a socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Connection established
    Connect,
    /// Bytes received from the peer
    Data(Vec<u8>),
    /// Connection closed
    Close,
    /// Connection or transfer failure
    Error(SocketError),
}

impl SocketEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SocketEvent::Connect => "connect",
            SocketEvent::Data(_) => "data",
            SocketEvent::Close => "close",
            SocketEvent::Error(_) => "error",
        }
    }
}

/// Sending side of a socket event stream
pub type EventSender = mpsc::UnboundedSender<SocketEvent>;
/// Receiving side of a socket event stream
pub type EventReceiver = mpsc::UnboundedReceiver<SocketEvent>;

/// Create a socket event channel
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Client socket handle
#[async_trait]
pub trait SocketService: Send + Sync {
    /// Whether the handle was created successfully
    fn is_defined(&self) -> bool {
        true
    }

    /// Start a connection attempt; the outcome arrives as an event
    fn connect(&self, options: &ConnectionOptions);

    /// Write bytes to the established connection
    async fn write(&self, payload: &[u8]) -> Result<(), SocketError>;

    /// Resolve once the network interface can carry the connection
    async fn network_up(&self, options: &ConnectionOptions);
}
