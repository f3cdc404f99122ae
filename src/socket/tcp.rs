//! tokio-backed IPv6 TCP client socket

use super::{EventSender, SocketError, SocketEvent, SocketService};
use crate::logging::Logger;
use crate::models::ConnectionOptions;
use async_trait::async_trait;
use std::io;
use std::net::{SocketAddr, SocketAddrV6};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpSocket, TcpStream};
use tokio::sync::Mutex;

const READ_BUFFER_SIZE: usize = 1024;

/// Client socket over tokio's `TcpSocket`
///
/// One handle serves every connection attempt of a run: each `connect`
/// opens a fresh OS socket bound to the configured local address and
/// replaces the current write half once connected.
pub struct TcpSocketService {
    events: EventSender,
    writer: Arc<Mutex<Option<OwnedWriteHalf>>>,
    network_poll: Duration,
    ipv6_supported: bool,
    logger: Logger,
}

impl TcpSocketService {
    /// Create a handle that reports to `events`
    pub fn new(events: EventSender, network_poll: Duration, logger: Logger) -> Self {
        // Check once so `is_defined` reflects whether the host has IPv6 sockets
        let ipv6_supported = TcpSocket::new_v6().is_ok();

        Self {
            events,
            writer: Arc::new(Mutex::new(None)),
            network_poll,
            ipv6_supported,
            logger,
        }
    }
}

/// Open a stream from the local address to the remote one
async fn open_stream(options: &ConnectionOptions) -> io::Result<TcpStream> {
    let socket = TcpSocket::new_v6()?;
    socket.set_reuseaddr(true)?;
    socket.bind(options.local_addr())?;
    socket.connect(options.remote_addr()).await
}

/// Whether the local address is configured on some interface
fn local_address_ready(options: &ConnectionOptions) -> bool {
    let local = SocketAddr::V6(SocketAddrV6::new(options.local_host, 0, 0, 0));
    TcpSocket::new_v6()
        .and_then(|socket| socket.bind(local))
        .is_ok()
}

/// Forward received bytes, then the close, into the event stream
async fn read_loop(mut reader: OwnedReadHalf, events: EventSender, logger: Logger) {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                logger.trace(&format!("read {} bytes", n)).log().await;
                if events.send(SocketEvent::Data(buf[..n].to_vec())).is_err() {
                    return;
                }
            }
            Err(e) => {
                let _ = events.send(SocketEvent::Error(SocketError::from(e)));
                break;
            }
        }
    }

    let _ = events.send(SocketEvent::Close);
}

#[async_trait]
impl SocketService for TcpSocketService {
    fn is_defined(&self) -> bool {
        self.ipv6_supported
    }

    fn connect(&self, options: &ConnectionOptions) {
        let options = *options;
        let events = self.events.clone();
        let writer = Arc::clone(&self.writer);
        let logger = self.logger.clone();

        tokio::spawn(async move {
            logger.debug(&format!("connecting {}", options)).log().await;

            match open_stream(&options).await {
                Ok(stream) => {
                    let (reader, write_half) = stream.into_split();
                    // Dropping a previous write half shuts down its sending side
                    *writer.lock().await = Some(write_half);
                    // Only the service handle keeps the write half alive
                    drop(writer);

                    if events.send(SocketEvent::Connect).is_err() {
                        return;
                    }
                    read_loop(reader, events, logger).await;
                }
                Err(e) => {
                    logger.debug(&format!("connect failed: {}", e)).log().await;
                    let _ = events.send(SocketEvent::Error(SocketError::from(e)));
                }
            }
        });
    }

    async fn write(&self, payload: &[u8]) -> Result<(), SocketError> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or_else(SocketError::not_connected)?;

        if let Err(e) = writer.write_all(payload).await {
            *guard = None;
            return Err(SocketError::from(e));
        }

        Ok(())
    }

    async fn network_up(&self, options: &ConnectionOptions) {
        while !local_address_ready(options) {
            self.logger
                .debug(&format!("waiting for local address {}", options.local_host))
                .log()
                .await;
            tokio::time::sleep(self.network_poll).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socket::event_channel;
    use std::net::Ipv6Addr;
    use tokio::net::TcpListener;

    fn quiet_logger() -> Logger {
        let mut logger = Logger::new("SOCKET".to_string());
        logger.set_level(crate::logging::LogLevel::Error);
        logger
    }

    async fn loopback_listener() -> Option<TcpListener> {
        TcpListener::bind("[::1]:0").await.ok()
    }

    fn loopback_options(port: u16) -> ConnectionOptions {
        ConnectionOptions {
            remote_host: Ipv6Addr::LOCALHOST,
            remote_port: port,
            local_host: Ipv6Addr::LOCALHOST,
            local_port: 0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_write_before_connect_fails() {
        let (tx, _rx) = event_channel();
        let service = TcpSocketService::new(tx, Duration::from_millis(10), quiet_logger());

        let error = service.write(b"hello\r\n").await.unwrap_err();
        assert_eq!(error.name, crate::socket::SocketErrorName::NotConnected);
    }

    #[tokio::test]
    async fn test_connect_write_and_close() {
        let Some(listener) = loopback_listener().await else {
            return;
        };
        let port = listener.local_addr().unwrap().port();

        let (tx, mut rx) = event_channel();
        let service = TcpSocketService::new(tx, Duration::from_millis(10), quiet_logger());
        assert!(service.is_defined());

        service.connect(&loopback_options(port));
        let (mut server, _) = listener.accept().await.unwrap();

        assert_eq!(rx.recv().await, Some(SocketEvent::Connect));
        service.write(b"hello\r\n").await.unwrap();

        let mut buf = [0u8; 7];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello\r\n");

        server.write_all(b"echo").await.unwrap();
        assert_eq!(rx.recv().await, Some(SocketEvent::Data(b"echo".to_vec())));

        drop(server);
        assert_eq!(rx.recv().await, Some(SocketEvent::Close));
    }

    #[tokio::test]
    async fn test_refused_connection_reports_not_found() {
        // Bind then drop to get a port with no listener
        let Some(listener) = loopback_listener().await else {
            return;
        };
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let (tx, mut rx) = event_channel();
        let service = TcpSocketService::new(tx, Duration::from_millis(10), quiet_logger());
        service.connect(&loopback_options(port));

        match rx.recv().await {
            Some(SocketEvent::Error(error)) => assert!(error.is_not_found(), "{}", error),
            other => panic!("expected error event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_network_up_for_loopback() {
        if loopback_listener().await.is_none() {
            return;
        }
        let (tx, _rx) = event_channel();
        let service = TcpSocketService::new(tx, Duration::from_millis(10), quiet_logger());

        tokio::time::timeout(Duration::from_secs(5), service.network_up(&loopback_options(1)))
            .await
            .expect("loopback address should be ready");
    }
}
