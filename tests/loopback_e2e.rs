//! End-to-end driver runs over the real tokio socket on `[::1]`

use anyhow::{Context, Result};
use std::net::{Ipv6Addr, SocketAddr};
use std::time::Duration;
use tcp6_client_test::{
    driver::messages,
    logging::Logger,
    socket::event_channel,
    AssertionReport, Config, ConnectionTestDriver, ConsoleAssertionSink, StaticBoard,
    TcpSocketService,
};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn loopback_config(port: u16) -> Config {
    let mut config = Config::default();
    config.options.remote_host = Ipv6Addr::LOCALHOST;
    config.options.remote_port = port;
    config.options.local_host = Ipv6Addr::LOCALHOST;
    config.options.local_port = 0;
    config.timing.startup_delay = Duration::from_millis(10);
    config.timing.tick_period = Duration::from_millis(20);
    config.timing.retry_delay = Duration::from_millis(50);
    config.timing.deadline = Duration::from_secs(10);
    config.enable_color = false;
    config
}

/// Accept one connection and collect everything it sends
async fn spawn_server() -> Result<Option<(u16, JoinHandle<Result<String>>)>> {
    let listener = match TcpListener::bind(SocketAddr::from((Ipv6Addr::LOCALHOST, 0))).await {
        Ok(listener) => listener,
        Err(_) => return Ok(None),
    };
    let port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.context("accept")?;
        let mut received = Vec::new();
        stream.read_to_end(&mut received).await.context("read")?;
        Ok(String::from_utf8_lossy(&received).into_owned())
    });

    Ok(Some((port, handle)))
}

async fn run(config: &Config) -> AssertionReport {
    let (events_tx, events_rx) = event_channel();
    let socket = TcpSocketService::new(
        events_tx,
        Duration::from_millis(10),
        Logger::with_config("SOCKET".to_string(), config),
    );
    let board = StaticBoard::new(config.board.clone());

    ConnectionTestDriver::new(config, &board, socket, events_rx, ConsoleAssertionSink::silent())
        .run()
        .await
}

#[tokio::test]
async fn test_fixed_delay_board_sends_hello_then_close() -> Result<()> {
    let Some((port, server)) = spawn_server().await? else {
        eprintln!("IPv6 loopback unavailable, skipping");
        return Ok(());
    };

    let mut config = loopback_config(port);
    config.board = "frdm_k64f".to_string();

    let report = run(&config).await;
    assert!(report.all_passed(), "{:?}", report);
    assert_eq!(report.result_calls, 1);
    assert_eq!(report.count(messages::NETWORK_UP), 0);
    assert_eq!(report.count(messages::CONNECT_EVENT), 1);
    assert_eq!(report.count(messages::CONNECTED), 1);

    let received = server.await??;
    assert_eq!(received, format!("{}close\r\n", "hello\r\n".repeat(7)));
    Ok(())
}

#[tokio::test]
async fn test_network_up_board_records_up_event() -> Result<()> {
    let Some((port, server)) = spawn_server().await? else {
        eprintln!("IPv6 loopback unavailable, skipping");
        return Ok(());
    };

    let mut config = loopback_config(port);
    config.board = "linux".to_string();
    config.timing.send_count = 2;

    let report = run(&config).await;
    assert!(report.all_passed(), "{:?}", report);
    assert_eq!(report.count(messages::NETWORK_UP), 1);
    assert_eq!(report.total(), 4);

    let received = server.await??;
    assert_eq!(received, "hello\r\nhello\r\nclose\r\n");
    Ok(())
}

#[tokio::test]
async fn test_refused_connection_retries_until_deadline() -> Result<()> {
    // Bind then drop to find a port with no listener
    let port = match std::net::TcpListener::bind(SocketAddr::from((Ipv6Addr::LOCALHOST, 0))) {
        Ok(listener) => listener.local_addr()?.port(),
        Err(_) => {
            eprintln!("IPv6 loopback unavailable, skipping");
            return Ok(());
        }
    };

    let mut config = loopback_config(port);
    config.board = "frdm_k64f".to_string();
    config.timing.deadline = Duration::from_millis(400);

    let report = run(&config).await;
    assert!(!report.all_passed());
    assert_eq!(report.count(messages::ERROR_EVENT), 1);
    assert_eq!(report.count(messages::CONNECT_EVENT), 0);
    assert_eq!(report.count(messages::DEADLINE), 1);
    assert_eq!(report.failed, 1);
    Ok(())
}
