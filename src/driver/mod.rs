//! Connection test driver
//!
//! Drives one socket through connect, periodic send and close while
//! recording lifecycle events into an [`AssertionSink`]. Everything runs on
//! a single task: socket events, send-timer ticks, the pending connection
//! attempt and the overall deadline are multiplexed with `tokio::select!`,
//! so handlers never run concurrently and need no locking.


use crate::assertion::{AssertionReport, AssertionSink};
use crate::logging::{LogLevel, Logger};
use crate::models::{Config, ConnectionOptions, DriverTiming};
use crate::platform::{setup_instructions, PlatformIdentity, Readiness};
use crate::socket::{EventReceiver, SocketError, SocketEvent, SocketService};
use crate::types::{decode_ascii, Payload};
use futures::future::{self, BoxFuture, FutureExt};
use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};

/// Assertion messages recorded by the driver
pub mod messages {
    pub const SOCKET_DEFINED: &str = "SocketObject: be defined for TCP client";
    pub const NETWORK_UP: &str = "NetEvent: be called as 'up' event";
    pub const CONNECTED: &str = "SocketObject: connect server successful";
    pub const CONNECT_EVENT: &str = "SocketEvent: be called as 'connect' event";
    pub const ERROR_EVENT: &str = "SocketEvent: be called as 'error' event";
    pub const DEADLINE: &str = "Test: completed before deadline";
}

/// What a `connect` event does to send timers that are already running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPolicy {
    /// Cancel running timers, then start a fresh one
    Restart,
    /// Start another timer alongside the running ones
    Overlap,
}

impl TimerPolicy {
    pub fn from_overlap(overlap: bool) -> Self {
        if overlap {
            TimerPolicy::Overlap
        } else {
            TimerPolicy::Restart
        }
    }
}

/// Flag that lets an assertion be recorded on first occurrence only
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OneShot {
    recorded: bool,
}

impl OneShot {
    /// Returns true exactly once
    pub fn fire(&mut self) -> bool {
        !std::mem::replace(&mut self.recorded, true)
    }

    pub fn is_recorded(&self) -> bool {
        self.recorded
    }
}

#[derive(Debug, Default)]
struct OneShotFlags {
    network_up: OneShot,
    connected: OneShot,
    connect_event: OneShot,
    error_event: OneShot,
}

/// Repeating send timer started by a `connect` event
#[derive(Debug, Clone, Copy)]
struct SendTimer {
    count: u32,
    next_due: Instant,
}

/// Drives one IPv6 client socket through a test run
pub struct ConnectionTestDriver<S, A> {
    options: ConnectionOptions,
    timing: DriverTiming,
    policy: TimerPolicy,
    readiness: Readiness,
    board: String,
    socket: S,
    events: EventReceiver,
    events_open: bool,
    sink: A,
    logger: Logger,
    timers: Vec<SendTimer>,
    pending_connect: Option<Instant>,
    awaiting_connect_callback: bool,
    flags: OneShotFlags,
    finished: bool,
}

impl<S, A> ConnectionTestDriver<S, A>
where
    S: SocketService,
    A: AssertionSink,
{
    pub fn new(
        config: &Config,
        identity: &dyn PlatformIdentity,
        socket: S,
        events: EventReceiver,
        sink: A,
    ) -> Self {
        Self {
            options: config.options,
            timing: config.timing,
            policy: TimerPolicy::from_overlap(config.overlap_timers),
            readiness: Readiness::for_board(identity),
            board: identity.board_name().to_string(),
            socket,
            events,
            events_open: true,
            sink,
            logger: Logger::with_config("DRIVER".to_string(), config),
            timers: Vec::new(),
            pending_connect: None,
            awaiting_connect_callback: false,
            flags: OneShotFlags::default(),
            finished: false,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn timer_policy(&self) -> TimerPolicy {
        self.policy
    }

    /// Run until the sink has been given its completion signal or the
    /// deadline passes, and return what the sink recorded
    pub async fn run(mut self) -> AssertionReport {
        let deadline = after(self.timing.deadline);

        self.start(deadline).await;

        while !self.finished {
            let connect_due = self.pending_connect;
            let tick_due = self.next_tick_due();

            tokio::select! {
                event = self.events.recv(), if self.events_open => match event {
                    Some(event) => self.handle_event(event).await,
                    None => {
                        self.events_open = false;
                        self.logger.warn("socket event stream closed").log().await;
                    }
                },
                _ = sleep_until_some(connect_due) => {
                    self.pending_connect = None;
                    self.attempt_connect().await;
                }
                _ = sleep_until_some(tick_due) => self.on_tick().await,
                _ = sleep_until(deadline) => self.expire().await,
            }
        }

        self.sink.report()
    }

    async fn start(&mut self, deadline: Instant) {
        self.logger.info("Test socket connection as TCP client for IPv6")
            .field("options", self.options.to_string())
            .log()
            .await;

        if self.logger.would_log(LogLevel::Debug) {
            for line in setup_instructions(self.options.remote_host).lines() {
                self.logger.debug(line).log().await;
            }
        }

        self.sink.assert(self.socket.is_defined(), messages::SOCKET_DEFINED);

        let delay = self.timing.startup_delay.as_secs_f64();
        match self.readiness {
            Readiness::FixedDelay => {
                self.logger
                    .info(&format!("TCP client will be connecting after {}s on {} board", delay, self.board))
                    .log()
                    .await;
            }
            Readiness::NetworkUp => {
                if timeout_at(deadline, self.socket.network_up(&self.options)).await.is_err() {
                    self.expire().await;
                    return;
                }

                if self.flags.network_up.fire() {
                    self.sink.assert(true, messages::NETWORK_UP);
                }
                self.logger
                    .info(&format!("TCP client will be connecting after {}s", delay))
                    .log()
                    .await;
            }
        }

        self.pending_connect = Some(after(self.timing.startup_delay));
    }

    async fn attempt_connect(&mut self) {
        self.logger.debug(&format!("connecting to {}", self.options.remote_addr()))
            .log()
            .await;

        self.awaiting_connect_callback = true;
        self.socket.connect(&self.options);
    }

    async fn handle_event(&mut self, event: SocketEvent) {
        self.logger.trace(&format!("socket event: {}", event.kind())).log().await;

        match event {
            SocketEvent::Data(bytes) => self.on_data(&bytes).await,
            SocketEvent::Connect => self.on_connect().await,
            SocketEvent::Close => self.on_close().await,
            SocketEvent::Error(error) => self.on_error(error).await,
        }
    }

    async fn on_data(&mut self, bytes: &[u8]) {
        let text = decode_ascii(bytes);
        self.logger.info(&format!("receive data: {}", text.trim_end()))
            .field("bytes", bytes.len())
            .log()
            .await;
    }

    async fn on_connect(&mut self) {
        if self.flags.connect_event.fire() {
            self.sink.assert(true, messages::CONNECT_EVENT);
        }

        self.logger.info("socket connection is connected").log().await;

        if self.policy == TimerPolicy::Restart && !self.timers.is_empty() {
            self.logger.debug(&format!("cancelling {} running send timer(s)", self.timers.len()))
                .log()
                .await;
            self.timers.clear();
        }

        self.timers.push(SendTimer {
            count: 0,
            next_due: after(self.timing.tick_period),
        });

        // The connect callback runs after the `connect` listeners
        if std::mem::take(&mut self.awaiting_connect_callback) && self.flags.connected.fire() {
            self.sink.assert(true, messages::CONNECTED);
        }
    }

    async fn on_close(&mut self) {
        self.logger.info("socket connection is closed").log().await;
    }

    async fn on_error(&mut self, error: SocketError) {
        if self.flags.error_event.fire() {
            self.sink.assert(true, messages::ERROR_EVENT);
        }

        self.logger.warn(&format!("socket connection error: {}", error.name))
            .socket_error(&error)
            .log()
            .await;

        if error.is_not_found() {
            self.schedule_retry().await;
        }
    }

    async fn schedule_retry(&mut self) {
        if self.pending_connect.is_some() {
            self.logger.debug("reconnect already scheduled").log().await;
            return;
        }

        self.logger
            .info(&format!("reconnecting after {}s", self.timing.retry_delay.as_secs_f64()))
            .log()
            .await;
        self.pending_connect = Some(after(self.timing.retry_delay));
    }

    fn next_tick_due(&self) -> Option<Instant> {
        self.timers.iter().map(|timer| timer.next_due).min()
    }

    async fn on_tick(&mut self) {
        let now = Instant::now();
        let mut index = 0;

        while index < self.timers.len() && !self.finished {
            if self.timers[index].next_due > now {
                index += 1;
                continue;
            }

            let timer = &mut self.timers[index];
            let count = timer.count;
            timer.count += 1;
            timer.next_due = later(timer.next_due, self.timing.tick_period);

            if self.tick(count).await {
                self.timers.remove(index);
            } else {
                index += 1;
            }
        }
    }

    /// One timer tick at `count`; returns true when the timer is cancelled
    async fn tick(&mut self, count: u32) -> bool {
        if count < self.timing.send_count {
            self.send(Payload::Hello, count).await;
        }

        if count == self.timing.send_count {
            self.send(Payload::Close, count).await;
            self.sink.result();
            self.finished = true;
            return true;
        }

        false
    }

    async fn send(&mut self, payload: Payload, count: u32) {
        match self.socket.write(payload.as_bytes()).await {
            Ok(()) => {
                self.logger.info(&format!("send data: '{}'", payload.label()))
                    .field("count", count)
                    .log()
                    .await;
            }
            Err(error) => self.on_error(error).await,
        }
    }

    async fn expire(&mut self) {
        if self.finished {
            return;
        }

        self.logger.error("test deadline elapsed before completion")
            .field("deadline_secs", self.timing.deadline.as_secs_f64())
            .log()
            .await;
        self.sink.assert(false, messages::DEADLINE);
        self.sink.result();
        self.finished = true;
    }
}

/// Roughly 30 years; stands in for instants the clock cannot represent
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `base + delay`, clamped instead of overflowing
fn later(base: Instant, delay: Duration) -> Instant {
    base.checked_add(delay)
        .or_else(|| base.checked_add(FAR_FUTURE))
        .unwrap_or(base)
}

/// `now + delay`, clamped instead of overflowing
fn after(delay: Duration) -> Instant {
    later(Instant::now(), delay)
}

/// Sleep until `deadline`, or forever when there is none
fn sleep_until_some(deadline: Option<Instant>) -> BoxFuture<'static, ()> {
    match deadline {
        Some(deadline) => sleep_until(deadline).boxed(),
        None => future::pending().boxed(),
    }
}
