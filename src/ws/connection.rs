//! Connection lifecycle state machine.
//!
//! [`ConnectionManager`] owns the single channel, the retry counter, the
//! single pending reconnect deadline and the message dispatcher. Every
//! transition is a named method triggered by a transport event, a timer or
//! a command; [`ConnectionManager::run`] multiplexes those sources on one
//! task so no locking is needed.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

use super::dispatcher::MessageDispatcher;
use super::handle::Command;
use super::messages::OutboundEnvelope;
use super::transport::{ABNORMAL_CLOSURE, Channel, Connector, Frame, Handshake, NORMAL_CLOSURE};
use crate::config::ClientConfig;
use crate::domain::{ChannelState, ReconnectPolicy, RetryCounter, StageVisual, WorkflowStage};
use crate::error::ClientError;
use crate::ui::{ChatUi, reset_workflow, show_stage};

/// Notice shown when the channel opens.
pub const CONNECTED_NOTICE: &str = "Connected to the multi-agent system.";

/// Notice shown when the user asks for a reconnect.
pub const MANUAL_RECONNECT_NOTICE: &str = "Attempting manual reconnect...";

/// The channel slot: nothing, an open in progress, or an open channel.
enum Link {
    Idle,
    Handshaking(Handshake),
    Open(Channel),
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::Handshaking(_) => f.write_str("Handshaking"),
            Self::Open(_) => f.write_str("Open"),
        }
    }
}

/// Something the current link reported.
#[derive(Debug)]
enum LinkEvent {
    Opened(Channel),
    HandshakeFailed(ClientError),
    Message(String),
    Closed { code: u16, reason: String },
    Error(ClientError),
}

impl Link {
    /// Waits for the next event. Never resolves while idle.
    async fn next_event(&mut self) -> LinkEvent {
        match self {
            Self::Idle => std::future::pending().await,
            Self::Handshaking(handshake) => match handshake.await {
                Ok(channel) => LinkEvent::Opened(channel),
                Err(e) => LinkEvent::HandshakeFailed(e),
            },
            Self::Open(channel) => match channel.stream.next().await {
                Some(Ok(Frame::Text(text))) => LinkEvent::Message(text),
                Some(Ok(Frame::Close { code, reason })) => LinkEvent::Closed { code, reason },
                Some(Err(e)) => LinkEvent::Error(e),
                None => LinkEvent::Closed {
                    code: ABNORMAL_CLOSURE,
                    reason: String::new(),
                },
            },
        }
    }
}

/// Point-in-time view of the manager, for status displays and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// Current lifecycle state.
    pub state: ChannelState,
    /// Consecutive unexpected closes since the last success.
    pub retries: u32,
    /// Whether an automatic reconnect is scheduled.
    pub reconnect_pending: bool,
    /// Identifier of the current or last connection attempt.
    pub connection_id: Option<Uuid>,
    /// When the current channel opened.
    pub connected_since: Option<DateTime<Utc>>,
}

/// Owner of the channel and its reconnect policy.
#[derive(Debug)]
pub struct ConnectionManager<C, U> {
    url: String,
    connector: C,
    ui: U,
    policy: ReconnectPolicy,
    state: ChannelState,
    retries: RetryCounter,
    reconnect_at: Option<Instant>,
    link: Link,
    dispatcher: MessageDispatcher,
    connection_id: Option<Uuid>,
    connected_since: Option<DateTime<Utc>>,
}

impl<C: Connector, U: ChatUi> ConnectionManager<C, U> {
    /// Creates a manager in the `Disconnected` state. Nothing is opened
    /// until [`connect`](Self::connect) or [`run`](Self::run).
    #[must_use]
    pub fn new(config: &ClientConfig, connector: C, ui: U) -> Self {
        Self {
            url: config.ws_url.clone(),
            connector,
            ui,
            policy: config.reconnect_policy(),
            state: ChannelState::Disconnected,
            retries: RetryCounter::default(),
            reconnect_at: None,
            link: Link::Idle,
            dispatcher: MessageDispatcher::new(config.phase_interval()),
            connection_id: None,
            connected_since: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ChannelState {
        self.state
    }

    /// Current retry counter value.
    #[must_use]
    pub const fn retry_count(&self) -> u32 {
        self.retries.get()
    }

    /// Deadline of the pending automatic reconnect, if any.
    #[must_use]
    pub const fn reconnect_deadline(&self) -> Option<Instant> {
        self.reconnect_at
    }

    /// Snapshot for status displays.
    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        ConnectionStatus {
            state: self.state,
            retries: self.retries.get(),
            reconnect_pending: self.reconnect_at.is_some(),
            connection_id: self.connection_id,
            connected_since: self.connected_since,
        }
    }

    /// The UI collaborator.
    #[must_use]
    pub const fn ui(&self) -> &U {
        &self.ui
    }

    /// Starts a new connection attempt.
    ///
    /// Cancels the pending reconnect, retires the current channel and asks
    /// the connector for a new one. A construction failure leaves the
    /// manager `Disconnected` with a notice and schedules nothing.
    pub fn connect(&mut self) {
        self.reconnect_at = None;
        self.set_state(ChannelState::Connecting);
        self.retire_link();

        let connection_id = Uuid::new_v4();
        self.connection_id = Some(connection_id);
        match self.connector.connect(&self.url) {
            Ok(handshake) => {
                tracing::info!(%connection_id, url = %self.url, "opening channel");
                self.link = Link::Handshaking(handshake);
            }
            Err(e) => {
                tracing::error!(%connection_id, url = %self.url, error = %e, "cannot construct channel");
                self.set_state(ChannelState::Disconnected);
                self.ui.render_system_notice(&e.notice());
            }
        }
    }

    /// Resets the retry counter and connects immediately.
    pub fn manual_reconnect(&mut self) {
        tracing::info!(retries = self.retries.get(), "manual reconnect requested");
        self.ui.render_system_notice(MANUAL_RECONNECT_NOTICE);
        self.retries.reset();
        self.connect();
    }

    /// Transmits user text.
    ///
    /// While not connected nothing is transmitted: a notice is shown and a
    /// recovery [`connect`](Self::connect) is issued. Text that trims to
    /// empty is ignored.
    pub async fn send(&mut self, text: &str) {
        if !self.state.can_send() || !matches!(self.link, Link::Open(_)) {
            tracing::warn!(state = %self.state, "send while not connected");
            self.ui
                .render_system_notice(&ClientError::SendWhileDisconnected.notice());
            self.connect();
            return;
        }

        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let json = match OutboundEnvelope::new(text).to_json() {
            Ok(json) => json,
            Err(e) => {
                self.ui.render_system_notice(&e.notice());
                return;
            }
        };

        self.ui.render_user_message(text);
        let Link::Open(channel) = &mut self.link else {
            return;
        };
        if let Err(e) = channel.sink.send(Frame::Text(json)).await {
            tracing::warn!(error = %e, "outbound frame rejected");
            self.ui
                .render_system_notice(&ClientError::SendFailed(e.to_string()).notice());
            return;
        }

        tracing::debug!(len = text.len(), "message sent");
        self.ui.clear_input_buffer();
        self.ui.set_send_enabled(false);
        self.dispatcher.cancel_pending();
        reset_workflow(&mut self.ui);
        show_stage(&mut self.ui, WorkflowStage::Research, StageVisual::Active);
    }

    /// Updates send enablement for the current draft.
    pub fn input_changed(&mut self, draft: &str) {
        self.ui
            .set_send_enabled(self.state.can_send() && !draft.trim().is_empty());
    }

    /// The channel opened.
    fn on_open(&mut self, channel: Channel) {
        self.link = Link::Open(channel);
        self.retries.reset();
        self.connected_since = Some(Utc::now());
        self.set_state(ChannelState::Connected);
        self.ui.set_send_enabled(true);
        self.ui.render_system_notice(CONNECTED_NOTICE);
        tracing::info!(connection_id = ?self.connection_id, "channel established");
    }

    /// The channel closed. Schedules a reconnect while retries remain.
    fn on_close(&mut self, code: u16, reason: &str) {
        if let Link::Open(channel) = std::mem::replace(&mut self.link, Link::Idle) {
            release(channel, None);
        }
        self.connected_since = None;
        self.set_state(ChannelState::Disconnected);
        self.ui.set_send_enabled(false);

        let closed = ClientError::UnexpectedClose {
            code,
            reason: reason.to_string(),
        };
        match self.retries.advance(&self.policy) {
            Some((attempt, delay)) => {
                tracing::info!(
                    error = %closed,
                    attempt,
                    delay_ms = duration_ms(delay),
                    "reconnect scheduled"
                );
                self.ui.render_system_notice(&closed.reconnect_notice(
                    delay,
                    attempt,
                    self.policy.ceiling(),
                ));
                self.reconnect_at = Some(Instant::now() + delay);
            }
            None => {
                let exhausted = ClientError::RetryExhausted {
                    attempts: self.policy.ceiling(),
                };
                tracing::error!(cause = %closed, error = %exhausted, "reconnect attempts exhausted");
                self.ui.render_system_notice(&exhausted.notice());
            }
        }
    }

    /// The transport reported an error. The close that follows drives the
    /// state change.
    fn on_error(&mut self, error: &ClientError) {
        tracing::warn!(connection_id = ?self.connection_id, %error, "channel error");
    }

    /// Handles an inbound text frame.
    pub fn on_message(&mut self, raw: &str) {
        self.dispatcher.on_message(raw, Instant::now(), &mut self.ui);
    }

    /// Closes the channel without reconnecting.
    pub async fn shutdown(&mut self) {
        self.reconnect_at = None;
        self.dispatcher.cancel_pending();
        if let Link::Open(mut channel) = std::mem::replace(&mut self.link, Link::Idle) {
            let _ = channel
                .sink
                .send(Frame::Close {
                    code: NORMAL_CLOSURE,
                    reason: "client shutdown".to_string(),
                })
                .await;
            let _ = channel.sink.close().await;
        }
        self.set_state(ChannelState::Disconnected);
        tracing::info!("connection manager stopped");
    }

    /// Drives the manager until a shutdown command arrives or every
    /// [`ClientHandle`](super::handle::ClientHandle) is dropped. Returns
    /// the manager so its final state can be inspected.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Self {
        reset_workflow(&mut self.ui);
        self.connect();

        loop {
            let reconnect_at = self.reconnect_at;
            let phase_at = self.dispatcher.next_due();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Send(text)) => self.send(&text).await,
                    Some(Command::ManualReconnect) => self.manual_reconnect(),
                    Some(Command::InputChanged(draft)) => self.input_changed(&draft),
                    Some(Command::Shutdown) | None => break,
                },
                event = self.link.next_event() => self.handle_link_event(event),
                () = wait_until(reconnect_at) => self.connect(),
                () = wait_until(phase_at) => {
                    self.dispatcher.fire_due(Instant::now(), &mut self.ui);
                }
            }
        }

        self.shutdown().await;
        self
    }

    fn handle_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Opened(channel) => self.on_open(channel),
            LinkEvent::HandshakeFailed(e) if e.is_retriable() => {
                self.on_error(&e);
                self.on_close(ABNORMAL_CLOSURE, &e.to_string());
            }
            LinkEvent::HandshakeFailed(e) => {
                tracing::error!(connection_id = ?self.connection_id, error = %e, "handshake rejected");
                self.link = Link::Idle;
                self.set_state(ChannelState::Disconnected);
                self.ui.render_system_notice(&e.notice());
            }
            LinkEvent::Message(raw) => self.on_message(&raw),
            LinkEvent::Closed { code, reason } => self.on_close(code, &reason),
            LinkEvent::Error(e) => self.on_error(&e),
        }
    }

    fn set_state(&mut self, state: ChannelState) {
        if !state.can_send() {
            self.ui.set_send_enabled(false);
        }
        if self.state != state {
            tracing::debug!(from = %self.state, to = %state, "channel state changed");
            self.state = state;
        }
        self.ui.set_connection_state(state);
    }

    /// Drops the current link. An open channel is sent a close frame;
    /// its events are never observed again.
    fn retire_link(&mut self) {
        match std::mem::replace(&mut self.link, Link::Idle) {
            Link::Open(channel) => release(
                channel,
                Some(Frame::Close {
                    code: NORMAL_CLOSURE,
                    reason: "reconnecting".to_string(),
                }),
            ),
            Link::Handshaking(_) => tracing::debug!("abandoning in-flight handshake"),
            Link::Idle => {}
        }
    }
}

/// Closes `channel` on a detached task, sending `farewell` first if given.
/// Closing flushes any close reply the transport has queued.
fn release(mut channel: Channel, farewell: Option<Frame>) {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        return;
    };
    runtime.spawn(async move {
        if let Some(frame) = farewell {
            let _ = channel.sink.send(frame).await;
        }
        let _ = channel.sink.close().await;
    });
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn duration_ms(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};

    use futures_util::{Sink, future, stream};
    use tokio_test::{assert_pending, task};
    use tokio_tungstenite::tungstenite;

    use super::*;
    use crate::ui::Transcript;

    /// Connector whose handshakes never resolve; records how often it was
    /// asked to connect.
    #[derive(Debug, Clone, Default)]
    struct StallingConnector {
        calls: Arc<Mutex<u32>>,
        reject: bool,
    }

    impl StallingConnector {
        fn calls(&self) -> u32 {
            self.calls.lock().map(|c| *c).unwrap_or_default()
        }
    }

    impl Connector for StallingConnector {
        fn connect(&self, url: &str) -> Result<Handshake, ClientError> {
            if let Ok(mut calls) = self.calls.lock() {
                *calls += 1;
            }
            if self.reject {
                return Err(ClientError::InvalidEndpoint {
                    url: url.to_string(),
                    reason: "rejected".to_string(),
                });
            }
            Ok(Box::pin(future::pending::<Result<Channel, ClientError>>()))
        }
    }

    /// Sink that records frames and whether it was closed.
    struct RecordingSink {
        sent: Arc<Mutex<Vec<Frame>>>,
        closed: Arc<AtomicBool>,
    }

    impl Sink<Frame> for RecordingSink {
        type Error = ClientError;

        fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), ClientError>> {
            Poll::Ready(Ok(()))
        }

        fn start_send(self: Pin<&mut Self>, frame: Frame) -> Result<(), ClientError> {
            if let Ok(mut frames) = self.sent.lock() {
                frames.push(frame);
            }
            Ok(())
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), ClientError>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), ClientError>> {
            self.closed.store(true, Ordering::SeqCst);
            Poll::Ready(Ok(()))
        }
    }

    fn channel_closing_into(sent: Arc<Mutex<Vec<Frame>>>, closed: Arc<AtomicBool>) -> Channel {
        Channel {
            sink: Box::pin(RecordingSink { sent, closed }),
            stream: stream::pending::<Result<Frame, ClientError>>().boxed(),
        }
    }

    fn channel_sinking_into(sent: Arc<Mutex<Vec<Frame>>>) -> Channel {
        channel_closing_into(sent, Arc::default())
    }

    async fn drain_detached_tasks() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn manager(connector: StallingConnector) -> ConnectionManager<StallingConnector, Transcript> {
        ConnectionManager::new(&ClientConfig::default(), connector, Transcript::new())
    }

    #[test]
    fn idle_link_never_yields() {
        let mut link = Link::Idle;
        let mut next = task::spawn(link.next_event());
        assert_pending!(next.poll());
    }

    #[tokio::test]
    async fn connect_enters_connecting() {
        let connector = StallingConnector::default();
        let mut mgr = manager(connector.clone());
        mgr.connect();
        assert_eq!(mgr.state(), ChannelState::Connecting);
        assert_eq!(connector.calls(), 1);
        assert!(mgr.status().connection_id.is_some());
        assert_eq!(mgr.ui().connection_state(), ChannelState::Connecting);
    }

    #[tokio::test]
    async fn construction_failure_is_not_retried() {
        let mut mgr = manager(StallingConnector {
            reject: true,
            ..StallingConnector::default()
        });
        mgr.connect();
        assert_eq!(mgr.state(), ChannelState::Disconnected);
        assert_eq!(mgr.reconnect_deadline(), None);
        assert_eq!(
            mgr.ui().notices().collect::<Vec<_>>(),
            vec!["Error while creating the connection to the server."]
        );
    }

    #[tokio::test]
    async fn open_resets_counter_and_enables_send() {
        let mut mgr = manager(StallingConnector::default());
        mgr.connect();
        mgr.on_close(ABNORMAL_CLOSURE, "");
        mgr.on_close(ABNORMAL_CLOSURE, "");
        assert_eq!(mgr.retry_count(), 2);

        mgr.on_open(channel_sinking_into(Arc::default()));
        assert_eq!(mgr.retry_count(), 0);
        assert_eq!(mgr.state(), ChannelState::Connected);
        assert!(mgr.ui().send_enabled());
        assert!(mgr.status().connected_since.is_some());
        assert_eq!(mgr.ui().notices().last(), Some(CONNECTED_NOTICE));
    }

    #[tokio::test]
    async fn close_schedules_capped_backoff() {
        let mut mgr = manager(StallingConnector::default());
        for attempt in 1..=5_u64 {
            let before = Instant::now();
            mgr.on_close(ABNORMAL_CLOSURE, "gone");
            let Some(deadline) = mgr.reconnect_deadline() else {
                panic!("attempt {attempt} not scheduled");
            };
            let expected = Duration::from_millis((attempt * 2_000).min(10_000));
            assert!(deadline >= before + expected);
            assert!(deadline <= Instant::now() + expected);
            assert!(mgr.status().reconnect_pending);
        }
        assert_eq!(mgr.retry_count(), 5);
    }

    #[tokio::test]
    async fn exhausted_retries_schedule_nothing() {
        let mut mgr = manager(StallingConnector::default());
        for _ in 0..5 {
            mgr.on_close(ABNORMAL_CLOSURE, "");
        }
        mgr.reconnect_at = None;
        mgr.on_close(ABNORMAL_CLOSURE, "");
        assert_eq!(mgr.reconnect_deadline(), None);
        assert!(!mgr.status().reconnect_pending);
        assert_eq!(mgr.retry_count(), 5);
        let terminal: Vec<&str> = mgr
            .ui()
            .notices()
            .filter(|n| n.starts_with("Unable to reach"))
            .collect();
        assert_eq!(terminal.len(), 1);
    }

    #[tokio::test]
    async fn manual_reconnect_resets_and_cancels_timer() {
        let connector = StallingConnector::default();
        let mut mgr = manager(connector.clone());
        for _ in 0..5 {
            mgr.on_close(ABNORMAL_CLOSURE, "");
        }
        assert!(mgr.reconnect_deadline().is_some());

        mgr.manual_reconnect();
        assert_eq!(mgr.retry_count(), 0);
        assert_eq!(mgr.reconnect_deadline(), None);
        assert_eq!(mgr.state(), ChannelState::Connecting);
        assert_eq!(connector.calls(), 1);
    }

    #[tokio::test]
    async fn send_while_disconnected_triggers_one_connect() {
        let connector = StallingConnector::default();
        let mut mgr = manager(connector.clone());
        mgr.send("hello").await;
        assert_eq!(connector.calls(), 1);
        assert_eq!(mgr.state(), ChannelState::Connecting);
        assert!(mgr.ui().entries().iter().all(|e| e.text != "hello"));
    }

    #[tokio::test]
    async fn send_transmits_envelope_and_restarts_workflow() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut mgr = manager(StallingConnector::default());
        mgr.on_open(channel_sinking_into(Arc::clone(&sent)));

        mgr.send("  what is rust?  ").await;

        let frames = sent.lock().map(|f| f.clone()).unwrap_or_default();
        assert_eq!(
            frames,
            vec![Frame::Text(r#"{"message":"what is rust?"}"#.to_string())]
        );
        assert_eq!(mgr.ui().inputs_cleared(), 1);
        assert!(!mgr.ui().send_enabled());
        assert_eq!(
            mgr.ui().stage(WorkflowStage::Research).visual,
            StageVisual::Active
        );
        assert_eq!(
            mgr.ui().stage(WorkflowStage::Analysis).visual,
            StageVisual::Idle
        );
    }

    #[tokio::test]
    async fn blank_send_is_ignored_when_connected() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut mgr = manager(StallingConnector::default());
        mgr.on_open(channel_sinking_into(Arc::clone(&sent)));
        mgr.send("   ").await;
        assert!(sent.lock().map(|f| f.is_empty()).unwrap_or(false));
        assert_eq!(mgr.ui().inputs_cleared(), 0);
    }

    #[tokio::test]
    async fn input_changed_requires_connection_and_text() {
        let mut mgr = manager(StallingConnector::default());
        mgr.input_changed("draft");
        assert!(!mgr.ui().send_enabled());
        mgr.on_open(channel_sinking_into(Arc::default()));
        mgr.input_changed("  ");
        assert!(!mgr.ui().send_enabled());
        mgr.input_changed("draft");
        assert!(mgr.ui().send_enabled());
    }

    #[tokio::test]
    async fn malformed_frame_keeps_state() {
        let mut mgr = manager(StallingConnector::default());
        mgr.on_open(channel_sinking_into(Arc::default()));
        let before = mgr.ui().notices().count();
        mgr.on_message("][");
        assert_eq!(mgr.state(), ChannelState::Connected);
        assert_eq!(mgr.ui().notices().count(), before + 1);
    }

    #[tokio::test]
    async fn error_alone_does_not_disconnect() {
        let mut mgr = manager(StallingConnector::default());
        mgr.on_open(channel_sinking_into(Arc::default()));
        mgr.on_error(&ClientError::SendFailed("boom".to_string()));
        assert_eq!(mgr.state(), ChannelState::Connected);
    }

    #[tokio::test]
    async fn remote_close_completes_the_closing_handshake() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let mut mgr = manager(StallingConnector::default());
        mgr.on_open(channel_closing_into(Arc::clone(&sent), Arc::clone(&closed)));

        mgr.on_close(NORMAL_CLOSURE, "server restart");
        drain_detached_tasks().await;

        assert!(closed.load(Ordering::SeqCst));
        assert!(sent.lock().map(|f| f.is_empty()).unwrap_or(false));
        assert!(mgr.ui().notices().last().is_some_and(|n| {
            n.starts_with("Disconnected from the server. Reconnecting in 2 seconds")
        }));
    }

    #[tokio::test]
    async fn replaced_channel_is_closed_normally() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let mut mgr = manager(StallingConnector::default());
        mgr.on_open(channel_closing_into(Arc::clone(&sent), Arc::clone(&closed)));

        mgr.manual_reconnect();
        drain_detached_tasks().await;

        let frames = sent.lock().map(|f| f.clone()).unwrap_or_default();
        assert_eq!(
            frames,
            vec![Frame::Close {
                code: NORMAL_CLOSURE,
                reason: "reconnecting".to_string(),
            }]
        );
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(mgr.retry_count(), 0);
        assert_eq!(mgr.reconnect_deadline(), None);
    }

    #[tokio::test]
    async fn transport_handshake_failure_backs_off() {
        let mut mgr = manager(StallingConnector::default());
        mgr.connect();
        mgr.handle_link_event(LinkEvent::HandshakeFailed(ClientError::Transport(
            tungstenite::Error::ConnectionClosed,
        )));
        assert_eq!(mgr.state(), ChannelState::Disconnected);
        assert_eq!(mgr.retry_count(), 1);
        assert!(mgr.status().reconnect_pending);
    }

    #[tokio::test]
    async fn rejected_handshake_is_not_retried() {
        let mut mgr = manager(StallingConnector::default());
        mgr.connect();
        mgr.handle_link_event(LinkEvent::HandshakeFailed(ClientError::InvalidEndpoint {
            url: "ws://crew.test/ws".to_string(),
            reason: "rejected".to_string(),
        }));
        assert_eq!(mgr.state(), ChannelState::Disconnected);
        assert_eq!(mgr.retry_count(), 0);
        assert_eq!(mgr.reconnect_deadline(), None);
        assert_eq!(
            mgr.ui().notices().last(),
            Some("Error while creating the connection to the server.")
        );
    }
}
