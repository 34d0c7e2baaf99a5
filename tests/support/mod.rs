//! Shared fixtures: a scripted in-memory connector and a recording UI.

#![allow(dead_code, clippy::panic)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::{StreamExt, future, sink, stream};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite;

use crew_link::config::ClientConfig;
use crew_link::domain::{ChannelState, StageVisual, WorkflowStage};
use crew_link::error::ClientError;
use crew_link::ui::ChatUi;
use crew_link::ws::{Channel, Connector, Frame, Handshake};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// What the next connect attempt does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Handshake succeeds.
    Accept,
    /// Handshake fails (connection refused).
    Refuse,
    /// Handshake never completes.
    Stall,
}

/// Backend end of an accepted channel.
#[derive(Debug, Clone)]
pub struct ServerSide {
    inbound: mpsc::UnboundedSender<Result<Frame, ClientError>>,
    outbound: Arc<Mutex<Vec<Frame>>>,
}

impl ServerSide {
    /// Pushes a text frame to the client.
    pub fn push_text(&self, text: &str) {
        let _ = self.inbound.send(Ok(Frame::Text(text.to_string())));
    }

    /// Sends a close frame to the client.
    pub fn close(&self, code: u16, reason: &str) {
        let _ = self.inbound.send(Ok(Frame::Close {
            code,
            reason: reason.to_string(),
        }));
    }

    /// Frames the client transmitted.
    pub fn received(&self) -> Vec<Frame> {
        lock(&self.outbound).clone()
    }
}

#[derive(Debug, Default)]
struct Script {
    outcomes: VecDeque<Outcome>,
    fallback: Option<Outcome>,
    attempts: Vec<Instant>,
    servers: Vec<ServerSide>,
}

/// Connector that plays back a list of outcomes, then repeats a fallback.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConnector {
    /// Plays `outcomes` in order, then `fallback` forever.
    pub fn new(outcomes: impl IntoIterator<Item = Outcome>, fallback: Outcome) -> Self {
        let script = Script {
            outcomes: outcomes.into_iter().collect(),
            fallback: Some(fallback),
            ..Script::default()
        };
        Self {
            script: Arc::new(Mutex::new(script)),
        }
    }

    /// Times at which connect was called.
    pub fn attempts(&self) -> Vec<Instant> {
        lock(&self.script).attempts.clone()
    }

    /// Backend ends of every accepted channel, oldest first.
    pub fn servers(&self) -> Vec<ServerSide> {
        lock(&self.script).servers.clone()
    }

    /// Backend end of the most recently accepted channel.
    pub fn latest_server(&self) -> ServerSide {
        let Some(server) = self.servers().pop() else {
            panic!("no channel was accepted");
        };
        server
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self, _url: &str) -> Result<Handshake, ClientError> {
        let mut script = lock(&self.script);
        script.attempts.push(Instant::now());
        let outcome = script
            .outcomes
            .pop_front()
            .or(script.fallback)
            .unwrap_or(Outcome::Refuse);

        match outcome {
            Outcome::Accept => {
                let (tx, rx) = mpsc::unbounded_channel();
                let outbound = Arc::new(Mutex::new(Vec::new()));
                script.servers.push(ServerSide {
                    inbound: tx,
                    outbound: Arc::clone(&outbound),
                });
                let frames = stream::unfold(rx, |mut rx| async move {
                    rx.recv().await.map(|item| (item, rx))
                })
                .boxed();
                let writer = sink::unfold(outbound, |outbound, frame: Frame| async move {
                    lock(&outbound).push(frame);
                    Ok::<_, ClientError>(outbound)
                });
                let channel = Channel {
                    sink: Box::pin(writer),
                    stream: frames,
                };
                Ok(Box::pin(future::ready(Ok::<_, ClientError>(channel))))
            }
            Outcome::Refuse => {
                let refused = tungstenite::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ));
                Ok(Box::pin(future::ready(Err(ClientError::from(refused)))))
            }
            Outcome::Stall => Ok(Box::pin(future::pending::<Result<Channel, ClientError>>())),
        }
    }
}

/// One call made on the UI collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCall {
    User(String),
    Agent(String),
    Notice(String),
    SendEnabled(bool),
    Connection(ChannelState),
    Status(WorkflowStage, String),
    Visual(WorkflowStage, StageVisual),
    ClearInput,
}

/// UI that records every call with the (possibly paused) tokio clock.
#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    calls: Arc<Mutex<Vec<(Instant, UiCall)>>>,
}

impl RecordingUi {
    fn record(&self, call: UiCall) {
        lock(&self.calls).push((Instant::now(), call));
    }

    /// Every call so far.
    pub fn calls(&self) -> Vec<(Instant, UiCall)> {
        lock(&self.calls).clone()
    }

    /// Texts of system notices so far.
    pub fn notices(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|(_, call)| match call {
                UiCall::Notice(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// First time `call` was made, if ever.
    pub fn first(&self, call: &UiCall) -> Option<Instant> {
        self.calls()
            .into_iter()
            .find(|(_, c)| c == call)
            .map(|(at, _)| at)
    }

    /// Whether `call` was made.
    pub fn saw(&self, call: &UiCall) -> bool {
        self.first(call).is_some()
    }
}

impl ChatUi for RecordingUi {
    fn render_user_message(&mut self, text: &str) {
        self.record(UiCall::User(text.to_string()));
    }

    fn render_agent_message(&mut self, text: &str) {
        self.record(UiCall::Agent(text.to_string()));
    }

    fn render_system_notice(&mut self, text: &str) {
        self.record(UiCall::Notice(text.to_string()));
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.record(UiCall::SendEnabled(enabled));
    }

    fn set_connection_state(&mut self, state: ChannelState) {
        self.record(UiCall::Connection(state));
    }

    fn set_workflow_status(&mut self, stage: WorkflowStage, status: &str) {
        self.record(UiCall::Status(stage, status.to_string()));
    }

    fn set_workflow_visual_state(&mut self, stage: WorkflowStage, state: StageVisual) {
        self.record(UiCall::Visual(stage, state));
    }

    fn clear_input_buffer(&mut self) {
        self.record(UiCall::ClearInput);
    }
}

/// Default configuration pointed at a dummy endpoint.
pub fn config() -> ClientConfig {
    ClientConfig {
        ws_url: "ws://crew.test/ws".to_string(),
        ..ClientConfig::default()
    }
}

/// Lets the connection task process everything runnable at the current
/// instant without advancing the paused clock.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Milliseconds as a duration.
pub const fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}
