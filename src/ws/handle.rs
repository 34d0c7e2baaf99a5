//! Command surface for a running connection manager.
//!
//! [`spawn`] moves a [`ConnectionManager`] onto its own task and returns a
//! cloneable [`ClientHandle`] that feeds it commands.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::connection::ConnectionManager;
use super::transport::Connector;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::ui::ChatUi;

/// Requests handled by the connection task, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Transmit user text.
    Send(String),
    /// Reset the retry counter and reconnect now.
    ManualReconnect,
    /// The input draft changed.
    InputChanged(String),
    /// Close the channel and stop the task.
    Shutdown,
}

/// Cloneable sender of [`Command`]s.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    commands: mpsc::Sender<Command>,
}

impl ClientHandle {
    /// Wraps the sending half of a command queue.
    #[must_use]
    pub const fn new(commands: mpsc::Sender<Command>) -> Self {
        Self { commands }
    }

    /// Asks the manager to transmit `text`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Stopped`] if the connection task has ended.
    pub async fn send(&self, text: impl Into<String>) -> Result<(), ClientError> {
        self.submit(Command::Send(text.into())).await
    }

    /// Asks the manager to reconnect immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Stopped`] if the connection task has ended.
    pub async fn manual_reconnect(&self) -> Result<(), ClientError> {
        self.submit(Command::ManualReconnect).await
    }

    /// Reports the current input draft.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Stopped`] if the connection task has ended.
    pub async fn input_changed(&self, draft: impl Into<String>) -> Result<(), ClientError> {
        self.submit(Command::InputChanged(draft.into())).await
    }

    /// Asks the manager to close the channel and stop.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Stopped`] if the connection task has ended.
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        self.submit(Command::Shutdown).await
    }

    async fn submit(&self, command: Command) -> Result<(), ClientError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ClientError::Stopped)
    }
}

/// Spawns a connection manager for `config` on the current runtime.
///
/// The manager resets the workflow indicator and issues its first
/// connect as soon as the task starts. The join handle yields the manager
/// back after shutdown.
pub fn spawn<C, U>(
    config: &ClientConfig,
    connector: C,
    ui: U,
) -> (ClientHandle, JoinHandle<ConnectionManager<C, U>>)
where
    C: Connector,
    U: ChatUi,
{
    let (tx, rx) = mpsc::channel(config.command_capacity.max(1));
    let manager = ConnectionManager::new(config, connector, ui);
    let task = tokio::spawn(manager.run(rx));
    (ClientHandle::new(tx), task)
}
