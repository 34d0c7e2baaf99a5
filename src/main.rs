//! crew-link terminal client entry point.
//!
//! Reads chat lines from stdin and forwards them to the crew backend.
//! `/reconnect` forces a manual reconnect and `/quit` exits.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crew_link::config::ClientConfig;
use crew_link::domain::{ChannelState, StageVisual, WorkflowStage};
use crew_link::ui::ChatUi;
use crew_link::ui::format::emphasize_roles;
use crew_link::ws::{TungsteniteConnector, spawn};

/// Prints the conversation to stdout.
#[derive(Debug, Default)]
struct ConsoleUi;

impl ConsoleUi {
    fn line(text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{text}");
    }
}

impl ChatUi for ConsoleUi {
    fn render_user_message(&mut self, text: &str) {
        Self::line(&format!("you> {text}"));
    }

    fn render_agent_message(&mut self, text: &str) {
        let text = emphasize_roles(text)
            .replace("<strong>", "\x1b[1m")
            .replace("</strong>", "\x1b[0m");
        Self::line(&format!("crew> {text}"));
    }

    fn render_system_notice(&mut self, text: &str) {
        Self::line(&format!("-- {text}"));
    }

    fn set_send_enabled(&mut self, _enabled: bool) {}

    fn set_connection_state(&mut self, state: ChannelState) {
        tracing::debug!(%state, "status indicator");
    }

    fn set_workflow_status(&mut self, _stage: WorkflowStage, _status: &str) {}

    fn set_workflow_visual_state(&mut self, stage: WorkflowStage, state: StageVisual) {
        if state != StageVisual::Idle {
            Self::line(&format!("   [{stage}: {}]", state.status_text()));
        }
    }

    fn clear_input_buffer(&mut self) {}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = ClientConfig::from_env()?;
    tracing::info!(url = %config.ws_url, "starting crew-link");

    let (client, task) = spawn(&config, TungsteniteConnector, ConsoleUi);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => match line.trim() {
                    "/quit" => break,
                    "/reconnect" => client.manual_reconnect().await?,
                    _ => {
                        client.input_changed(line.as_str()).await?;
                        client.send(line.as_str()).await?;
                    }
                },
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    client.shutdown().await.ok();
    let manager = task.await?;
    let status = manager.status();
    tracing::info!(
        state = %status.state,
        retries = status.retries,
        reconnect_pending = status.reconnect_pending,
        "crew-link stopped"
    );

    Ok(())
}
