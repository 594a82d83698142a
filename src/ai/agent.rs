use crate::ai::claude::credential_from_env;
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Variable the claude CLI reads its API key from
const CLI_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// One event from the agent, in the order it was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// Assistant text
    Text(String),
    /// The agent invoked a tool
    ToolCall { name: String },
    /// Terminal marker for the run
    Result { subtype: String, is_error: bool },
}

/// What the agent is asked to do and what it may use
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub prompt: String,
    pub allowed_tools: Vec<String>,
    pub permission_mode: String,
    pub workdir: PathBuf,
}

/// An agent that streams [`AgentEvent`]s for a request.
///
/// The returned channel closes once the agent has finished, so anything it
/// wrote to disk is visible by the time the receiver yields `None`.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn start(&self, request: AgentRequest) -> Result<mpsc::Receiver<AgentEvent>>;
}

/// Runs the `claude` CLI in print mode with `stream-json` output
pub struct ClaudeAgent {
    binary: PathBuf,
    api_key_env: String,
}

impl ClaudeAgent {
    pub fn new(binary: PathBuf, api_key_env: String) -> Self {
        Self {
            binary,
            api_key_env,
        }
    }

    fn command_args(request: &AgentRequest) -> Vec<String> {
        vec![
            "--print".to_string(),
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--verbose".to_string(),
            "--allowedTools".to_string(),
            request.allowed_tools.join(","),
            "--permission-mode".to_string(),
            request.permission_mode.clone(),
            request.prompt.clone(),
        ]
    }

    /// The CLI invocation, with the API key exported when one is configured
    fn command(&self, request: &AgentRequest) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .args(Self::command_args(request))
            .current_dir(&request.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        match credential_from_env(&self.api_key_env) {
            Some(key) => {
                tracing::info!(var = %self.api_key_env, "agent authenticates with API key");
                command.env(CLI_API_KEY_ENV, key);
            }
            None => tracing::info!("agent uses the claude CLI login session"),
        }

        command
    }
}

#[async_trait]
impl AgentRuntime for ClaudeAgent {
    async fn start(&self, request: AgentRequest) -> Result<mpsc::Receiver<AgentEvent>> {
        let mut child = self.command(&request).spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReportError::AgentNotFound {
                    binary: self.binary.clone(),
                }
            } else {
                ReportError::agent(format!("failed to spawn {}: {}", self.binary.display(), e))
            }
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReportError::agent("failed to capture agent stdout"))?;

        let (tx, rx) = mpsc::channel(100);

        tokio::spawn(async move {
            if let Err(e) = pump_events(BufReader::new(stdout), &tx).await {
                tracing::error!(error = %e, "reading agent output failed");
            }

            // Hold the sender until the process is gone.
            match child.wait().await {
                Ok(status) if !status.success() => {
                    tracing::warn!(code = ?status.code(), "agent exited with failure");
                }
                Ok(_) => tracing::debug!("agent exited"),
                Err(e) => tracing::error!(error = %e, "failed to wait for agent"),
            }
            drop(tx);
        });

        Ok(rx)
    }
}

/// Decode every line of `reader` and forward the events in order
pub async fn pump_events<R>(reader: R, tx: &mpsc::Sender<AgentEvent>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        for event in decode_line(&line) {
            if tx.send(event).await.is_err() {
                tracing::debug!("event receiver dropped");
                return Ok(());
            }
        }
    }

    Ok(())
}

/// Decode one `stream-json` line.
///
/// Blank lines, unparsable lines and message kinds other than `assistant`
/// and `result` yield no events.
pub fn decode_line(line: &str) -> Vec<AgentEvent> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }

    let message: StreamMessage = match serde_json::from_str(line) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(error = %e, "skipping non-event line");
            return Vec::new();
        }
    };

    match message {
        StreamMessage::Assistant { message } => message
            .content
            .into_iter()
            .filter_map(|block| match block {
                StreamBlock::Text { text } => Some(AgentEvent::Text(text)),
                StreamBlock::ToolUse { name } => Some(AgentEvent::ToolCall { name }),
                StreamBlock::Other => None,
            })
            .collect(),
        StreamMessage::Result { subtype, is_error } => {
            vec![AgentEvent::Result { subtype, is_error }]
        }
        StreamMessage::System { subtype } => {
            tracing::debug!(?subtype, "agent system message");
            Vec::new()
        }
        StreamMessage::Other => Vec::new(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamMessage {
    Assistant {
        message: AssistantPayload,
    },
    Result {
        #[serde(default)]
        subtype: String,
        #[serde(default)]
        is_error: bool,
    },
    System {
        #[serde(default)]
        subtype: Option<String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AssistantPayload {
    #[serde(default)]
    content: Vec<StreamBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamBlock {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
    },
    #[serde(other)]
    Other,
}
