pub mod agent;
pub mod claude;
pub mod prompt;

pub use agent::{AgentEvent, AgentRequest, AgentRuntime, ClaudeAgent};
pub use claude::{credential_from_env, CompletionProvider, MessagesClient};
