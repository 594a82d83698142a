use crate::error::{ReportError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";
const CLAUDE_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// A single prompt in, a single text response out
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: String) -> Result<String>;
}

/// Read the API key from `var`; unset or blank counts as missing
pub fn credential_from_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|key| !key.trim().is_empty())
}

/// Claude Messages API client
pub struct MessagesClient {
    api_key: String,
    client: Client,
    model: String,
    max_tokens: u32,
}

impl MessagesClient {
    /// Create a new Messages API client
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            client,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Set the model to use
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn request(&self, prompt: String) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
        }
    }
}

#[async_trait]
impl CompletionProvider for MessagesClient {
    async fn complete(&self, prompt: String) -> Result<String> {
        let request = self.request(prompt);
        tracing::debug!(model = %request.model, max_tokens = request.max_tokens, "sending messages request");

        let response = self
            .client
            .post(CLAUDE_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", CLAUDE_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ReportError::api(format!(
                "API request failed with status {}: {}",
                status,
                api_error_message(&error_text)
            )));
        }

        let messages_response: MessagesResponse = response.json().await?;
        if let Some(reason) = &messages_response.stop_reason {
            tracing::debug!(stop_reason = %reason, "messages response received");
        }

        response_text(messages_response)
    }
}

/// Concatenate the text blocks of a response
fn response_text(response: MessagesResponse) -> Result<String> {
    let text: String = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .collect();

    if text.is_empty() {
        Err(ReportError::api("No text content in Claude response"))
    } else {
        Ok(text)
    }
}

/// Pull `error.message` out of an API error body, or return it unchanged
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = MessagesClient::new("sk-ant-test-key".to_string(), Duration::from_secs(5)).unwrap();
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_client_builder() {
        let client = MessagesClient::new("sk-ant-test-key".to_string(), Duration::from_secs(5))
            .unwrap()
            .with_model("claude-opus-4-1".to_string())
            .with_max_tokens(8192);

        assert_eq!(client.model, "claude-opus-4-1");
        assert_eq!(client.max_tokens, 8192);
    }

    #[test]
    fn test_request_body() {
        let client = MessagesClient::new("sk-ant-test-key".to_string(), Duration::from_secs(5))
            .unwrap()
            .with_max_tokens(1024);
        let body = serde_json::to_value(client.request("hello".to_string())).unwrap();

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_response_text_joins_text_blocks() {
        let response: MessagesResponse = serde_json::from_str(
            r###"{
                "id": "msg_01",
                "type": "message",
                "content": [
                    {"type": "text", "text": "# Daily Report\n"},
                    {"type": "tool_use", "id": "t1", "name": "noop", "input": {}},
                    {"type": "text", "text": "## Highlights\n"}
                ],
                "stop_reason": "end_turn"
            }"###,
        )
        .unwrap();

        assert_eq!(response_text(response).unwrap(), "# Daily Report\n## Highlights\n");
    }

    #[test]
    fn test_response_without_text_is_error() {
        let response: MessagesResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(matches!(response_text(response), Err(ReportError::Api(_))));
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        assert_eq!(api_error_message(body), "invalid x-api-key");
        assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_credential_from_env() {
        std::env::set_var("DAILY_REPORT_TEST_KEY_SET", "sk-ant-123");
        std::env::set_var("DAILY_REPORT_TEST_KEY_BLANK", "  ");
        assert_eq!(
            credential_from_env("DAILY_REPORT_TEST_KEY_SET"),
            Some("sk-ant-123".to_string())
        );
        assert_eq!(credential_from_env("DAILY_REPORT_TEST_KEY_BLANK"), None);
        assert_eq!(credential_from_env("DAILY_REPORT_TEST_KEY_UNSET"), None);
    }
}
