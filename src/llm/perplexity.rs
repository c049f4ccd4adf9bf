use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cli::config::ApiConfig;
use crate::error::ApiError;

/// Anything that can turn a conversation into a completion
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, messages: Vec<Message>) -> Result<Completion, ApiError>;
}

/// Perplexity chat-completions client
#[derive(Clone)]
pub struct PerplexityClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

/// Request structure for the chat-completions endpoint
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
}

/// Message structure for chat requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Response structure from the chat-completions endpoint
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Message,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Model answer split into its reasoning and final parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub answer: String,
    pub reasoning: Option<String>,
}

impl Completion {
    /// Split a raw model answer on its `<think>` block
    pub fn from_raw(raw: &str) -> Self {
        let (reasoning, answer) = split_reasoning(raw);
        Self { answer, reasoning }
    }
}

impl PerplexityClient {
    /// Create a new client from API settings
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a conversation and return the raw response
    pub async fn send_conversation(&self, messages: Vec<Message>) -> Result<ChatResponse, ApiError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
        };

        info!(model = %self.model, messages = request.messages.len(), "sending chat request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = describe_body(response.text().await);
            warn!(status = status.as_u16(), "chat request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "chat request completed"
            );
        }
        Ok(chat_response)
    }

    /// Create a system message for conversation context
    pub fn create_system_message(content: &str) -> Message {
        Message {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    /// Create a user message
    pub fn create_user_message(content: &str) -> Message {
        Message {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[async_trait]
impl CompletionProvider for PerplexityClient {
    async fn complete(&self, messages: Vec<Message>) -> Result<Completion, ApiError> {
        let response = self.send_conversation(messages).await?;
        let content = extract_response_content(&response).ok_or(ApiError::EmptyResponse)?;
        Ok(Completion::from_raw(&content))
    }
}

/// Extract the response content from a ChatResponse
pub fn extract_response_content(response: &ChatResponse) -> Option<String> {
    response
        .choices
        .first()
        .map(|choice| choice.message.content.clone())
}

/// Body text of an error response, or why it could not be read
fn describe_body<E: std::fmt::Display>(read: Result<String, E>) -> String {
    read.unwrap_or_else(|e| format!("<unreadable body: {}>", e))
}

/// Separate a `<think>...</think>` block from the rest of an answer
pub fn split_reasoning(raw: &str) -> (Option<String>, String) {
    static THINK: OnceLock<Regex> = OnceLock::new();
    let think = THINK.get_or_init(|| Regex::new(r"(?is)<think>(.*?)</think>").expect("valid regex"));
    let reasoning = think
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|r| !r.is_empty());
    let answer = think.replace_all(raw, "").trim().to_string();
    (reasoning, answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_error_body_is_described() {
        let read: Result<String, std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "connection closed"));
        assert_eq!(describe_body(read), "<unreadable body: connection closed>");
        assert_eq!(describe_body::<std::io::Error>(Ok("bad key".to_string())), "bad key");
    }

    #[test]
    fn test_split_reasoning() {
        let (reasoning, answer) =
            split_reasoning("<think>\nThe user wants a list.\n</think>\n\nHere it is.");
        assert_eq!(reasoning.as_deref(), Some("The user wants a list."));
        assert_eq!(answer, "Here it is.");
    }

    #[test]
    fn test_split_reasoning_case_insensitive() {
        let (reasoning, answer) = split_reasoning("<THINK>hmm</Think>ok");
        assert_eq!(reasoning.as_deref(), Some("hmm"));
        assert_eq!(answer, "ok");
    }

    #[test]
    fn test_split_without_reasoning() {
        let completion = Completion::from_raw("  plain answer ");
        assert_eq!(completion.reasoning, None);
        assert_eq!(completion.answer, "plain answer");
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "sonar".to_string(),
            messages: vec![
                PerplexityClient::create_system_message("ctx"),
                PerplexityClient::create_user_message("hi"),
            ],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "sonar");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_response_content(&response).as_deref(), Some("hello"));
        assert!(response.usage.is_none());
    }
}
