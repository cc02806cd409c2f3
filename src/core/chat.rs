use crate::config::settings::Settings;
use crate::domain::ports::ChatModel;
use crate::utils::error::{BriefError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// 聊天補全端點的薄封裝：送出 prompt，取回單一補全字串
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f64,
    max_tokens: u32,
}

impl ChatClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let api_key = settings.resolve_api_key()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.api.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.api.endpoint.clone(),
            model: settings.api.model.clone(),
            api_key,
            temperature: settings.api.temperature,
            max_tokens: settings.api.max_tokens,
        })
    }
}

#[async_trait]
impl ChatModel for ChatClient {
    async fn chat(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!("Sending chat request to: {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Chat response status: {}", status);

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response body".to_string());
            return Err(BriefError::ChatError {
                message: format!("HTTP {}: {}", status, error_body),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let choice = parsed.choices.first().ok_or_else(|| BriefError::ChatError {
            message: "Response contained no choices".to_string(),
        })?;

        Ok(choice.message.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_settings(endpoint: String) -> Settings {
        let mut settings = Settings::default();
        settings.api.endpoint = endpoint;
        settings.api.api_key = Some("sk-test".to_string());
        settings
    }

    #[tokio::test]
    async fn test_chat_returns_trimmed_completion() {
        let server = MockServer::start();
        let chat_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("Authorization", "Bearer sk-test")
                .json_body_partial(r#"{"model": "deepseek-chat"}"#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "  hello world  \n"}}
                    ]
                }));
        });

        let settings = test_settings(server.url("/v1/chat/completions"));
        let client = ChatClient::new(&settings).unwrap();

        let completion = client.chat("say hello").await.unwrap();

        chat_mock.assert();
        assert_eq!(completion, "hello world");
    }

    #[tokio::test]
    async fn test_chat_error_status_is_reported() {
        let server = MockServer::start();
        let chat_mock = server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(401).body("invalid api key");
        });

        let settings = test_settings(server.url("/v1/chat/completions"));
        let client = ChatClient::new(&settings).unwrap();

        let result = client.chat("say hello").await;

        chat_mock.assert();
        match result {
            Err(BriefError::ChatError { message }) => {
                assert!(message.contains("401"));
                assert!(message.contains("invalid api key"));
            }
            other => panic!("expected ChatError, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_chat_empty_choices_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"choices": []}));
        });

        let settings = test_settings(server.url("/v1/chat/completions"));
        let client = ChatClient::new(&settings).unwrap();

        assert!(client.chat("say hello").await.is_err());
    }

    #[test]
    fn test_missing_api_key_fails_construction() {
        std::env::remove_var(crate::config::settings::API_KEY_ENV);
        let settings = Settings::default();
        assert!(ChatClient::new(&settings).is_err());
    }
}
