//! Groq chat completions client for answer generation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::llm::LlmProvider;

/// Groq API client (OpenAI-compatible chat completions)
pub struct GroqClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: LlmConfig,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

impl GroqClient {
    /// Create a new Groq client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

fn first_choice(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| Error::llm("No choices in completion response"))
}

#[async_trait]
impl LlmProvider for GroqClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::info!("Generating answer with model: {}", self.config.model);

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::llm(format!("Generation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::llm(format!(
                "Generation failed: HTTP {} - {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::llm(format!("Failed to parse generation response: {}", e)))?;

        first_choice(completion)
    }

    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_endpoint() {
        let client = GroqClient::new(&LlmConfig::default()).unwrap();
        assert_eq!(client.endpoint(), "https://api.groq.com/openai/v1/chat/completions");
    }

    #[test]
    fn test_first_choice_verbatim() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"  The blood pressure is 120/80.\n"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice(response).unwrap(), "  The blood pressure is 120/80.\n");

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_choice(empty), Err(Error::Llm(_))));
    }

    /// Serve canned completions on a local port, counting requests
    async fn mock_groq(status: StatusCode, body: &'static str) -> (LlmConfig, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/chat/completions",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (status, body)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = LlmConfig {
            base_url: format!("http://{}", addr),
            timeout_secs: 5,
            ..LlmConfig::default()
        };
        (config, calls)
    }

    #[tokio::test]
    async fn test_http_failure_is_not_retried() {
        let (config, calls) = mock_groq(StatusCode::INTERNAL_SERVER_ERROR, "upstream down").await;
        let client = GroqClient::new(&config).unwrap();

        let err = client.generate("what is the blood pressure?").await.unwrap_err();

        match err {
            Error::Llm(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("upstream down"));
            }
            other => panic!("expected Llm error, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let (config, calls) = mock_groq(
            StatusCode::OK,
            r#"{"choices":[{"message":{"role":"assistant","content":"BP is 120/80."}}]}"#,
        )
        .await;
        let client = GroqClient::new(&config).unwrap();

        assert_eq!(client.generate("blood pressure?").await.unwrap(), "BP is 120/80.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
