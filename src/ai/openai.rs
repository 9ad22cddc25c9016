//! OpenAI chat-completions client.

use std::time::{Duration, Instant};

use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::{AiClient, QueryFuture, completion_body, excerpt, parse_completion};
use crate::config::AiProviderOptions;
use crate::errors::AppError;

const PROVIDER_NAME: &str = "OpenAi";

/// Calls the OpenAI `v1/chat/completions` endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    options: AiProviderOptions,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, options: AiProviderOptions) -> Self {
        Self { http, options }
    }
}

impl AiClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    fn query<'a>(&'a self, prompt: &'a str) -> QueryFuture<'a> {
        assert!(
            !prompt.trim().is_empty(),
            "prompt must not be empty or whitespace"
        );

        Box::pin(async move {
            let request_id = short_request_id();
            let started = Instant::now();

            let url = format!("{}v1/chat/completions", self.options.base_url);
            let body = completion_body(&self.options.model, self.options.max_tokens, prompt);

            let response = self
                .http
                .post(&url)
                .bearer_auth(&self.options.api_key)
                .timeout(Duration::from_secs(self.options.timeout_secs))
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    warn!(request_id = %request_id, "openai request failed: {}", e);
                    AppError::ai_provider(PROVIDER_NAME, None, format!("request failed: {}", e))
                })?;

            let status = response.status();
            let text = response.text().await.map_err(|e| {
                AppError::ai_provider(PROVIDER_NAME, Some(status.as_u16()), format!(
                    "failed to read response body: {}",
                    e
                ))
            })?;

            if !status.is_success() {
                warn!(request_id = %request_id, status = status.as_u16(), "openai returned error status");
                return Err(AppError::ai_provider(
                    PROVIDER_NAME,
                    Some(status.as_u16()),
                    format!("API returned {}: {}", status.as_u16(), excerpt(&text)),
                ));
            }

            let answer = parse_completion(&text)
                .map_err(|e| AppError::ai_provider(PROVIDER_NAME, Some(status.as_u16()), e))?;

            info!(
                request_id = %request_id,
                duration_ms = started.elapsed().as_millis() as u64,
                response_len = answer.len(),
                "openai completion finished"
            );
            Ok(answer)
        })
    }
}

/// Short correlation id for provider call logs.
pub(crate) fn short_request_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_request_id_is_eight_hex_chars() {
        let id = short_request_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_provider_name() {
        let client = OpenAiClient::new(reqwest::Client::new(), AiProviderOptions::default());
        assert_eq!(client.provider_name(), "OpenAi");
    }

    fn stub_options(base_url: String) -> AiProviderOptions {
        AiProviderOptions {
            base_url,
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 16,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_error_status_maps_to_provider_error() {
        let base_url =
            crate::ai::serve_once("500 Internal Server Error", "Internal Server Error").await;
        let client = OpenAiClient::new(reqwest::Client::new(), stub_options(base_url));

        let err = client.query("hello").await.err().unwrap();
        match err {
            AppError::AiProvider {
                provider,
                status,
                detail,
            } => {
                assert_eq!(provider, "OpenAi");
                assert_eq!(status, Some(500));
                assert!(detail.contains("500"));
                assert!(detail.contains("Internal Server Error"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_success_body_yields_completion() {
        let base_url =
            crate::ai::serve_once("200 OK", r#"{"choices":[{"message":{"content":"hi"}}]}"#).await;
        let client = OpenAiClient::new(reqwest::Client::new(), stub_options(base_url));

        let answer = client.query("hello").await.unwrap();
        assert_eq!(answer, "hi");
    }
}
