//! OpenRouter chat-completions client.
//!
//! OpenRouter speaks the same wire protocol as OpenAI with a different
//! host and key, so this client mirrors [`crate::ai::OpenAiClient`].

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::ai::openai::short_request_id;
use crate::ai::{AiClient, QueryFuture, completion_body, excerpt, parse_completion};
use crate::config::AiProviderOptions;
use crate::errors::AppError;

const PROVIDER_NAME: &str = "OpenRouter";

pub struct OpenRouterClient {
    http: reqwest::Client,
    options: AiProviderOptions,
}

impl OpenRouterClient {
    pub fn new(http: reqwest::Client, options: AiProviderOptions) -> Self {
        Self { http, options }
    }
}

impl AiClient for OpenRouterClient {
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
                    warn!(request_id = %request_id, "openrouter request failed: {}", e);
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
                warn!(request_id = %request_id, status = status.as_u16(), "openrouter returned error status");
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
                "openrouter completion finished"
            );
            Ok(answer)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let client = OpenRouterClient::new(reqwest::Client::new(), AiProviderOptions::default());
        assert_eq!(client.provider_name(), "OpenRouter");
    }

    #[tokio::test]
    async fn test_error_status_maps_to_provider_error() {
        let base_url = crate::ai::serve_once("502 Bad Gateway", "upstream unavailable").await;
        let options = AiProviderOptions {
            base_url,
            api_key: "sk-test".to_string(),
            model: "qwen-2.5".to_string(),
            max_tokens: 16,
            timeout_secs: 5,
        };
        let client = OpenRouterClient::new(reqwest::Client::new(), options);

        let err = client.query("hello").await.err().unwrap();
        match err {
            AppError::AiProvider {
                provider,
                status,
                detail,
            } => {
                assert_eq!(provider, "OpenRouter");
                assert_eq!(status, Some(502));
                assert!(detail.contains("502"));
                assert!(detail.contains("upstream unavailable"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
