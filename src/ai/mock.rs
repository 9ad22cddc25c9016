//! Deterministic offline AI client for development and tests.

use std::time::Duration;

use tracing::debug;

use crate::ai::{AiClient, QueryFuture};

/// Answers locally with canned text after a short simulated delay.
///
/// Responses are deterministic for a given prompt so tests can assert on
/// them, and no network access or configuration is needed.
#[derive(Debug, Default, Clone)]
pub struct MockClient;

const SIMULATED_DELAY: Duration = Duration::from_millis(100);

impl AiClient for MockClient {
    fn provider_name(&self) -> &str {
        "Mock"
    }

    fn query<'a>(&'a self, prompt: &'a str) -> QueryFuture<'a> {
        assert!(
            !prompt.trim().is_empty(),
            "prompt must not be empty or whitespace"
        );

        Box::pin(async move {
            tokio::time::sleep(SIMULATED_DELAY).await;

            let lowered = prompt.to_ascii_lowercase();
            let response = if lowered.contains("summarize") {
                "[MOCK] Summary: the provided text covers its main points in brief.".to_string()
            } else if lowered.contains("explain") {
                "[MOCK] Explanation: the concept works by combining its parts step by step."
                    .to_string()
            } else {
                format!(
                    "[MOCK] I received your prompt of {} characters and this is a canned answer.",
                    prompt.len()
                )
            };

            debug!(response_len = response.len(), "mock completion produced");
            Ok(response)
        })
    }
}
