//! Provider registry and name resolution.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::ai::{AiClient, MockClient, OpenAiClient, OpenRouterClient};
use crate::config::ChatOptions;
use crate::errors::AppError;

/// Holds the registered AI clients and resolves provider names.
///
/// Resolution is strict: an unknown name is an error, never silently
/// substituted with another provider.
pub struct AiProviderFactory {
    clients: Vec<Arc<dyn AiClient>>,
}

impl AiProviderFactory {
    pub fn new(clients: Vec<Arc<dyn AiClient>>) -> Self {
        Self { clients }
    }

    /// Build the registry from configuration.
    ///
    /// Only providers named in the config are registered, including the
    /// mock. Network providers must carry complete connection settings or
    /// startup fails.
    pub fn from_config(options: &ChatOptions, http: reqwest::Client) -> anyhow::Result<Self> {
        let mut clients: Vec<Arc<dyn AiClient>> = Vec::new();

        for (name, provider) in &options.providers {
            match name.as_str() {
                "mock" => clients.push(Arc::new(MockClient)),
                "openai" => {
                    provider.require_connection(name)?;
                    clients.push(Arc::new(OpenAiClient::new(http.clone(), provider.clone())));
                }
                "openrouter" => {
                    provider.require_connection(name)?;
                    clients.push(Arc::new(OpenRouterClient::new(
                        http.clone(),
                        provider.clone(),
                    )));
                }
                other => anyhow::bail!("unknown AI provider '{}' in configuration", other),
            }
        }

        Ok(Self::new(clients))
    }

    /// Resolve a provider by name, case-insensitively.
    pub fn get_client(&self, name: &str) -> Result<Arc<dyn AiClient>, AppError> {
        if self.clients.is_empty() {
            return Err(AppError::provider_not_found(
                name,
                "no AI clients are registered",
            ));
        }
        if name.trim().is_empty() {
            return Err(AppError::provider_not_found(
                name,
                "provider name must not be empty",
            ));
        }

        for client in &self.clients {
            if client.provider_name().eq_ignore_ascii_case(name) {
                debug!(provider = client.provider_name(), "resolved AI client");
                return Ok(Arc::clone(client));
            }
        }

        let available = self.provider_names().join(", ");
        warn!(
            requested = name,
            available = %available,
            "requested AI provider is not registered"
        );
        Err(AppError::provider_not_found(
            name,
            format!("no AI client is registered for provider '{}'", name),
        ))
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.clients
            .iter()
            .map(|c| c.provider_name().to_string())
            .collect()
    }
}
