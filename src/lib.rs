pub mod ai;
pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod errors;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;

pub use ai::{AiClient, AiProviderFactory, MockClient, OpenAiClient, OpenRouterClient};
pub use api::{AppState, SharedState, create_router};
pub use auth::{
    Claim, CookieTokenAccessor, JwtTokenGenerator, JwtTokenParser, Principal, TokenAuthScheme,
};
pub use chat::{ChatRequest, ChatService, PromptTemplates, TaskType};
pub use config::{AppConfig, load_config, load_config_from};
pub use errors::AppError;

/// Assemble the full application router from a loaded configuration.
///
/// Builds the shared HTTP client, the provider registry, the prompt
/// templates and the token authentication scheme, then wires them into
/// the REST router.
pub fn build_router(config: AppConfig) -> Result<Router> {
    let http = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;

    let factory = Arc::new(AiProviderFactory::from_config(&config.chat, http)?);
    let templates = match &config.chat.template_dir {
        Some(dir) => PromptTemplates::from_dir(dir),
        None => PromptTemplates::builtin(),
    };
    let chat = ChatService::new(factory, templates);

    let auth = TokenAuthScheme::new(
        CookieTokenAccessor::new(&config.auth.cookie_name),
        Arc::new(JwtTokenParser::from_options(&config.auth)?),
        Arc::new(JwtTokenGenerator::from_options(&config.auth)?),
    );

    let state = Arc::new(AppState {
        auth,
        chat,
        users: config.users,
    });

    Ok(create_router(state))
}
