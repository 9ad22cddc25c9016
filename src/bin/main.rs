use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use prompt_relay::{AiProviderFactory, build_router, config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prompt-relay")]
#[command(about = "Authenticated AI chat relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST server
    Serve {
        #[arg(short, long, default_value = "8080")]
        port: u16,
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Path to the configuration file
        #[arg(long, env = "PROMPT_RELAY_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Run a one-off query against a configured provider
    Query {
        prompt: String,
        #[arg(short = 'P', long, default_value = "Mock")]
        provider: String,
        #[arg(long, env = "PROMPT_RELAY_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the password digest for a config user entry
    HashPassword { password: String },
}

fn load(config_path: Option<PathBuf>) -> Result<config::AppConfig> {
    match config_path {
        Some(path) => config::load_config_from(&path),
        None => config::load_config(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, bind, config } => {
            let app_config = load(config)?;
            let router = build_router(app_config)?;

            let addr = format!("{}:{}", bind, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("listening on {}", addr);
            axum::serve(listener, router).await?;
        }
        Commands::Query {
            prompt,
            provider,
            config,
        } => {
            let app_config = load(config)?;
            let http = reqwest::Client::new();
            let factory = Arc::new(AiProviderFactory::from_config(&app_config.chat, http)?);
            let client = factory.get_client(&provider)?;
            let answer = client.query(&prompt).await?;
            println!("{}", answer);
        }
        Commands::HashPassword { password } => {
            println!("{}", config::hash_password(&password));
        }
    }

    Ok(())
}
