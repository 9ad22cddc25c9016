//! Startup configuration.
//!
//! Configuration is read once from a JSON file at process start and treated
//! as immutable for the process lifetime. Secrets can be pulled from the
//! environment with `${VAR}` placeholders.

use std::{collections::BTreeMap, env, fs, path::PathBuf};

use anyhow::Context;
use serde::Deserialize;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub auth: AuthOptions,
    #[serde(default)]
    pub chat: ChatOptions,
    /// Users allowed to sign in, with SHA-256 password digests.
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

/// Options for the token authentication scheme.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthOptions {
    /// Expected token issuer. Unset skips issuer validation.
    #[serde(default)]
    pub issuer: Option<String>,
    /// Expected token audience. Unset skips audience validation.
    #[serde(default)]
    pub audience: Option<String>,
    /// Base64-encoded Ed25519 private key PEM used for signing.
    /// Unset puts the generator in insecure dev mode.
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Base64-encoded Ed25519 public key PEM used for verification.
    /// Unset verifies against a fixed well-known secret (dev only).
    #[serde(default)]
    pub public_key: Option<String>,
    /// Access token lifetime in seconds.
    #[serde(default = "default_expiration_secs")]
    pub expiration_secs: u64,
    /// Name of the cookie carrying the access token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            issuer: None,
            audience: None,
            secret_key: None,
            public_key: None,
            expiration_secs: default_expiration_secs(),
            cookie_name: default_cookie_name(),
        }
    }
}

fn default_expiration_secs() -> u64 {
    86400
}

fn default_cookie_name() -> String {
    "auth_token".to_string()
}

/// Options for the AI chat subsystem.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChatOptions {
    /// Provider name -> connection/model settings.
    /// Keys are normalized to lowercase at load so lookups are
    /// case-insensitive.
    #[serde(default)]
    pub providers: BTreeMap<String, AiProviderOptions>,
    /// Directory holding `<task>.tpl` prompt template overrides.
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
}

impl ChatOptions {
    /// Case-insensitive provider settings lookup.
    pub fn provider(&self, name: &str) -> Option<&AiProviderOptions> {
        self.providers.get(&name.to_ascii_lowercase())
    }
}

/// Connection and model settings for one AI provider.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AiProviderOptions {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_tokens() -> u32 {
    512
}

fn default_timeout_secs() -> u64 {
    30
}

impl AiProviderOptions {
    /// Validate the settings a network-backed provider cannot run without.
    /// Violations are startup-fatal.
    pub fn require_connection(&self, name: &str) -> anyhow::Result<()> {
        if self.base_url.is_empty() || self.api_key.is_empty() || self.model.is_empty() {
            anyhow::bail!(
                "provider '{}' requires base_url, api_key and model in configuration",
                name
            );
        }
        url::Url::parse(&self.base_url)
            .with_context(|| format!("provider '{}' base_url is not a valid URL", name))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub username: String,
    /// Hex-encoded SHA-256 digest of the password.
    pub password_sha256: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Hex SHA-256 digest of a password, as stored in the config user table.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(p) = env::var("PROMPT_RELAY_CONFIG") {
        return Ok(PathBuf::from(p));
    }

    let candidate = PathBuf::from("prompt-relay.json");
    if candidate.exists() {
        return Ok(candidate);
    }

    Err(anyhow::anyhow!(
        "Could not find prompt-relay.json (set PROMPT_RELAY_CONFIG or create ./prompt-relay.json)"
    ))
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    let path = resolve_config_path()?;
    load_config_from(&path)
}

pub fn load_config_from(path: &std::path::Path) -> anyhow::Result<AppConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&raw)
}

pub fn parse_config(raw: &str) -> anyhow::Result<AppConfig> {
    let mut config: AppConfig = serde_json::from_str(raw).context("invalid configuration JSON")?;

    let mut providers = BTreeMap::new();
    for (name, opts) in std::mem::take(&mut config.chat.providers) {
        let normalized = name.to_ascii_lowercase();
        let expanded = expand_provider(opts);
        if providers.insert(normalized.clone(), expanded).is_some() {
            anyhow::bail!("provider '{}' is configured more than once", normalized);
        }
    }
    config.chat.providers = providers;

    Ok(config)
}

fn expand_provider(opts: AiProviderOptions) -> AiProviderOptions {
    AiProviderOptions {
        base_url: expand_env_vars(&opts.base_url),
        api_key: expand_env_vars(&opts.api_key),
        ..opts
    }
}

fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next(); // consume '{'
            let mut name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                name.push(c);
            }
            if let Ok(val) = env::var(&name) {
                out.push_str(&val);
            } else {
                out.push_str("${");
                out.push_str(&name);
                out.push('}');
            }
        } else {
            out.push(ch);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.auth.expiration_secs, 86400);
        assert_eq!(config.auth.cookie_name, "auth_token");
        assert!(config.auth.issuer.is_none());
        assert!(config.chat.providers.is_empty());
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_provider_lookup_is_case_insensitive() {
        let config = parse_config(
            r#"{
                "chat": {
                    "providers": {
                        "OpenAi": {
                            "base_url": "https://api.openai.com/",
                            "api_key": "sk-test",
                            "model": "gpt-4o-mini"
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        assert!(config.chat.provider("openai").is_some());
        assert!(config.chat.provider("OPENAI").is_some());
        assert!(config.chat.provider("OpenAi").is_some());
        assert!(config.chat.provider("openrouter").is_none());
    }

    #[test]
    fn test_duplicate_provider_after_normalization_fails() {
        let result = parse_config(
            r#"{
                "chat": {
                    "providers": {
                        "Mock": {},
                        "mock": {}
                    }
                }
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_env_var_expansion_in_api_key() {
        // Env vars are process-global; pick a name no other test uses.
        unsafe { env::set_var("PROMPT_RELAY_TEST_KEY", "sk-expanded") };
        let config = parse_config(
            r#"{
                "chat": {
                    "providers": {
                        "openai": {
                            "base_url": "https://api.openai.com/",
                            "api_key": "${PROMPT_RELAY_TEST_KEY}",
                            "model": "gpt-4o-mini"
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.chat.provider("openai").unwrap().api_key,
            "sk-expanded"
        );
    }

    #[test]
    fn test_unset_env_var_is_left_verbatim() {
        assert_eq!(
            expand_env_vars("${PROMPT_RELAY_DOES_NOT_EXIST}"),
            "${PROMPT_RELAY_DOES_NOT_EXIST}"
        );
    }

    #[test]
    fn test_provider_option_defaults() {
        let opts: AiProviderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.max_tokens, 512);
        assert_eq!(opts.timeout_secs, 30);
    }

    #[test]
    fn test_require_connection_rejects_incomplete_entry() {
        let opts = AiProviderOptions {
            base_url: "https://api.openai.com/".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            ..Default::default()
        };
        assert!(opts.require_connection("openai").is_err());
    }

    #[test]
    fn test_require_connection_rejects_bad_url() {
        let opts = AiProviderOptions {
            base_url: "not a url".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            ..Default::default()
        };
        assert!(opts.require_connection("openai").is_err());
    }

    #[test]
    fn test_hash_password_is_hex_and_deterministic() {
        let a = hash_password("secret123");
        let b = hash_password("secret123");
        let c = hash_password("different");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
