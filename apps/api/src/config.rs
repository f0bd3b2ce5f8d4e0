use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::ai::ProviderKind;
use crate::interview::sessions::{DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OPENROUTER_MODEL: &str = "openai/gpt-4o";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub ai: AiConfig,
    pub sessions: SessionSettings,
    pub port: u16,
    pub rust_log: String,
}

/// Limits for the in-memory chat session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub idle_timeout: Duration,
    pub max_sessions: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

/// Everything the service selector needs to build the active adapter.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub provider: ProviderKind,
    pub gemini: GeminiSettings,
    pub openrouter: OpenRouterSettings,
    /// Transport timeout. The AI layer itself defines none.
    pub http_timeout_secs: u64,
}

#[derive(Clone)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Clone)]
pub struct OpenRouterSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Sent as `HTTP-Referer` for attribution.
    pub app_url: String,
    /// Sent as `X-Title`.
    pub app_title: String,
}

// Keys stay out of logs.
impl std::fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl std::fmt::Debug for OpenRouterSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("app_url", &self.app_url)
            .field("app_title", &self.app_title)
            .finish()
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

impl Default for OpenRouterSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            model: DEFAULT_OPENROUTER_MODEL.to_string(),
            app_url: "https://free-resumeme.vercel.app/".to_string(),
            app_title: "freeresume".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let provider = optional_env("AI_PROVIDER")
            .map(|p| p.parse::<ProviderKind>())
            .transpose()
            .map_err(anyhow::Error::msg)
            .context("AI_PROVIDER must be 'gemini' or 'openrouter'")?
            .unwrap_or(ProviderKind::Gemini);

        let gemini_defaults = GeminiSettings::default();
        let openrouter_defaults = OpenRouterSettings::default();

        Ok(Config {
            ai: AiConfig {
                provider,
                gemini: GeminiSettings {
                    api_key: optional_env("GEMINI_API_KEY").or_else(|| optional_env("API_KEY")),
                    base_url: optional_env("GEMINI_BASE_URL").unwrap_or(gemini_defaults.base_url),
                    model: optional_env("GEMINI_MODEL").unwrap_or(gemini_defaults.model),
                },
                openrouter: OpenRouterSettings {
                    api_key: optional_env("OPENROUTER_API_KEY"),
                    base_url: optional_env("OPENROUTER_BASE_URL")
                        .unwrap_or(openrouter_defaults.base_url),
                    model: optional_env("OPENROUTER_MODEL").unwrap_or(openrouter_defaults.model),
                    app_url: optional_env("APP_URL").unwrap_or(openrouter_defaults.app_url),
                    app_title: optional_env("APP_TITLE").unwrap_or(openrouter_defaults.app_title),
                },
                http_timeout_secs: parse_env("HTTP_TIMEOUT_SECS", 120)
                    .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            },
            sessions: SessionSettings {
                idle_timeout: Duration::from_secs(
                    parse_env("SESSION_IDLE_TIMEOUT_SECS", DEFAULT_IDLE_TIMEOUT.as_secs())
                        .context("SESSION_IDLE_TIMEOUT_SECS must be a whole number of seconds")?,
                ),
                max_sessions: parse_env("MAX_CHAT_SESSIONS", DEFAULT_MAX_SESSIONS)
                    .context("MAX_CHAT_SESSIONS must be a whole number")?,
            },
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

impl AiConfig {
    /// The environment-configured key for the active provider, if any.
    pub fn active_api_key(&self) -> Option<String> {
        match self.provider {
            ProviderKind::Gemini => self.gemini.api_key.clone(),
            ProviderKind::OpenRouter => self.openrouter.api_key.clone(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            gemini: GeminiSettings::default(),
            openrouter: OpenRouterSettings::default(),
            http_timeout_secs: 120,
        }
    }
}

/// Unset and blank variables are both treated as missing.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(optional_env(key), default)
}

fn parse_or<T>(value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => Ok(raw.parse::<T>()?),
        None => Ok(default),
    }
}
