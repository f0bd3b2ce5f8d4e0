//! Service selector: the single decision point for which adapter is active.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

use crate::ai::credentials::CredentialStore;
use crate::ai::gemini::GeminiService;
use crate::ai::openai::OpenRouterService;
use crate::ai::service::{AiService, ProviderKind};
use crate::config::AiConfig;

/// Builds the active adapter. Performs no network I/O.
///
/// `credentials` is shared with the caller so keys can be supplied or replaced
/// at runtime without rebuilding the service.
pub fn build_service(config: &AiConfig, credentials: CredentialStore) -> Result<Arc<dyn AiService>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let service: Arc<dyn AiService> = match config.provider {
        ProviderKind::Gemini => Arc::new(GeminiService::new(client, &config.gemini, credentials)),
        ProviderKind::OpenRouter => {
            Arc::new(OpenRouterService::new(client, &config.openrouter, credentials))
        }
    };

    info!("AI service selected: {}", service.provider().as_str());
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selects_configured_provider() {
        let mut config = AiConfig::default();
        let service = build_service(&config, CredentialStore::empty()).unwrap();
        assert_eq!(service.provider(), ProviderKind::Gemini);

        config.provider = ProviderKind::OpenRouter;
        let service = build_service(&config, CredentialStore::empty()).unwrap();
        assert_eq!(service.provider(), ProviderKind::OpenRouter);
    }

    #[tokio::test]
    async fn test_selected_service_reads_shared_credentials() {
        let credentials = CredentialStore::empty();
        let config = AiConfig {
            provider: ProviderKind::OpenRouter,
            ..Default::default()
        };
        let service = build_service(&config, credentials.clone()).unwrap();

        // No key yet: fails locally, before any request is made.
        assert_eq!(
            service.generate_text("hi").await,
            Err(crate::ai::AiError::InvalidApiKey)
        );
    }
}
