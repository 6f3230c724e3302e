//! The capability seam between the dashboard and any text generator.

use std::future::Future;

use medintel_core::AppConfig;

use crate::error::InsightError;
use crate::gemini::GeminiClient;

/// Produces short natural-language insights for one summary table.
pub trait TextInsightProvider: Send + Sync {
    /// Returns insights for the chart `title`, given its serialized summary.
    fn summarize(
        &self,
        title: &str,
        summary: &str,
    ) -> impl Future<Output = Result<Vec<String>, InsightError>> + Send;
}

/// Stand-in used when no credential is configured. Always reports
/// [`InsightError::Disabled`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProvider;

impl TextInsightProvider for NoopProvider {
    async fn summarize(&self, _title: &str, _summary: &str) -> Result<Vec<String>, InsightError> {
        Err(InsightError::Disabled)
    }
}

/// The provider selected from configuration at startup.
#[derive(Debug)]
pub enum ConfiguredProvider {
    Disabled(NoopProvider),
    Gemini(GeminiClient),
}

impl ConfiguredProvider {
    /// Picks Gemini when `GEMINI_API_KEY` is set, otherwise the no-op provider.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, InsightError> {
        let Some(api_key) = config.gemini_api_key.as_deref() else {
            tracing::info!("GEMINI_API_KEY not set; chart insights disabled");
            return Ok(Self::Disabled(NoopProvider));
        };

        let client = GeminiClient::with_base_url(
            api_key,
            &config.gemini_model,
            config.insight_timeout_secs,
            &config.gemini_base_url,
        )?
        .with_retry(config.insight_max_retries, config.insight_backoff_base_ms);

        tracing::info!(model = %config.gemini_model, "chart insights enabled");
        Ok(Self::Gemini(client))
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Gemini(_))
    }
}

impl TextInsightProvider for ConfiguredProvider {
    async fn summarize(&self, title: &str, summary: &str) -> Result<Vec<String>, InsightError> {
        match self {
            Self::Disabled(noop) => noop.summarize(title, summary).await,
            Self::Gemini(client) => client.summarize(title, summary).await,
        }
    }
}
