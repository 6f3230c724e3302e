use std::net::SocketAddr;
use std::time::Duration;

/// Upper bound on a single back-off delay between model API attempts.
pub const MAX_RETRY_DELAY_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub max_upload_bytes: usize,
    /// Credential for the hosted model. `None` runs the dashboard with
    /// insights disabled.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub insight_timeout_secs: u64,
    pub insight_max_retries: u32,
    pub insight_backoff_base_ms: u64,
}

impl AppConfig {
    #[must_use]
    pub fn insights_enabled(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    /// Bound on one chart's whole insight request: every attempt at the
    /// per-attempt timeout plus the longest back-off delays (+25 % jitter).
    #[must_use]
    pub fn insight_deadline(&self) -> Duration {
        let attempts = u64::from(self.insight_max_retries).saturating_add(1);
        let backoff_ms = (0..self.insight_max_retries)
            .map(|n| {
                self.insight_backoff_base_ms
                    .saturating_mul(1u64 << n.min(10))
                    .min(MAX_RETRY_DELAY_MS)
            })
            .fold(0u64, u64::saturating_add);
        let jittered_ms = backoff_ms.saturating_mul(5) / 4;

        Duration::from_secs(self.insight_timeout_secs.saturating_mul(attempts))
            .saturating_add(Duration::from_millis(jittered_ms))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("insight_timeout_secs", &self.insight_timeout_secs)
            .field("insight_max_retries", &self.insight_max_retries)
            .field("insight_backoff_base_ms", &self.insight_backoff_base_ms)
            .finish()
    }
}
