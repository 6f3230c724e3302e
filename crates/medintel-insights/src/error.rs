use thiserror::Error;

/// Errors from a single insight request. Never fatal to a dashboard run.
#[derive(Debug, Error)]
pub enum InsightError {
    /// No credential is configured; insights are switched off.
    #[error("insights disabled: no API key configured")]
    Disabled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("insight request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model response contained no text")]
    EmptyResponse,
}
