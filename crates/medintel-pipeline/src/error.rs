use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Required columns are absent from the upload. Names are sorted.
    #[error("missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A `Date` value did not match any accepted format. `record` is 1-based.
    #[error("invalid date \"{value}\" in record {record}")]
    DateParse { record: usize, value: String },

    #[error("aggregation failed for {chart}: {reason}")]
    Aggregation { chart: &'static str, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Stable machine-readable code for API envelopes.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Schema { .. } => "schema_error",
            Self::DateParse { .. } => "date_parse_error",
            Self::Aggregation { .. } => "aggregation_error",
            Self::Csv(_) => "csv_error",
            Self::Io(_) | Self::Json(_) => "internal_error",
        }
    }
}
