//! Column presence check run before any cleaning.

use std::ops::Deref;

use crate::error::PipelineError;
use crate::types::{RawDataset, REQUIRED_FIELDS};

/// A raw dataset known to expose every required column.
///
/// Only [`validate_schema`] constructs this, so the cleaner never sees an
/// unchecked upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDataset(RawDataset);

impl ValidatedDataset {
    #[must_use]
    pub fn into_inner(self) -> RawDataset {
        self.0
    }
}

impl Deref for ValidatedDataset {
    type Target = RawDataset;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Returns the required column names absent from `headers`, sorted.
///
/// Matching is exact and case-sensitive.
#[must_use]
pub fn missing_fields(headers: &[String]) -> Vec<String> {
    let mut missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .map(|f| (*f).to_string())
        .collect();
    missing.sort();
    missing
}

/// Checks that the dataset exposes every required column.
///
/// The dataset passes through unchanged on success.
///
/// # Errors
///
/// Returns [`PipelineError::Schema`] listing the missing names in sorted order.
pub fn validate_schema(dataset: RawDataset) -> Result<ValidatedDataset, PipelineError> {
    let missing = missing_fields(&dataset.headers);
    if !missing.is_empty() {
        tracing::warn!(missing = ?missing, "upload rejected: missing required columns");
        return Err(PipelineError::Schema { missing });
    }
    Ok(ValidatedDataset(dataset))
}
