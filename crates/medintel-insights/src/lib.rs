//! Optional natural-language insights for dashboard charts, and the
//! assembler that pairs each summary table with its insights.
//!
//! Insights come from a hosted model through [`GeminiClient`]. Without a
//! credential the [`NoopProvider`] stands in and every chart gets a
//! placeholder instead.

pub mod assemble;
pub mod error;
pub mod gemini;
pub mod prompt;
pub mod provider;

mod retry;

pub use assemble::{
    assemble_dashboard, process_dataset, Dashboard, DashboardRun, InsightStatus,
    PresentationRecord, DISABLED_PLACEHOLDER, FAILED_PLACEHOLDER,
};
pub use error::InsightError;
pub use gemini::GeminiClient;
pub use provider::{ConfiguredProvider, NoopProvider, TextInsightProvider};
