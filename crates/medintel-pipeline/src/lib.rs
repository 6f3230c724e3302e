//! Cleaning and aggregation pipeline for uploaded social-media records.
//!
//! Raw CSV rows are checked against the fixed column set ([`validate_schema`]),
//! normalized into canonical records ([`clean_dataset`]), and reduced into the
//! five summary tables that drive the dashboard charts ([`aggregate`]).

pub mod aggregate;
pub mod chart;
pub mod clean;
pub mod csv_io;
pub mod error;
pub mod sample;
pub mod schema;
pub mod types;

pub use aggregate::{aggregate, compute_table, AggregateTable, ChartKind, TableRow};
pub use chart::{chart_file_name, render_chart_html};
pub use clean::{canonical_field_name, clean_dataset, parse_date, parse_engagements};
pub use csv_io::{canonical_csv_bytes, read_raw_csv, write_canonical_csv, CLEANED_CSV_FILE_NAME};
pub use error::PipelineError;
pub use sample::sample_dataset;
pub use schema::{missing_fields, validate_schema, ValidatedDataset};
pub use types::{
    CanonicalDataset, CanonicalRecord, RawDataset, RawRecord, CANONICAL_FIELDS, REQUIRED_FIELDS,
};
