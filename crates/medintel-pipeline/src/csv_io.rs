//! CSV upload parsing and cleaned-data export.

use std::io::{Read, Write};

use crate::clean::canonical_field_name;
use crate::error::PipelineError;
use crate::types::{CanonicalDataset, RawDataset, RawRecord, REQUIRED_FIELDS};

/// File name offered for the cleaned-data download.
pub const CLEANED_CSV_FILE_NAME: &str = "cleaned_media_intelligence_data.csv";

/// Reads a header-defined CSV stream into a [`RawDataset`].
///
/// Empty cells become null values. Header names are kept exactly as written,
/// apart from a leading byte-order mark.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] for malformed CSV, including rows whose
/// field count differs from the header.
pub fn read_raw_csv<R: Read>(reader: R) -> Result<RawDataset, PipelineError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let mut record = RawRecord::new();
        for (header, value) in headers.iter().zip(row.iter()) {
            let value = (!value.is_empty()).then(|| value.to_string());
            record.insert(header.clone(), value);
        }
        records.push(record);
    }

    tracing::debug!(
        columns = headers.len(),
        rows = records.len(),
        "parsed uploaded CSV"
    );
    Ok(RawDataset::new(headers, records))
}

/// Writes the canonical dataset as CSV with a canonical-name header row.
///
/// Header names are the required upload columns passed through
/// [`canonical_field_name`]. The header is written even when the dataset is
/// empty.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] or [`PipelineError::Io`] if writing fails.
pub fn write_canonical_csv<W: Write>(
    dataset: &CanonicalDataset,
    writer: W,
) -> Result<(), PipelineError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(REQUIRED_FIELDS.iter().map(|f| canonical_field_name(f)))?;
    for record in dataset {
        csv_writer.write_record(record.to_csv_row())?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Renders the canonical dataset as CSV bytes.
///
/// # Errors
///
/// Propagates errors from [`write_canonical_csv`].
pub fn canonical_csv_bytes(dataset: &CanonicalDataset) -> Result<Vec<u8>, PipelineError> {
    let mut buf = Vec::new();
    write_canonical_csv(dataset, &mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::types::CanonicalRecord;

    #[test]
    fn reads_headers_and_null_cells() {
        let input = "Date,Platform,Sentiment,Location,Engagements,Media Type\n\
                     2023-01-01,Twitter,Positive,New York,,Text\n";
        let dataset = read_raw_csv(input.as_bytes()).unwrap();
        assert_eq!(dataset.headers[5], "Media Type");
        assert_eq!(dataset.len(), 1);
        let row = &dataset.records[0];
        assert_eq!(row.get("Location"), Some("New York"));
        assert_eq!(row.get("Engagements"), None);
    }

    #[test]
    fn strips_byte_order_mark_from_first_header() {
        let input = "\u{feff}Date,Platform\n2023-01-01,Twitter\n";
        let dataset = read_raw_csv(input.as_bytes()).unwrap();
        assert_eq!(dataset.headers[0], "Date");
    }

    #[test]
    fn header_only_input_has_no_records() {
        let input = "Date,Platform,Sentiment,Location,Engagements,Media Type\n";
        let dataset = read_raw_csv(input.as_bytes()).unwrap();
        assert_eq!(dataset.headers.len(), 6);
        assert!(dataset.is_empty());
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let input = "Location,Platform\n\"Jakarta, ID\",Twitter\n";
        let dataset = read_raw_csv(input.as_bytes()).unwrap();
        assert_eq!(dataset.records[0].get("Location"), Some("Jakarta, ID"));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let input = "Date,Platform\n2023-01-01\n";
        let err = read_raw_csv(input.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::Csv(_)));
    }

    #[test]
    fn writes_canonical_header_even_when_empty() {
        let bytes = canonical_csv_bytes(&CanonicalDataset::default()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "date,platform,sentiment,location,engagements,media_type\n"
        );
    }

    #[test]
    fn writes_one_row_per_record() {
        let dataset = CanonicalDataset::from_records(vec![CanonicalRecord {
            date: NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
            platform: "Facebook".to_string(),
            sentiment: "Negative".to_string(),
            location: "London, UK".to_string(),
            engagements: 80,
            media_type: "Image".to_string(),
        }]);
        let text = String::from_utf8(canonical_csv_bytes(&dataset).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "2023-01-05,Facebook,Negative,\"London, UK\",80,Image");
    }
}
