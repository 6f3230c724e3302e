//! Built-in demo dataset, shown when no file has been uploaded.

use crate::types::{RawDataset, RawRecord, REQUIRED_FIELDS};

const SAMPLE_ROWS: &[(&str, &str, &str, &str, Option<&str>, &str)] = &[
    ("2023-01-01", "Twitter", "Positive", "New York", Some("120"), "Text"),
    ("2023-01-05", "Facebook", "Negative", "London", Some("80"), "Image"),
    ("2023-01-10", "Instagram", "Neutral", "Paris", Some("50"), "Video"),
    ("2023-01-15", "Twitter", "Positive", "New York", Some("150"), "Text"),
    ("2023-01-20", "LinkedIn", "Positive", "Tokyo", None, "Link"),
    ("2023-01-25", "TikTok", "Negative", "Sydney", Some("100"), "Video"),
    ("2023-01-30", "Twitter", "Neutral", "London", Some("70"), "Image"),
];

/// Seven raw rows spanning January 2023, one with a missing engagement count.
#[must_use]
pub fn sample_dataset() -> RawDataset {
    let headers = REQUIRED_FIELDS.iter().map(|f| (*f).to_string()).collect();
    let records = SAMPLE_ROWS
        .iter()
        .map(|&(date, platform, sentiment, location, engagements, media_type)| {
            RawRecord::new()
                .with("Date", Some(date))
                .with("Platform", Some(platform))
                .with("Sentiment", Some(sentiment))
                .with("Location", Some(location))
                .with("Engagements", engagements)
                .with("Media Type", Some(media_type))
        })
        .collect();
    RawDataset::new(headers, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aggregate, clean_dataset, validate_schema, ChartKind};

    #[test]
    fn sample_passes_the_full_pipeline() {
        let validated = validate_schema(sample_dataset()).expect("sample has every column");
        let cleaned = clean_dataset(&validated).expect("sample dates parse");
        assert_eq!(cleaned.len(), 7);
        assert_eq!(cleaned.records()[4].engagements, 0);

        let tables = aggregate(&cleaned);
        let locations = tables[4].as_ref().unwrap();
        assert_eq!(locations.kind, ChartKind::TopLocations);
        assert_eq!(locations.rows[0].label, "New York");
        assert_eq!(locations.rows[0].value, 270);
    }
}
