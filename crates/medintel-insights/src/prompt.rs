//! Prompt construction and response parsing for chart insights.

use crate::error::InsightError;

/// Builds the request prompt for one chart.
#[must_use]
pub fn build_prompt(title: &str, summary: &str) -> String {
    format!(
        "Based on the following data for \"{title}\", give the top 3 concise insights. \
         Be specific and actionable:\n\n{summary}"
    )
}

/// Parses the model's text output as a JSON array of strings.
///
/// Tolerates a Markdown code fence around the array. Blank entries are
/// dropped; the rest are trimmed.
///
/// # Errors
///
/// Returns [`InsightError::Deserialize`] if the text is not a string array.
pub fn parse_insights(text: &str) -> Result<Vec<String>, InsightError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    let items: Vec<String> =
        serde_json::from_str(body.trim()).map_err(|e| InsightError::Deserialize {
            context: "insight list".to_string(),
            source: e,
        })?;

    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_chart_and_embeds_summary() {
        let prompt = build_prompt("Media Type Mix", "Media type mix: []");
        assert!(prompt.starts_with("Based on the following data for \"Media Type Mix\""));
        assert!(prompt.ends_with("\n\nMedia type mix: []"));
    }

    #[test]
    fn parses_plain_array() {
        let insights = parse_insights(r#"["Twitter leads", "Video lags"]"#).unwrap();
        assert_eq!(insights, vec!["Twitter leads", "Video lags"]);
    }

    #[test]
    fn parses_fenced_array() {
        let insights = parse_insights("```json\n[\"a\", \"b\"]\n```").unwrap();
        assert_eq!(insights, vec!["a", "b"]);
    }

    #[test]
    fn drops_blank_entries() {
        let insights = parse_insights(r#"["  one ", "", "   "]"#).unwrap();
        assert_eq!(insights, vec!["one"]);
    }

    #[test]
    fn rejects_non_array() {
        let err = parse_insights(r#"{"insights": []}"#).unwrap_err();
        assert!(matches!(err, InsightError::Deserialize { .. }));
    }
}
