//! Self-contained interactive chart documents.
//!
//! Each document embeds a Plotly figure as JSON and loads the Plotly library
//! from its CDN, so the file opens standalone in any browser.

use serde_json::{json, Value};

use crate::aggregate::{AggregateTable, ChartKind};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const SENTIMENT_COLORS: &[&str] = &["#F472B6", "#EF4444", "#FCD34D"];
const MEDIA_TYPE_COLORS: &[&str] = &["#F9A8D4", "#FBCFE8", "#FCE7F6", "#FDA4AF"];
const TREND_COLOR: &str = "#EC4899";
const LOCATION_COLOR: &str = "#FBCFE8";
const PLATFORM_FALLBACK_COLOR: &str = "#F9A8D4";

fn platform_color(platform: &str) -> &'static str {
    match platform {
        "Twitter" => "#DB2777",
        "Facebook" => "#F0ABFC",
        "Instagram" => "#FB7185",
        "LinkedIn" => "#F87171",
        "TikTok" => "#C084FC",
        _ => PLATFORM_FALLBACK_COLOR,
    }
}

/// Download file name for a chart, e.g. `top_locations_chart.html`.
#[must_use]
pub fn chart_file_name(kind: ChartKind) -> String {
    format!("{}_chart.html", kind.key())
}

fn cycle(palette: &[&str], n: usize) -> Vec<String> {
    palette
        .iter()
        .cycle()
        .take(n)
        .map(|c| (*c).to_string())
        .collect()
}

fn base_layout(kind: ChartKind) -> Value {
    json!({
        "title": { "text": kind.title() },
        "height": 350,
        "margin": { "t": 50, "b": 50, "l": 50, "r": 50 },
        "paper_bgcolor": "rgba(0,0,0,0)",
        "plot_bgcolor": "rgba(0,0,0,0)",
        "font": { "family": "Inter", "color": "#374151" },
    })
}

/// Builds the Plotly figure (`data` + `layout`) for a table.
#[must_use]
pub fn figure(table: &AggregateTable) -> Value {
    let labels: Vec<&str> = table.rows.iter().map(|r| r.label.as_str()).collect();
    let values: Vec<i64> = table.rows.iter().map(|r| r.value).collect();
    let mut layout = base_layout(table.kind);

    let trace = match table.kind {
        ChartKind::SentimentBreakdown | ChartKind::MediaTypeMix => {
            let palette = if table.kind == ChartKind::SentimentBreakdown {
                SENTIMENT_COLORS
            } else {
                MEDIA_TYPE_COLORS
            };
            layout["showlegend"] = json!(true);
            layout["legend"] = json!({ "orientation": "h", "yanchor": "bottom", "y": -0.2 });
            json!({
                "type": "pie",
                "labels": labels,
                "values": values,
                "hole": 0.4,
                "marker": { "colors": cycle(palette, labels.len()) },
            })
        }
        ChartKind::EngagementTrend => {
            layout["xaxis"] = json!({ "title": { "text": "Date" } });
            layout["yaxis"] = json!({ "title": { "text": "Engagements" } });
            json!({
                "type": "scatter",
                "mode": "lines+markers",
                "line": { "shape": "linear", "color": TREND_COLOR },
                "x": labels,
                "y": values,
            })
        }
        ChartKind::PlatformEngagements => {
            layout["xaxis"] = json!({ "title": { "text": "Platform" } });
            layout["yaxis"] = json!({ "title": { "text": "Total Engagements" } });
            let colors: Vec<&str> = labels.iter().map(|p| platform_color(p)).collect();
            json!({
                "type": "bar",
                "x": labels,
                "y": values,
                "marker": { "color": colors },
            })
        }
        ChartKind::TopLocations => {
            layout["xaxis"] = json!({ "title": { "text": "Location" } });
            layout["yaxis"] = json!({ "title": { "text": "Total Engagements" } });
            json!({
                "type": "bar",
                "x": labels,
                "y": values,
                "marker": { "color": LOCATION_COLOR },
            })
        }
    };

    json!({ "data": [trace], "layout": layout })
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Renders a table as a standalone HTML document.
#[must_use]
pub fn render_chart_html(table: &AggregateTable) -> String {
    // `</` inside an inline script would end the script element early.
    let figure_json = figure(table).to_string().replace("</", "<\\/");
    let title = escape_html(table.kind.title());
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_CDN}"></script>
</head>
<body>
<div id="chart" style="width:100%;height:100%;"></div>
<script>
const figure = {figure_json};
Plotly.newPlot("chart", figure.data, figure.layout, {{ responsive: true }});
</script>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::TableRow;

    fn table(kind: ChartKind, rows: &[(&str, i64)]) -> AggregateTable {
        AggregateTable {
            kind,
            rows: rows
                .iter()
                .map(|(label, value)| TableRow {
                    label: (*label).to_string(),
                    value: *value,
                })
                .collect(),
        }
    }

    #[test]
    fn file_name_uses_chart_key() {
        assert_eq!(
            chart_file_name(ChartKind::PlatformEngagements),
            "platform_engagements_chart.html"
        );
    }

    #[test]
    fn sentiment_is_a_donut() {
        let fig = figure(&table(
            ChartKind::SentimentBreakdown,
            &[("Positive", 3), ("Negative", 2)],
        ));
        assert_eq!(fig["data"][0]["type"], "pie");
        assert_eq!(fig["data"][0]["hole"], 0.4);
        assert_eq!(fig["data"][0]["labels"][1], "Negative");
        assert_eq!(fig["layout"]["title"]["text"], "Sentiment Breakdown");
    }

    #[test]
    fn trend_is_a_line_with_markers() {
        let fig = figure(&table(ChartKind::EngagementTrend, &[("2023-01-02", 100)]));
        assert_eq!(fig["data"][0]["mode"], "lines+markers");
        assert_eq!(fig["data"][0]["x"][0], "2023-01-02");
        assert_eq!(fig["data"][0]["y"][0], 100);
    }

    #[test]
    fn platform_bars_use_platform_palette() {
        let fig = figure(&table(
            ChartKind::PlatformEngagements,
            &[("Mastodon", 1), ("Twitter", 2)],
        ));
        assert_eq!(fig["data"][0]["type"], "bar");
        assert_eq!(fig["data"][0]["marker"]["color"][0], PLATFORM_FALLBACK_COLOR);
        assert_eq!(fig["data"][0]["marker"]["color"][1], "#DB2777");
    }

    #[test]
    fn html_document_embeds_figure_and_escapes_script_breakout() {
        let html = render_chart_html(&table(
            ChartKind::TopLocations,
            &[("</script><b>", 5)],
        ));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(PLOTLY_CDN));
        assert!(html.contains("<title>Top 5 Locations by Engagements</title>"));
        assert!(!html.contains("</script><b>"));
        assert!(html.contains("<\\/script><b>"));
    }

    #[test]
    fn empty_table_still_renders() {
        let html = render_chart_html(&table(ChartKind::MediaTypeMix, &[]));
        assert!(html.contains("\"labels\":[]"));
    }
}
