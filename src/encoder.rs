//! Chart encoding
//!
//! This module encodes aggregate views into Vega-Lite chart specifications.
//! Rasterising a specification is left to an external renderer; every spec is
//! self-contained (inline data) and stamped with producer metadata.

use crate::types::{
    AggregateReport, DateGrain, KeywordCount, LabelDistribution, SentimentLabel, TrendPoint,
};
use crate::{PRODUCER_NAME, SENTIFLUX_VERSION};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

/// Vega-Lite schema every chart declares
pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Colours for positive, neutral, negative
const LABEL_COLORS: [&str; 3] = ["green", "gray", "red"];

/// Which aggregate view a chart renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Distribution,
    Proportion,
    Trend,
    Keywords,
}

impl ChartKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ChartKind::Distribution => "sentiment_distribution.vl.json",
            ChartKind::Proportion => "sentiment_pie.vl.json",
            ChartKind::Trend => "sentiment_trend.vl.json",
            ChartKind::Keywords => "top_keywords.vl.json",
        }
    }
}

/// An encoded chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub spec: Value,
}

/// Encoder for chart specifications
pub struct ChartEncoder {
    run_id: Uuid,
}

impl ChartEncoder {
    /// Create an encoder for a specific run
    pub fn with_run_id(run_id: Uuid) -> Self {
        Self { run_id }
    }

    /// Encode every view of the report, in a fixed order
    pub fn encode_all(&self, report: &AggregateReport) -> Vec<ChartSpec> {
        vec![
            ChartSpec {
                kind: ChartKind::Distribution,
                spec: self.distribution_bar(&report.distribution),
            },
            ChartSpec {
                kind: ChartKind::Proportion,
                spec: self.distribution_pie(&report.distribution),
            },
            ChartSpec {
                kind: ChartKind::Trend,
                spec: self.trend_line(&report.trend, report.grain),
            },
            ChartSpec {
                kind: ChartKind::Keywords,
                spec: self.keyword_bar(&report.keywords),
            },
        ]
    }

    /// Bar chart of label counts; all three labels always appear
    pub fn distribution_bar(&self, distribution: &LabelDistribution) -> Value {
        let values: Vec<Value> = distribution
            .entries()
            .iter()
            .map(|(label, count)| json!({"sentiment": label.as_str(), "count": count}))
            .collect();

        self.spec(
            title_for("Sentiment Distribution", distribution.is_empty()),
            values,
            json!("bar"),
            json!({
                "x": {
                    "field": "sentiment",
                    "type": "nominal",
                    "title": "Sentiment",
                    "sort": label_order(),
                },
                "y": {"field": "count", "type": "quantitative", "title": "Count"},
            }),
        )
    }

    /// Pie chart of label proportions
    pub fn distribution_pie(&self, distribution: &LabelDistribution) -> Value {
        let values: Vec<Value> = if distribution.is_empty() {
            Vec::new()
        } else {
            distribution
                .proportions()
                .iter()
                .zip(distribution.entries().iter())
                .map(|((label, share), (_, count))| {
                    json!({"sentiment": label.as_str(), "count": count, "share": share})
                })
                .collect()
        };

        self.spec(
            title_for("Sentiment Proportion", distribution.is_empty()),
            values,
            json!({"type": "arc", "tooltip": true}),
            json!({
                "theta": {"field": "count", "type": "quantitative"},
                "color": {
                    "field": "sentiment",
                    "type": "nominal",
                    "scale": {"domain": label_order(), "range": LABEL_COLORS},
                },
            }),
        )
    }

    /// Line chart of mean compound per bucket
    pub fn trend_line(&self, trend: &[TrendPoint], grain: DateGrain) -> Value {
        let values: Vec<Value> = trend
            .iter()
            .map(|point| {
                json!({
                    "date": point.bucket_start.format("%Y-%m-%d").to_string(),
                    "mean_compound": point.mean_compound,
                    "count": point.count,
                })
            })
            .collect();

        self.spec(
            title_for(
                &format!("Average Sentiment Over Time ({})", grain),
                trend.is_empty(),
            ),
            values,
            json!({"type": "line", "point": true}),
            json!({
                "x": {"field": "date", "type": "temporal", "title": "Date"},
                "y": {
                    "field": "mean_compound",
                    "type": "quantitative",
                    "title": "Avg Compound Sentiment",
                },
            }),
        )
    }

    /// Horizontal bar chart of the keyword ranking, highest count on top
    pub fn keyword_bar(&self, keywords: &[KeywordCount]) -> Value {
        let values: Vec<Value> = keywords
            .iter()
            .enumerate()
            .map(|(rank, keyword)| {
                json!({"term": keyword.term, "count": keyword.count, "rank": rank + 1})
            })
            .collect();

        self.spec(
            title_for(
                &format!("Top {} Keywords (Stopwords removed)", keywords.len()),
                keywords.is_empty(),
            ),
            values,
            json!("bar"),
            json!({
                "y": {
                    "field": "term",
                    "type": "nominal",
                    "sort": {"field": "rank", "order": "ascending"},
                    "title": null,
                },
                "x": {"field": "count", "type": "quantitative", "title": "Frequency"},
            }),
        )
    }

    fn spec(&self, title: String, values: Vec<Value>, mark: Value, encoding: Value) -> Value {
        json!({
            "$schema": VEGA_LITE_SCHEMA,
            "title": title,
            "data": {"values": values},
            "mark": mark,
            "encoding": encoding,
            "usermeta": {
                "producer": PRODUCER_NAME,
                "version": SENTIFLUX_VERSION,
                "run_id": self.run_id.to_string(),
            },
        })
    }
}

fn label_order() -> Vec<&'static str> {
    SentimentLabel::REPORT_ORDER
        .iter()
        .map(SentimentLabel::as_str)
        .collect()
}

fn title_for(title: &str, empty: bool) -> String {
    if empty {
        format!("{title} (no data)")
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn sample_report() -> AggregateReport {
        AggregateReport {
            distribution: LabelDistribution {
                positive: 3,
                neutral: 1,
                negative: 0,
            },
            grain: DateGrain::Weekly,
            trend: vec![TrendPoint {
                bucket_start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                mean_compound: 0.25,
                count: 4,
            }],
            keywords: vec![
                KeywordCount {
                    term: "tea".to_string(),
                    count: 3,
                },
                KeywordCount {
                    term: "flavor".to_string(),
                    count: 2,
                },
            ],
        }
    }

    fn encoder() -> ChartEncoder {
        ChartEncoder::with_run_id(Uuid::new_v4())
    }

    #[test]
    fn test_encode_all_produces_four_charts() {
        let run_id = Uuid::new_v4();
        let encoder = ChartEncoder::with_run_id(run_id);
        let charts = encoder.encode_all(&sample_report());

        let kinds: Vec<ChartKind> = charts.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ChartKind::Distribution,
                ChartKind::Proportion,
                ChartKind::Trend,
                ChartKind::Keywords
            ]
        );
        for chart in &charts {
            assert_eq!(chart.spec["$schema"], VEGA_LITE_SCHEMA);
            assert_eq!(chart.spec["usermeta"]["producer"], "sentiflux");
            assert_eq!(
                chart.spec["usermeta"]["run_id"],
                run_id.to_string()
            );
        }
    }

    #[test]
    fn test_distribution_bar_keeps_zero_category() {
        let spec = encoder().distribution_bar(&sample_report().distribution);
        let values = spec["data"]["values"].as_array().unwrap();

        assert_eq!(values.len(), 3);
        assert_eq!(values[2]["sentiment"], "negative");
        assert_eq!(values[2]["count"], 0);
        assert_eq!(spec["title"], "Sentiment Distribution");
    }

    #[test]
    fn test_trend_line_dates_and_title() {
        let report = sample_report();
        let spec = encoder().trend_line(&report.trend, report.grain);

        assert_eq!(spec["title"], "Average Sentiment Over Time (W)");
        assert_eq!(spec["data"]["values"][0]["date"], "2023-01-01");
        assert_eq!(spec["data"]["values"][0]["mean_compound"], 0.25);
    }

    #[test]
    fn test_keyword_bar_ranks() {
        let spec = encoder().keyword_bar(&sample_report().keywords);
        assert_eq!(spec["title"], "Top 2 Keywords (Stopwords removed)");
        assert_eq!(spec["data"]["values"][0]["term"], "tea");
        assert_eq!(spec["data"]["values"][1]["rank"], 2);
    }

    #[test]
    fn test_empty_views_produce_placeholders() {
        let empty = AggregateReport {
            distribution: LabelDistribution::default(),
            grain: DateGrain::Daily,
            trend: vec![],
            keywords: vec![],
        };
        let charts = encoder().encode_all(&empty);

        assert_eq!(charts[1].spec["title"], "Sentiment Proportion (no data)");
        assert!(charts[1].spec["data"]["values"].as_array().unwrap().is_empty());
        assert_eq!(charts[2].spec["title"], "Average Sentiment Over Time (D) (no data)");
        assert_eq!(charts[3].spec["title"], "Top 0 Keywords (Stopwords removed) (no data)");
    }
}
