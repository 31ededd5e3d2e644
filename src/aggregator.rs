//! Aggregate views
//!
//! Three independent, read-only reductions over the classified set:
//! label distribution, time-bucketed mean compound, and top-N keywords.
//! Each is total: an empty input yields an empty view.

use crate::config::ReportConfig;
use crate::types::{
    AggregateReport, ClassifiedRecord, DateGrain, KeywordCount, LabelDistribution,
    SentimentLabel, TrendPoint,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Tokens of this many characters or fewer never rank as keywords
pub const MIN_KEYWORD_LEN: usize = 2;

const STOPWORD_LIST: &str = "a an the and or but if then else when at by for with about against \
    between into through during before after above below to from up down in out on off over under \
    again further is are was were be been being have has had do does did doing would should could \
    can must might may will having not no nor only own same so than too very s t don ve i me my \
    myself we our ours ourselves you your yours yourself yourselves he him his himself she her hers \
    herself it its itself they them their theirs themselves what which who whom this that these \
    those am as of each few more most other some such just now";

/// Low-information tokens excluded from the keyword ranking
pub static STOPWORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORD_LIST.split_whitespace().collect());

/// Optional extra filter on keyword candidates, such as a part-of-speech tagger
pub trait TokenFilter: Send + Sync {
    fn keep(&self, token: &str) -> bool;
}

/// Filter that keeps every token
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllTokens;

impl TokenFilter for AllowAllTokens {
    fn keep(&self, _token: &str) -> bool {
        true
    }
}

/// Computes the [`AggregateReport`] for a classified set
pub struct Aggregator {
    grain: DateGrain,
    week_start: Weekday,
    top_n: usize,
    token_filter: Box<dyn TokenFilter>,
}

impl Aggregator {
    pub fn new(grain: DateGrain, week_start: Weekday, top_n: usize) -> Self {
        Self {
            grain,
            week_start,
            top_n,
            token_filter: Box::new(AllowAllTokens),
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.date_grain, config.week_start, config.top_n_keywords)
    }

    /// Replace the keyword token filter
    pub fn with_token_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.token_filter = filter;
        self
    }

    /// Compute all three views; they run concurrently over the same slice
    pub fn compute(&self, records: &[ClassifiedRecord]) -> AggregateReport {
        let (distribution, (trend, keywords)) = rayon::join(
            || label_distribution(records),
            || {
                rayon::join(
                    || sentiment_trend(records, self.grain, self.week_start),
                    || {
                        top_keywords(
                            records.iter().map(ClassifiedRecord::clean_text),
                            self.top_n,
                            self.token_filter.as_ref(),
                        )
                    },
                )
            },
        );

        if records.is_empty() {
            warn!("classified set is empty; aggregate views are empty");
        } else {
            if trend.is_empty() {
                warn!("trend view is empty");
            }
            if keywords.is_empty() {
                warn!("no keywords survived stopword filtering");
            }
        }
        debug!(
            buckets = trend.len(),
            keywords = keywords.len(),
            "aggregates computed"
        );

        AggregateReport {
            distribution,
            grain: self.grain,
            trend,
            keywords,
        }
    }
}

/// Count records per label
pub fn label_distribution(records: &[ClassifiedRecord]) -> LabelDistribution {
    let mut distribution = LabelDistribution::default();
    for record in records {
        match record.label {
            SentimentLabel::Positive => distribution.positive += 1,
            SentimentLabel::Neutral => distribution.neutral += 1,
            SentimentLabel::Negative => distribution.negative += 1,
        }
    }
    distribution
}

/// First day of the bucket containing `timestamp`
pub fn bucket_start(timestamp: DateTime<Utc>, grain: DateGrain, week_start: Weekday) -> NaiveDate {
    let date = timestamp.date_naive();
    match grain {
        DateGrain::Daily => date,
        DateGrain::Weekly => {
            let offset = (date.weekday().num_days_from_monday() + 7
                - week_start.num_days_from_monday())
                % 7;
            date - Duration::days(i64::from(offset))
        }
        DateGrain::Monthly => date.with_day(1).unwrap_or(date),
    }
}

/// Mean compound per non-empty bucket, ascending by bucket start
pub fn sentiment_trend(
    records: &[ClassifiedRecord],
    grain: DateGrain,
    week_start: Weekday,
) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for record in records {
        let key = bucket_start(record.timestamp(), grain, week_start);
        let bucket = buckets.entry(key).or_insert((0.0, 0));
        bucket.0 += record.compound();
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(bucket_start, (sum, count))| TrendPoint {
            bucket_start,
            mean_compound: sum / count as f64,
            count,
        })
        .collect()
}

/// Top `n` tokens by descending count.
///
/// Tokens no longer than [`MIN_KEYWORD_LEN`], stopwords and tokens rejected
/// by `filter` are skipped. Equal counts keep first-encountered order.
pub fn top_keywords<'a>(
    texts: impl Iterator<Item = &'a str>,
    n: usize,
    filter: &dyn TokenFilter,
) -> Vec<KeywordCount> {
    // term -> (count, first-seen rank)
    let mut counts: HashMap<&'a str, (usize, usize)> = HashMap::new();
    for text in texts {
        for token in text.split_whitespace() {
            if token.chars().count() <= MIN_KEYWORD_LEN
                || STOPWORDS.contains(token)
                || !filter.keep(token)
            {
                continue;
            }
            let next_rank = counts.len();
            counts.entry(token).or_insert((0, next_rank)).0 += 1;
        }
    }

    let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .take(n)
        .map(|(term, (count, _))| KeywordCount {
            term: term.to_string(),
            count,
        })
        .collect()
}
